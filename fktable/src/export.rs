//! Writing FK tables in their sparse text form.

use super::error::{Error, Result};
use super::fk_table::FkTable;
use super::flavour_map::FlavourMap;
use super::header::Section;
use super::scalar::Scalar;
use itertools::iproduct;
use ndarray::Axis;
use std::io::{BufWriter, Write};

impl<T: Scalar> FkTable<T> {
    /// Determines which active flavours have at least one nonzero value. Returns the map
    /// restricted to these flavours and `true` if the current map is already optimal, i.e. if no
    /// flavour was removed.
    #[must_use]
    pub fn optimal_flavour_map(&self) -> (FlavourMap, bool) {
        let live: Vec<_> = self
            .sigma_view()
            .axis_iter(Axis(1))
            .map(|values| values.iter().any(|&value| value != T::default()))
            .collect();
        let optimal = live.iter().all(|&live| live);

        (self.flavour_map().retain(&live), optimal)
    }

    /// Writes this table to `writer`, in the format read by [`FkTable::read`]. If the flavour map
    /// isn't optimal (see [`FkTable::optimal_flavour_map`]) the written header contains the
    /// optimal one. Lines whose values are all zero are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] if writing fails.
    pub fn write(&self, writer: impl Write) -> Result<()> {
        tracing::info!("exporting FK table {}", self.data_name());

        let mut writer = BufWriter::new(writer);
        let (flavour_map, optimal) = self.optimal_flavour_map();

        if optimal {
            self.header().write(&mut writer)?;
        } else if flavour_map.is_empty() {
            tracing::warn!("all values of {} are zero, keeping its flavour map", self.data_name());
            self.header().write(&mut writer)?;
        } else {
            tracing::info!(
                "removing {} empty flavour(s) from the flavour map",
                self.nonzero() - flavour_map.len()
            );

            let mut header = self.header().clone();
            header.set_tag(Section::Blob, "FlavourMap", flavour_map.to_blob());
            header.write(&mut writer)?;
        }

        if self.has_cfactors() {
            tracing::warn!(
                "exporting an FK table combined with c-factors, please ensure that this is intentional"
            );
        }

        self.write_lines(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|err| Error::File(format!("failed to write FK table: {err}")))
    }

    fn write_lines(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let nx2 = if self.is_hadronic() { self.nx() } else { 1 };

        for (d, a, b) in iproduct!(0..self.ndata(), 0..self.nx(), 0..nx2) {
            let values = self.basis_values(d, a, b);

            if values.iter().flatten().all(|&value| value == T::default()) {
                continue;
            }

            if self.is_hadronic() {
                write!(writer, "{d}\t{a}\t{b}")?;
            } else {
                write!(writer, "{d}\t{a}")?;
            }

            for value in values {
                match value {
                    Some(value) if value != T::default() => write!(writer, "\t{value:.16e}")?,
                    _ => write!(writer, "\t0")?,
                }
            }

            writeln!(writer)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::FkHeader;
    use crate::pids::FLAVOURS;
    use std::io::{BufRead, Cursor};

    const DIS: &str = "{GridDesc___________________________________________________
DIS toy table
_GridInfo___________________________________________________
*SETNAME: TOYDIS
*HADRONIC: 0
*NDATA: 2
*NX: 2
{FlavourMap_________________________________________________
0 1 1 1 0 0 0 0 0 0 0 0 0 0
_TheoryInfo_________________________________________________
*Q0: 1.65
{xGrid______________________________________________________
0.01
0.5
{FastKernel_________________________________________________
0 0 0 0.125 0 0 0 0 0 0 0 0 0 0 0 0
1 1 0 0.1 7 0 0 0 0 0 0 0 0 0 0 0
";

    #[test]
    fn optimal_flavour_map() {
        let table = FkTable::<f64>::read(Cursor::new(DIS), &[]).unwrap();
        let (map, optimal) = table.optimal_flavour_map();

        // flavour 3 is active but identically zero
        assert!(!optimal);
        assert_eq!(map, FlavourMap::Dis(vec![1, 2]));

        let optimized = DIS.replace(
            "0 1 1 1 0 0 0 0 0 0 0 0 0 0",
            "0 1 1 0 0 0 0 0 0 0 0 0 0 0",
        );
        let table = FkTable::<f64>::read(Cursor::new(optimized), &[]).unwrap();
        let (map, optimal) = table.optimal_flavour_map();

        assert!(optimal);
        assert_eq!(&map, table.flavour_map());
    }

    #[test]
    fn write_substitutes_optimal_map() {
        let table = FkTable::<f64>::read(Cursor::new(DIS), &[]).unwrap();
        let mut output = Vec::new();

        table.write(&mut output).unwrap();

        let mut reader = Cursor::new(output);
        let header = FkHeader::read(&mut reader).unwrap();
        let lines: Vec<_> = reader.lines().collect::<std::io::Result<_>>().unwrap();

        assert_eq!(
            header.tag(Section::Blob, "FlavourMap"),
            Some("0 1 1 0 0 0 0 0 0 0 0 0 0 0")
        );
        // the table itself keeps its map
        assert_eq!(
            table.header().tag(Section::Blob, "FlavourMap"),
            Some("0 1 1 1 0 0 0 0 0 0 0 0 0 0")
        );
        assert_eq!(
            lines,
            [
                "0\t0\t0\t1.2500000000000000e-1\t0\t0\t0\t0\t0\t0\t0\t0\t0\t0\t0\t0",
                "1\t1\t0\t1.0000000000000001e-1\t7.0000000000000000e0\t0\t0\t0\t0\t0\t0\t0\t0\t0\t0\t0",
            ]
        );
    }

    #[test]
    fn round_trip_is_exact() {
        let mut bits = vec!["0"; FLAVOURS * FLAVOURS];
        bits[0] = "1";
        bits[FLAVOURS + 2] = "1";

        let mut lines = String::new();

        for (d, a, b) in iproduct!(0..2, 0..3, 0..3) {
            let mut tokens = vec![d.to_string(), a.to_string(), b.to_string()];
            let mut basis = vec!["0".to_owned(); FLAVOURS * FLAVOURS];
            basis[FLAVOURS + 2] = format!("{}", 1.0 / (1.0 + (d * 9 + a * 3 + b) as f64));
            tokens.extend(basis);
            lines += &(tokens.join(" ") + "\n");
        }

        let text = format!(
            "{{GridDesc_____
round trip
_GridInfo_____
*SETNAME: TRIP
*HADRONIC: 1
*NDATA: 2
*NX: 3
{{FlavourMap_____
{}
_TheoryInfo_____
*Q0: 1
{{xGrid_____
1e-5 0.001 0.3333333333333333
{{FastKernel_____
{lines}",
            bits.join(" ")
        );

        let table = FkTable::<f32>::read(Cursor::new(text), &[]).unwrap();
        let mut output = Vec::new();
        table.write(&mut output).unwrap();

        let reread = FkTable::<f32>::read(Cursor::new(output), &[]).unwrap();

        assert_eq!(reread.x_grid(), table.x_grid());
        // the empty (photon, photon) entry has been removed
        assert_eq!(reread.flavour_map(), &FlavourMap::Hadronic(vec![(1, 2)]));

        for (d, a, b) in iproduct!(0..2, 0..3, 0..3) {
            assert_eq!(
                reread.value_hadronic(d, a, b, 1, 2).unwrap(),
                table.value_hadronic(d, a, b, 1, 2).unwrap()
            );
        }
    }

    #[test]
    fn failing_writer() {
        struct Failing;

        impl Write for Failing {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let table = FkTable::<f64>::read(Cursor::new(DIS), &[]).unwrap();

        assert!(matches!(table.write(Failing), Err(Error::File(_))));
    }
}
