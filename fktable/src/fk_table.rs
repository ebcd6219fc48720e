//! Provides the [`FkTable`] type.

use super::cfactors::CFactors;
use super::error::{Error, Result};
use super::flavour_map::FlavourMap;
use super::header::{FkHeader, Section};
use super::pids::FLAVOURS;
use super::scalar::{self, Scalar};
use flate2::read::GzDecoder;
use itertools::iproduct;
use ndarray::{ArrayView3, ShapeBuilder};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Opens the file at `path` for reading, decompressing it if its name ends in `.gz`.
pub(crate) fn open(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;

    Ok(if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    })
}

fn positive(value: i64, what: &str) -> Result<usize> {
    usize::try_from(value)
        .ok()
        .filter(|&value| value > 0)
        .ok_or_else(|| Error::Range(format!("{what} is set to: {value}")))
}

/// Fast-kernel table: a tensor that, contracted with PDFs evaluated on its x grid at the scale
/// `Q0`, yields the predictions for each of its datapoints.
///
/// The tensor is stored in a flat buffer, see [`FkTable::sigma`]. Each datapoint occupies a row of
/// [`FkTable::row_size`] elements, which holds a block of [`FkTable::tx`] values for every active
/// flavour (see [`FkTable::flavour_map`]), followed by [`FkTable::pad`] zeros that make the length
/// of the row a multiple of [`Scalar::ALIGNMENT`]. Within a block the values are ordered by
/// `a * nx + b` (hadronic) or `a` (DIS), where `a` and `b` index the x grid.
///
/// Cloning a table copies all of its buffers; see [`FkTable::masked`] for copies that select a
/// subset of the datapoints.
#[derive(Clone, Debug)]
pub struct FkTable<T: Scalar> {
    header: FkHeader,
    data_name: String,
    description: String,
    ndata: usize,
    q20: f64,
    flavour_map: FlavourMap,
    x_grid: Vec<f64>,
    tx: usize,
    pad: usize,
    row_size: usize,
    sigma: Vec<T>,
    has_cfactors: bool,
    cfactors: Vec<f64>,
}

impl<T: Scalar> FkTable<T> {
    /// Reads a table from the file at `path`, which is decompressed if its name ends in `.gz`. The
    /// corrections in `cfactors` are multiplied into the table, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] if the file can not be opened, and otherwise the errors of
    /// [`FkTable::read`].
    pub fn from_path(path: &Path, cfactors: &[CFactors]) -> Result<Self> {
        let reader = open(path).map_err(|err| {
            Error::File(format!("cannot open FK table `{}`: {err}", path.display()))
        })?;

        Self::read(reader, cfactors)
    }

    /// Reads a header followed by the data lines of a table from `reader`.
    ///
    /// # Errors
    ///
    /// See [`FkHeader::read`] and [`FkTable::from_header`].
    pub fn read(mut reader: impl BufRead, cfactors: &[CFactors]) -> Result<Self> {
        let header = FkHeader::read(&mut reader)?;

        Self::from_header(header, reader, cfactors)
    }

    /// Constructs a table from an already-read `header`. `reader` must be positioned right after
    /// the header, at the first data line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] if the number of datapoints, x-grid points or active flavours is
    /// not positive, or if a data line addresses a datapoint or x-grid point that doesn't exist.
    /// Returns [`Error::Format`] if tags are missing or values can not be parsed, and
    /// [`Error::File`] if reading fails or if the `cfactors` have too few values.
    pub fn from_header(header: FkHeader, reader: impl BufRead, cfactors: &[CFactors]) -> Result<Self> {
        let data_name: String = header.get_tag(Section::GridInfo, "SETNAME")?;
        let description: String = header.get_tag(Section::Blob, "GridDesc")?;
        let ndata = positive(
            header.get_tag(Section::GridInfo, "NDATA")?,
            "number of datapoints",
        )?;
        let q0: f64 = header.get_tag(Section::TheoryInfo, "Q0")?;
        let hadronic: bool = header.get_tag(Section::GridInfo, "HADRONIC")?;
        let flavour_map = FlavourMap::from_blob(
            &header.get_tag::<String>(Section::Blob, "FlavourMap")?,
            hadronic,
        )?;
        let nx = positive(header.get_tag(Section::GridInfo, "NX")?, "number of x-points")?;

        if flavour_map.is_empty() {
            return Err(Error::Range(
                "number of nonzero flavours is set to: 0".to_owned(),
            ));
        }

        let x_grid = header
            .get_tag::<String>(Section::Blob, "xGrid")?
            .split_whitespace()
            .take(nx)
            .map(|token| {
                token
                    .parse()
                    .map_err(|_| Error::Format(format!("could not parse x-grid value `{token}`")))
            })
            .collect::<Result<Vec<f64>>>()?;

        if x_grid.len() != nx {
            return Err(Error::Format(format!(
                "expected {nx} x-grid values, found {}",
                x_grid.len()
            )));
        }

        let tx = if hadronic { nx * nx } else { nx };
        let pad = scalar::padding::<T>(tx * flavour_map.len());
        let row_size = tx * flavour_map.len() + pad;
        let len = row_size.checked_mul(ndata).ok_or_else(|| {
            Error::Range(format!("{ndata} rows of {row_size} elements exceed the address space"))
        })?;

        tracing::info!("{data_name}: {description}");
        tracing::info!(
            "{ndata} data points, {nx} x points, {} active flavours",
            flavour_map.len()
        );

        let mut values = vec![1.0; ndata];

        for cfactor in cfactors {
            cfactor.apply(&mut values)?;
        }

        let mut table = Self {
            header,
            data_name,
            description,
            ndata,
            q20: q0 * q0,
            flavour_map,
            x_grid,
            tx,
            pad,
            row_size,
            sigma: vec![T::default(); len],
            has_cfactors: !cfactors.is_empty(),
            cfactors: values,
        };

        table.read_sigma(reader)?;

        Ok(table)
    }

    fn read_sigma(&mut self, reader: impl BufRead) -> Result<()> {
        let hadronic = self.is_hadronic();
        let nx = self.nx();
        let columns: Vec<_> = (0..self.nonzero())
            .map(|index| self.flavour_map.column(index))
            .collect();
        let min_tokens = columns.iter().max().map_or(0, |&column| column + 1);

        for (number, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| Error::File(format!("failed to read data line: {err}")))?;
            let tokens: Vec<_> = line.split_whitespace().collect();

            if tokens.is_empty() {
                continue;
            }

            if tokens.len() < min_tokens {
                return Err(Error::Format(format!(
                    "data line {number} has {} tokens, expected at least {min_tokens}",
                    tokens.len()
                )));
            }

            let index = |i: usize| {
                tokens[i].parse::<usize>().map_err(|_| {
                    Error::Format(format!("could not parse index `{}` on data line {number}", tokens[i]))
                })
            };

            let d = index(0)?;
            let a = index(1)?;
            let b = if hadronic { index(2)? } else { 0 };

            if d >= self.ndata || a >= nx || b >= nx {
                return Err(Error::Range(format!(
                    "data line {number} addresses the non-existing point ({d}, {a}, {b})"
                )));
            }

            let cfactor = self.cfactors[d];
            let start = d * self.row_size + if hadronic { a * nx + b } else { a };

            for (j, &column) in columns.iter().enumerate() {
                let value: T = tokens[column].parse().map_err(|_| {
                    Error::Format(format!(
                        "could not parse value `{}` on data line {number}",
                        tokens[column]
                    ))
                })?;

                self.sigma[start + j * self.tx] = T::from_f64(cfactor * value.to_f64());
            }
        }

        Ok(())
    }

    /// Returns a copy of this table that contains only the datapoints whose indices are given in
    /// `mask`, in that order. Indices may repeat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] if `mask` is empty or contains an index that is out of range.
    pub fn masked(&self, mask: &[usize]) -> Result<Self> {
        if mask.is_empty() {
            return Err(Error::Range("datapoints cut to 0".to_owned()));
        }

        if let Some(&d) = mask.iter().find(|&&d| d >= self.ndata) {
            return Err(Error::Range(format!(
                "datapoint {d} doesn't exist, the table has {} datapoints",
                self.ndata
            )));
        }

        let mut sigma = Vec::with_capacity(self.row_size * mask.len());

        for &d in mask {
            sigma.extend_from_slice(self.row(d));
        }

        let mut header = self.header.clone();
        header.set_tag(Section::GridInfo, "NDATA", mask.len());

        Ok(Self {
            header,
            data_name: self.data_name.clone(),
            description: self.description.clone(),
            ndata: mask.len(),
            q20: self.q20,
            flavour_map: self.flavour_map.clone(),
            x_grid: self.x_grid.clone(),
            tx: self.tx,
            pad: self.pad,
            row_size: self.row_size,
            sigma,
            has_cfactors: self.has_cfactors,
            cfactors: mask.iter().map(|&d| self.cfactors[d]).collect(),
        })
    }

    /// Returns the header this table was read from.
    #[must_use]
    pub const fn header(&self) -> &FkHeader {
        &self.header
    }

    /// Returns the name of the dataset.
    #[must_use]
    pub fn data_name(&self) -> &str {
        &self.data_name
    }

    /// Returns the description of the table.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the number of datapoints.
    #[must_use]
    pub const fn ndata(&self) -> usize {
        self.ndata
    }

    /// Returns the squared factorization scale `Q0^2` the PDFs are evaluated at.
    #[must_use]
    pub const fn q20(&self) -> f64 {
        self.q20
    }

    /// Returns `true` if this table convolves two PDFs, and `false` for DIS tables.
    #[must_use]
    pub const fn is_hadronic(&self) -> bool {
        self.flavour_map.is_hadronic()
    }

    /// Returns the number of active flavours.
    #[must_use]
    pub fn nonzero(&self) -> usize {
        self.flavour_map.len()
    }

    /// Returns the map of active-flavour indices to flavours.
    #[must_use]
    pub const fn flavour_map(&self) -> &FlavourMap {
        &self.flavour_map
    }

    /// Returns the number of x-grid points.
    #[must_use]
    pub fn nx(&self) -> usize {
        self.x_grid.len()
    }

    /// Returns the x grid.
    #[must_use]
    pub fn x_grid(&self) -> &[f64] {
        &self.x_grid
    }

    /// Returns the number of values per active flavour and datapoint: `nx * nx` for hadronic and
    /// `nx` for DIS tables.
    #[must_use]
    pub const fn tx(&self) -> usize {
        self.tx
    }

    /// Returns the number of padding elements at the end of each row.
    #[must_use]
    pub const fn pad(&self) -> usize {
        self.pad
    }

    /// Returns the number of elements in each row.
    #[must_use]
    pub const fn row_size(&self) -> usize {
        self.row_size
    }

    /// Returns the flat buffer of all rows.
    #[must_use]
    pub fn sigma(&self) -> &[T] {
        &self.sigma
    }

    /// Returns the row of datapoint `d`, including its padding.
    ///
    /// # Panics
    ///
    /// Panics if `d` is not smaller than [`FkTable::ndata`].
    #[must_use]
    pub fn row(&self, d: usize) -> &[T] {
        &self.sigma[d * self.row_size..(d + 1) * self.row_size]
    }

    /// Returns a view of the tensor indexed by datapoint, active flavour and x-grid combination,
    /// which leaves out the padding.
    #[must_use]
    pub fn sigma_view(&self) -> ArrayView3<'_, T> {
        ArrayView3::from_shape(
            (self.ndata, self.nonzero(), self.tx).strides((self.row_size, self.tx, 1)),
            &self.sigma,
        )
        // the shape always fits into `sigma`
        .unwrap_or_else(|_| unreachable!())
    }

    /// Returns `true` if c-factors were applied when reading the table.
    #[must_use]
    pub const fn has_cfactors(&self) -> bool {
        self.has_cfactors
    }

    /// Returns the product of all c-factors for each datapoint.
    #[must_use]
    pub fn cfactors(&self) -> &[f64] {
        &self.cfactors
    }

    /// Returns the position in [`FkTable::sigma`] of the value for datapoint `d`, x-grid indices
    /// `a` and `b` and flavours `flavour1` and `flavour2`. Returns `Ok(None)` if the flavour pair
    /// isn't active or if any index is out of range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Evaluation`] if this is a DIS table.
    pub fn resolve_index_hadronic(
        &self,
        d: usize,
        a: usize,
        b: usize,
        flavour1: usize,
        flavour2: usize,
    ) -> Result<Option<usize>> {
        if !self.is_hadronic() {
            return Err(Error::Evaluation("hadronic call for DIS table".to_owned()));
        }

        let nx = self.nx();

        Ok(self
            .flavour_map
            .position_hadronic(flavour1, flavour2)
            .filter(|_| d < self.ndata && a < nx && b < nx)
            .map(|j| d * self.row_size + j * self.tx + a * nx + b))
    }

    /// Returns the position in [`FkTable::sigma`] of the value for datapoint `d`, x-grid index `a`
    /// and `flavour`. Returns `Ok(None)` if the flavour isn't active or if any index is out of
    /// range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Evaluation`] if this is a hadronic table.
    pub fn resolve_index_dis(&self, d: usize, a: usize, flavour: usize) -> Result<Option<usize>> {
        if self.is_hadronic() {
            return Err(Error::Evaluation("DIS call for hadronic table".to_owned()));
        }

        Ok(self
            .flavour_map
            .position_dis(flavour)
            .filter(|_| d < self.ndata && a < self.nx())
            .map(|j| d * self.row_size + j * self.tx + a))
    }

    /// Returns the value for datapoint `d`, x-grid indices `a` and `b` and flavours `flavour1` and
    /// `flavour2`, see [`FkTable::resolve_index_hadronic`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Evaluation`] if this is a DIS table.
    pub fn value_hadronic(
        &self,
        d: usize,
        a: usize,
        b: usize,
        flavour1: usize,
        flavour2: usize,
    ) -> Result<Option<T>> {
        Ok(self
            .resolve_index_hadronic(d, a, b, flavour1, flavour2)?
            .map(|index| self.sigma[index]))
    }

    /// Returns the value for datapoint `d`, x-grid index `a` and `flavour`, see
    /// [`FkTable::resolve_index_dis`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Evaluation`] if this is a hadronic table.
    pub fn value_dis(&self, d: usize, a: usize, flavour: usize) -> Result<Option<T>> {
        Ok(self
            .resolve_index_dis(d, a, flavour)?
            .map(|index| self.sigma[index]))
    }

    /// Returns the values for datapoint `d` and x-grid indices `a` and `b` (ignored for DIS
    /// tables) for every flavour (pair) of the full basis, in the order of the data lines.
    /// Inactive flavours are `None`.
    pub(crate) fn basis_values(&self, d: usize, a: usize, b: usize) -> Vec<Option<T>> {
        if self.is_hadronic() {
            iproduct!(0..FLAVOURS, 0..FLAVOURS)
                .map(|(fl1, fl2)| {
                    self.resolve_index_hadronic(d, a, b, fl1, fl2)
                        .ok()
                        .flatten()
                        .map(|index| self.sigma[index])
                })
                .collect()
        } else {
            (0..FLAVOURS)
                .map(|fl| {
                    self.resolve_index_dis(d, a, fl)
                        .ok()
                        .flatten()
                        .map(|index| self.sigma[index])
                })
                .collect()
        }
    }

    /// Returns, for each datapoint, the largest absolute difference between any value of this
    /// table and the corresponding value of `other`. Inactive flavours count as zero. Datapoints
    /// are compared in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] if the tables differ in topology, number of datapoints or number
    /// of x-grid points.
    pub fn max_abs_difference(&self, other: &Self) -> Result<Vec<f64>> {
        if self.is_hadronic() != other.is_hadronic()
            || self.ndata != other.ndata
            || self.nx() != other.nx()
        {
            return Err(Error::Range(format!(
                "tables of shapes ({}, {}, {}) and ({}, {}, {}) can not be compared",
                self.ndata,
                self.nx(),
                if self.is_hadronic() { "hadronic" } else { "DIS" },
                other.ndata,
                other.nx(),
                if other.is_hadronic() { "hadronic" } else { "DIS" },
            )));
        }

        let nx2 = if self.is_hadronic() { self.nx() } else { 1 };
        let value = |v: Option<T>| v.map_or(0.0, Scalar::to_f64);

        Ok((0..self.ndata)
            .into_par_iter()
            .map(|d| {
                iproduct!(0..self.nx(), 0..nx2)
                    .flat_map(|(a, b)| {
                        self.basis_values(d, a, b)
                            .into_iter()
                            .zip(other.basis_values(d, a, b))
                            .map(|(lhs, rhs)| (value(lhs) - value(rhs)).abs())
                    })
                    .fold(0.0, f64::max)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DIS: &str = "{GridDesc___________________________________________________
DIS toy table
_GridInfo___________________________________________________
*SETNAME: TOYDIS
*HADRONIC: 0
*NDATA: 3
*NX: 3
{FlavourMap_________________________________________________
0 1 1 0 0 0 0 0 0 0 0 0 0 0
_TheoryInfo_________________________________________________
*Q0: 2
{xGrid______________________________________________________
0.01
0.1
0.5
{FastKernel_________________________________________________
0 0 0 1.0 2.0 0 0 0 0 0 0 0 0 0 0 0
0 2 0 3.0 4.0 0 0 0 0 0 0 0 0 0 0 0
2 1 0 5.0 0 0 0 0 0 0 0 0 0 0 0 0

2 1 0 6.0 0 0 0 0 0 0 0 0 0 0 0 0
";

    fn hadronic(ndata: usize, lines: &str) -> String {
        let mut bits = vec!["0"; FLAVOURS * FLAVOURS];
        bits[FLAVOURS + 2] = "1";
        bits[2 * FLAVOURS + 1] = "1";

        format!(
            "{{GridDesc___________________________________________________
hadronic toy table
_GridInfo___________________________________________________
*SETNAME: TOYHAD
*HADRONIC: 1
*NDATA: {ndata}
*NX: 2
{{FlavourMap_________________________________________________
{}
_TheoryInfo_________________________________________________
*Q0: 1.5
{{xGrid______________________________________________________
0.1 0.2
{{FastKernel_________________________________________________
{lines}",
            bits.join(" ")
        )
    }

    fn hadronic_line(d: usize, a: usize, b: usize, values: &[(usize, usize, f64)]) -> String {
        let mut tokens = vec![d.to_string(), a.to_string(), b.to_string()];
        let mut basis = vec!["0".to_owned(); FLAVOURS * FLAVOURS];

        for &(fl1, fl2, value) in values {
            basis[FLAVOURS * fl1 + fl2] = value.to_string();
        }

        tokens.extend(basis);
        tokens.join(" ") + "\n"
    }

    #[test]
    fn dis_layout() {
        let table = FkTable::<f32>::read(Cursor::new(DIS), &[]).unwrap();

        assert_eq!(table.data_name(), "TOYDIS");
        assert_eq!(table.description(), "DIS toy table");
        assert_eq!(table.ndata(), 3);
        assert_eq!(table.nx(), 3);
        assert_eq!(table.q20(), 4.0);
        assert!(!table.is_hadronic());
        assert_eq!(table.nonzero(), 2);
        assert_eq!(table.tx(), 3);
        assert_eq!(table.pad(), 2);
        assert_eq!(table.row_size(), 8);
        assert_eq!(table.sigma().len(), 24);
        assert!(!table.has_cfactors());
        assert_eq!(table.cfactors(), [1.0; 3]);

        assert_eq!(table.row(0), [1.0, 0.0, 3.0, 2.0, 0.0, 4.0, 0.0, 0.0]);
        assert_eq!(table.row(1), [0.0; 8]);
        // the last line for the same point wins
        assert_eq!(table.row(2), [0.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn dis_in_double_precision_has_no_padding() {
        let table = FkTable::<f64>::read(Cursor::new(DIS), &[]).unwrap();

        assert_eq!(table.pad(), 0);
        assert_eq!(table.row_size(), 6);
        assert_eq!(table.row(0), [1.0, 0.0, 3.0, 2.0, 0.0, 4.0]);
    }

    #[test]
    fn padding_is_always_zero() {
        let table = FkTable::<f32>::read(Cursor::new(DIS), &[]).unwrap();
        let unpadded = table.tx() * table.nonzero();

        assert_eq!(table.row_size() % scalar::alignment_factor::<f32>(), 0);

        for d in 0..table.ndata() {
            assert!(table.row(d)[unpadded..].iter().all(|&value| value == 0.0));
        }
    }

    #[test]
    fn hadronic_layout() {
        let lines = hadronic_line(0, 0, 1, &[(1, 2, 1.5), (2, 1, 2.5), (3, 3, 9.0)])
            + &hadronic_line(1, 1, 0, &[(2, 1, 7.0)]);
        let table = FkTable::<f64>::read(Cursor::new(hadronic(2, &lines)), &[]).unwrap();

        assert!(table.is_hadronic());
        assert_eq!(table.flavour_map(), &FlavourMap::Hadronic(vec![(1, 2), (2, 1)]));
        assert_eq!(table.tx(), 4);
        assert_eq!(table.row_size(), 8);
        assert_eq!(table.q20(), 2.25);
        assert_eq!(table.row(0), [0.0, 1.5, 0.0, 0.0, 0.0, 2.5, 0.0, 0.0]);
        assert_eq!(table.row(1), [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 7.0, 0.0]);

        assert_eq!(table.resolve_index_hadronic(1, 1, 0, 2, 1).unwrap(), Some(14));
        assert_eq!(table.value_hadronic(0, 0, 1, 1, 2).unwrap(), Some(1.5));
        // inactive flavours are not stored
        assert_eq!(table.value_hadronic(0, 0, 1, 3, 3).unwrap(), None);
        assert_eq!(table.value_hadronic(2, 0, 1, 1, 2).unwrap(), None);
        assert_eq!(table.value_hadronic(0, 2, 1, 1, 2).unwrap(), None);
        assert!(matches!(
            table.resolve_index_dis(0, 0, 1),
            Err(Error::Evaluation(_))
        ));
    }

    #[test]
    fn dis_index_resolution() {
        let table = FkTable::<f32>::read(Cursor::new(DIS), &[]).unwrap();

        assert_eq!(table.resolve_index_dis(2, 1, 1).unwrap(), Some(17));
        assert_eq!(table.value_dis(0, 2, 2).unwrap(), Some(4.0));
        assert_eq!(table.value_dis(0, 2, 0).unwrap(), None);
        assert_eq!(table.value_dis(3, 0, 1).unwrap(), None);
        assert_eq!(table.value_dis(0, 3, 1).unwrap(), None);
        assert!(matches!(
            table.resolve_index_hadronic(0, 0, 0, 1, 1),
            Err(Error::Evaluation(_))
        ));
    }

    #[test]
    fn sigma_view_skips_padding() {
        let table = FkTable::<f32>::read(Cursor::new(DIS), &[]).unwrap();
        let view = table.sigma_view();

        assert_eq!(view.shape(), [3, 2, 3]);
        assert_eq!(view[[0, 1, 2]], 4.0);
        assert_eq!(view[[2, 0, 1]], 6.0);
        assert_eq!(view.iter().copied().sum::<f32>(), 16.0);
    }

    #[test]
    fn zero_dimensions() {
        let no_data = DIS.replace("*NDATA: 3", "*NDATA: 0");
        let negative_x = DIS.replace("*NX: 3", "*NX: -1");
        let no_flavours = DIS.replace(
            "0 1 1 0 0 0 0 0 0 0 0 0 0 0",
            "0 0 0 0 0 0 0 0 0 0 0 0 0 0",
        );

        for text in [no_data, negative_x, no_flavours] {
            assert!(matches!(
                FkTable::<f64>::read(Cursor::new(text), &[]),
                Err(Error::Range(_))
            ));
        }
    }

    #[test]
    fn malformed_data_lines() {
        let out_of_range = DIS.replace("2 1 0 6.0", "3 1 0 6.0");
        let unparsable = DIS.replace("2 1 0 6.0", "2 1 0 six");
        let short = DIS.replace("2 1 0 6.0 0 0 0 0 0 0 0 0 0 0 0 0", "2 1 0");

        assert!(matches!(
            FkTable::<f64>::read(Cursor::new(out_of_range), &[]),
            Err(Error::Range(_))
        ));
        assert!(matches!(
            FkTable::<f64>::read(Cursor::new(unparsable), &[]),
            Err(Error::Format(_))
        ));
        assert!(matches!(
            FkTable::<f64>::read(Cursor::new(short), &[]),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn cfactors_scale_values() {
        let text = hadronic(2, &(hadronic_line(0, 0, 0, &[(1, 2, 10.0)])
            + &hadronic_line(1, 0, 0, &[(1, 2, 10.0)])));
        let cfactors = CFactors::read(Cursor::new("****\nTOY\n****\n2.0\n0.5\n")).unwrap();
        let table = FkTable::<f64>::read(Cursor::new(text), &[cfactors]).unwrap();

        assert!(table.has_cfactors());
        assert_eq!(table.cfactors(), [2.0, 0.5]);
        assert_eq!(table.value_hadronic(0, 0, 0, 1, 2).unwrap(), Some(20.0));
        assert_eq!(table.value_hadronic(1, 0, 0, 1, 2).unwrap(), Some(5.0));
    }

    #[test]
    fn masked_copy() {
        let table = FkTable::<f32>::read(Cursor::new(DIS), &[]).unwrap();
        let masked = table.masked(&[2, 0]).unwrap();

        assert_eq!(masked.ndata(), 2);
        assert_eq!(masked.row(0), table.row(2));
        assert_eq!(masked.row(1), table.row(0));
        assert_eq!(masked.sigma().len(), 2 * table.row_size());
        assert_eq!(
            masked.header().get_tag::<usize>(Section::GridInfo, "NDATA").unwrap(),
            2
        );

        let repeated = table.masked(&[1, 1, 1, 1]).unwrap();
        assert_eq!(repeated.ndata(), 4);

        assert!(matches!(table.masked(&[]), Err(Error::Range(_))));
        assert!(matches!(table.masked(&[0, 3]), Err(Error::Range(_))));
    }

    #[test]
    fn clone_is_independent() {
        let table = FkTable::<f64>::read(Cursor::new(DIS), &[]).unwrap();
        let copy = table.clone();

        assert_eq!(copy.sigma(), table.sigma());
        assert_ne!(copy.sigma().as_ptr(), table.sigma().as_ptr());
        assert_eq!(copy.x_grid(), table.x_grid());
        assert_eq!(copy.flavour_map(), table.flavour_map());
    }

    #[test]
    fn max_abs_difference() {
        let table = FkTable::<f64>::read(Cursor::new(DIS), &[]).unwrap();
        let modified = FkTable::<f64>::read(Cursor::new(DIS.replace("3.0 4.0", "3.0 4.5")), &[])
            .unwrap();

        assert_eq!(table.max_abs_difference(&table).unwrap(), [0.0; 3]);
        assert_eq!(table.max_abs_difference(&modified).unwrap(), [0.5, 0.0, 0.0]);
        assert!(matches!(
            table.max_abs_difference(&table.masked(&[0]).unwrap()),
            Err(Error::Range(_))
        ));
    }
}
