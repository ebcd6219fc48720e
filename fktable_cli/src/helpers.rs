use anyhow::{Context, Result};
use fktable::cfactors::CFactors;
use fktable::fk_table::FkTable;
use flate2::Compression;
use flate2::write::GzEncoder;
use prettytable::format::{FormatBuilder, LinePosition, LineSeparator};
use prettytable::Table;
use std::fs::File;
use std::io::Write;
use std::ops::RangeInclusive;
use std::path::Path;

pub fn read_table(input: &Path, cfactors: &[CFactors]) -> Result<FkTable<f64>> {
    FkTable::from_path(input, cfactors)
        .with_context(|| format!("unable to read FK table `{}`", input.display()))
}

pub fn read_cfactors(input: &Path) -> Result<CFactors> {
    CFactors::from_path(input)
        .with_context(|| format!("unable to read c-factors `{}`", input.display()))
}

pub fn write_table(output: &Path, table: &FkTable<f64>) -> Result<()> {
    let file = File::create(output)
        .with_context(|| format!("unable to create file `{}`", output.display()))?;

    if output.extension().is_some_and(|ext| ext == "gz") {
        let mut encoder = GzEncoder::new(file, Compression::default());
        table.write(&mut encoder)?;
        encoder.finish()?.flush()?;
    } else {
        table.write(file)?;
    }

    Ok(())
}

pub fn create_table() -> Table {
    let mut table = Table::new();
    table.set_format(
        FormatBuilder::new()
            .column_separator(' ')
            .separator(LinePosition::Title, LineSeparator::new('-', '+', ' ', ' '))
            .build(),
    );
    table
}

fn parse_integer_range(range: &str) -> Result<RangeInclusive<usize>> {
    if let Some((left, right)) = range.split_once('-') {
        let left = left.trim().parse()?;
        let right = right.trim().parse()?;

        anyhow::ensure!(left <= right, "range `{range}` is empty");

        Ok(left..=right)
    } else {
        let index = range.trim().parse()?;

        Ok(index..=index)
    }
}

/// Parses a comma-separated list of indices and inclusive ranges, for example `0-2,5`.
pub fn parse_integer_list(list: &str) -> Result<Vec<usize>> {
    let mut integers = Vec::new();

    for range in list.split_terminator(',') {
        integers.extend(
            parse_integer_range(range).with_context(|| format!("invalid index list `{list}`"))?,
        );
    }

    Ok(integers)
}
