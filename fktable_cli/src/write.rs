use super::helpers;
use super::{GlobalConfiguration, Subcommand};
use anyhow::Result;
use clap::{Parser, ValueHint};
use std::path::PathBuf;
use std::process::ExitCode;

/// Write an FK table modified by various operations.
#[derive(Parser)]
pub struct Opts {
    /// Path to the input FK table.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
    /// Path of the modified FK table, compressed if it ends in `.gz`.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
    /// Multiply the table with the c-factors in FILE; may be repeated.
    #[arg(long, value_hint = ValueHint::FilePath, value_name = "FILE")]
    cfac: Vec<PathBuf>,
    /// Keep only the listed datapoints, in the given order, e.g. `0-3,7`.
    #[arg(long, value_name = "LIST")]
    datapoints: Option<String>,
}

impl Subcommand for Opts {
    fn run(&self, _: &GlobalConfiguration) -> Result<ExitCode> {
        let cfactors = self
            .cfac
            .iter()
            .map(|path| helpers::read_cfactors(path))
            .collect::<Result<Vec<_>>>()?;
        let mut table = helpers::read_table(&self.input, &cfactors)?;

        if let Some(list) = &self.datapoints {
            let mask = helpers::parse_integer_list(list)?;
            tracing::info!("keeping {} of {} datapoints", mask.len(), table.ndata());
            table = table.masked(&mask)?;
        }

        helpers::write_table(&self.output, &table)?;

        Ok(ExitCode::SUCCESS)
    }
}
