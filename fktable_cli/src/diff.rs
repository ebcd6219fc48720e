use super::helpers;
use super::{GlobalConfiguration, Subcommand};
use anyhow::{Result, bail};
use clap::{Parser, ValueHint};
use prettytable::row;
use std::path::PathBuf;
use std::process::ExitCode;

/// Compares the numerical content of two FK tables with each other.
#[derive(Parser)]
pub struct Opts {
    /// Path to the first FK table.
    #[arg(value_hint = ValueHint::FilePath)]
    input1: PathBuf,
    /// Path to the second FK table.
    #[arg(value_hint = ValueHint::FilePath)]
    input2: PathBuf,
    /// Set the number of fractional digits shown for differences.
    #[arg(default_value_t = 3, long, value_name = "DIGITS")]
    digits: usize,
    /// Exit with failure if any difference is larger than this threshold.
    #[arg(long, value_name = "THRESHOLD")]
    threshold: Option<f64>,
}

impl Subcommand for Opts {
    fn run(&self, _: &GlobalConfiguration) -> Result<ExitCode> {
        let table1 = helpers::read_table(&self.input1, &[])?;
        let table2 = helpers::read_table(&self.input2, &[])?;

        if table1.x_grid() != table2.x_grid() {
            bail!("x grids differ");
        }

        let differences = table1.max_abs_difference(&table2)?;

        let mut table = helpers::create_table();
        table.set_titles(row![c => "d", "max abs diff"]);

        for (datapoint, difference) in differences.iter().enumerate() {
            table.add_row(row![
                datapoint.to_string(),
                r->format!("{:.*e}", self.digits, difference)
            ]);
        }

        table.printstd();

        if let Some(threshold) = self.threshold
            && differences.iter().any(|&difference| difference > threshold)
        {
            return Ok(ExitCode::FAILURE);
        }

        Ok(ExitCode::SUCCESS)
    }
}
