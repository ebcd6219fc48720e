//! Subcommands of the `fktable` program.

mod diff;
mod helpers;
mod read;
mod write;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use enum_dispatch::enum_dispatch;
use git_version::git_version;
use rayon::ThreadPoolBuilder;
use std::process::ExitCode;

/// Options shared by all subcommands.
#[derive(Parser)]
pub struct GlobalConfiguration {
    /// Number of threads to utilize, all available cores if zero.
    #[arg(default_value_t = 0, long, value_name = "N")]
    pub threads: usize,
    /// Increase the verbosity of the log written to stderr; repeat for more details.
    #[arg(action = ArgAction::Count, long, short)]
    pub verbose: u8,
}

impl GlobalConfiguration {
    /// Configures the global `rayon` thread pool according to `--threads`.
    ///
    /// # Errors
    ///
    /// Fails if the global thread pool has already been built.
    pub fn install_thread_pool(&self) -> Result<()> {
        ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build_global()
            .context("failed to configure the thread pool")
    }
}

/// A subcommand of the `fktable` program.
#[enum_dispatch]
pub trait Subcommand {
    /// Runs the subcommand.
    ///
    /// # Errors
    ///
    /// Returns errors of reading, writing or processing tables.
    fn run(&self, cfg: &GlobalConfiguration) -> Result<ExitCode>;
}

/// All subcommands.
#[enum_dispatch(Subcommand)]
#[derive(Parser)]
pub enum SubcommandEnum {
    /// Compares the contents of two FK tables.
    Diff(diff::Opts),
    /// Reads out information of an FK table.
    Read(read::Opts),
    /// Writes an FK table modified by various operations.
    Write(write::Opts),
}

/// Command-line options of the `fktable` program.
#[derive(Parser)]
#[command(
    arg_required_else_help = true,
    about,
    disable_help_subcommand = true,
    name = "fktable",
    version = git_version!(
        args = ["--always", "--dirty", "--long", "--tags"],
        cargo_prefix = "",
        fallback = "unknown"
    )
)]
#[allow(missing_docs)]
pub struct Opts {
    #[command(flatten)]
    pub configuration: GlobalConfiguration,
    #[command(subcommand)]
    pub subcommand: SubcommandEnum,
}
