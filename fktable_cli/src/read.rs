use super::helpers;
use super::{GlobalConfiguration, Subcommand};
use anyhow::{Result, anyhow};
use clap::{Args, Parser, ValueHint};
use fktable::flavour_map::FlavourMap;
use fktable::header::Section;
use fktable::pids;
use prettytable::row;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args)]
#[group(multiple = false, required = true)]
struct Group {
    /// Show the name and dimensions of the table.
    #[arg(long, short)]
    info: bool,
    /// Show the active flavours.
    #[arg(long, short)]
    flavours: bool,
    /// Show the x grid.
    #[arg(long, short)]
    xgrid: bool,
    /// Gets a tag of the header, given as SECTION/KEY or as the title of a blob.
    #[arg(long, value_name = "TAG")]
    get: Option<String>,
    /// Shows the complete header.
    #[arg(long)]
    show: bool,
}

/// Read out information of an FK table.
#[derive(Parser)]
pub struct Opts {
    /// Path to the input FK table.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
    #[command(flatten)]
    group: Group,
}

fn flavour(fl: usize) -> (&'static str, i32) {
    (
        pids::evol_name(fl).unwrap_or("?"),
        pids::evol_id(fl).unwrap_or_default(),
    )
}

impl Subcommand for Opts {
    fn run(&self, _: &GlobalConfiguration) -> Result<ExitCode> {
        let fk_table = helpers::read_table(&self.input, &[])?;
        let mut table = helpers::create_table();

        if self.group.info {
            table.set_titles(row![c => "property", "value"]);
            table.add_row(row!["name", fk_table.data_name()]);
            table.add_row(row!["description", fk_table.description()]);
            table.add_row(row![
                "type",
                if fk_table.is_hadronic() { "hadronic" } else { "DIS" }
            ]);
            table.add_row(row!["datapoints", r->fk_table.ndata()]);
            table.add_row(row!["x points", r->fk_table.nx()]);
            table.add_row(row!["active flavours", r->fk_table.nonzero()]);
            table.add_row(row!["Q0^2", r->fk_table.q20()]);
            table.add_row(row!["padding", r->fk_table.pad()]);
        } else if self.group.flavours {
            match fk_table.flavour_map() {
                FlavourMap::Dis(flavours) => {
                    table.set_titles(row![c => "i", "flavour", "pid"]);

                    for (index, &fl) in flavours.iter().enumerate() {
                        let (name, pid) = flavour(fl);
                        table.add_row(row![index, name, r->pid]);
                    }
                }
                FlavourMap::Hadronic(pairs) => {
                    table.set_titles(row![c => "i", "flavour1", "flavour2", "pid1", "pid2"]);

                    for (index, &(fl1, fl2)) in pairs.iter().enumerate() {
                        let (name1, pid1) = flavour(fl1);
                        let (name2, pid2) = flavour(fl2);
                        table.add_row(row![index, name1, name2, r->pid1, r->pid2]);
                    }
                }
            }
        } else if self.group.xgrid {
            table.set_titles(row![c => "a", "x"]);

            for (index, x) in fk_table.x_grid().iter().enumerate() {
                table.add_row(row![index, r->format!("{x:e}")]);
            }
        } else if let Some(tag) = &self.group.get {
            let value = if let Some((section, key)) = tag.split_once('/') {
                let section = [Section::VersionInfo, Section::GridInfo, Section::TheoryInfo]
                    .into_iter()
                    .find(|s| s.title() == section)
                    .ok_or_else(|| anyhow!("unknown section `{section}`"))?;

                fk_table.header().tag(section, key)
            } else {
                fk_table.header().tag(Section::Blob, tag)
            };

            println!(
                "{}",
                value.ok_or_else(|| anyhow!("tag `{tag}` not found"))?
            );

            return Ok(ExitCode::SUCCESS);
        } else if self.group.show {
            fk_table.header().write(io::stdout().lock())?;

            return Ok(ExitCode::SUCCESS);
        } else {
            unreachable!();
        }

        table.printstd();

        Ok(ExitCode::SUCCESS)
    }
}
