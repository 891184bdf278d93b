//! `tolstack processes` command - manufacturing process reference tables

use console::style;
use miette::Result;
use serde::Serialize;
use tabled::settings::Style;
use tabled::Table;

use crate::cli::output::print_structured;
use crate::cli::OutputFormat;
use crate::entities::process::{ItGrade, ProcessCapability, IT_GRADES, MANUFACTURING_PROCESSES};

#[derive(clap::Args, Debug)]
pub struct ProcessesArgs {
    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ProcessTables {
    processes: &'static [ProcessCapability],
    it_grades: &'static [ItGrade],
}

pub fn run(args: ProcessesArgs) -> Result<()> {
    let tables = ProcessTables {
        processes: MANUFACTURING_PROCESSES,
        it_grades: IT_GRADES,
    };
    if print_structured(&tables, args.format)? {
        return Ok(());
    }

    println!("{}", style("Manufacturing Processes").bold());
    println!("{}", Table::new(MANUFACTURING_PROCESSES).with(Style::rounded()));
    println!();
    println!("{}", style("IT Grade Guide").bold());
    println!("{}", Table::new(IT_GRADES).with(Style::rounded()));
    println!();
    println!(
        "{} Use a process with: {}",
        style("→").blue(),
        style("tolstack dim add <FILE> --name <NAME> --nominal <VALUE> --process \"Grinding\"").dim()
    );
    Ok(())
}
