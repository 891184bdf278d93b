//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod helpers;
pub mod output;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};

use miette::Result;

/// Run the parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let global = cli.global;
    match cli.command {
        Commands::New(args) => commands::new::run(args, &global),
        Commands::Dim(cmd) => commands::dim::run(cmd, &global),
        Commands::Analyze(args) => commands::analyze::run(args, &global),
        Commands::Limits(args) => commands::limits::run(args, &global),
        Commands::Validate(args) => commands::validate::run(args, &global),
        Commands::Processes(args) => commands::processes::run(args),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
