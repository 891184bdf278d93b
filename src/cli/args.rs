//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    analyze::AnalyzeArgs, completions::CompletionsArgs, dim::DimCommands, limits::LimitsArgs,
    new::NewArgs, processes::ProcessesArgs, validate::ValidateArgs,
};

#[derive(Parser, Debug)]
#[command(name = "tolstack")]
#[command(author, version, about = "One-dimensional tolerance stackup analysis")]
#[command(long_about = "Analyze tolerance chains with worst-case, RSS and Monte Carlo methods.\n\n\
    Stackups are stored as YAML (or JSON when the file ends in .json).")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every subcommand
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress and confirmation messages
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new, empty stackup file
    New(NewArgs),

    /// Add, list or remove dimensions of a stackup
    #[command(subcommand)]
    Dim(DimCommands),

    /// Run worst-case, RSS and Monte Carlo analysis
    Analyze(AnalyzeArgs),

    /// Suggest spec limits from the RSS natural limits
    Limits(LimitsArgs),

    /// Check stackup files for invalid dimensions and limits
    Validate(ValidateArgs),

    /// Show the manufacturing process table and IT grade guide
    Processes(ProcessesArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for report-style commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::try_parse_from(["tolstack", "-vv", "processes"]).unwrap();
        assert_eq!(cli.global.verbose, 2);
        assert!(!cli.global.quiet);
    }
}
