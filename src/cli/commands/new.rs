//! `tolstack new` command - create an empty stackup file

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::analysis::validate_limits;
use crate::entities::stackup::StackupConfig;

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Stackup file to create (.yaml, or .json for JSON)
    pub file: PathBuf,

    /// Analysis name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Upper specification limit
    #[arg(long, allow_negative_numbers = true)]
    pub usl: Option<f64>,

    /// Lower specification limit
    #[arg(long, allow_negative_numbers = true)]
    pub lsl: Option<f64>,

    /// Design target for the closing gap
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub target: f64,

    /// Free-form description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Overwrite an existing file
    #[arg(long, short = 'f')]
    pub force: bool,
}

pub fn run(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    validate_limits(args.usl, args.lsl).map_err(|e| miette::miette!("{}", e))?;

    let mut stackup = StackupConfig::new(args.name).with_limits(args.usl, args.lsl);
    stackup.target_gap_nominal = args.target;
    stackup.description = args.description.unwrap_or_default();

    let saved = if args.force {
        stackup.save(&args.file)
    } else {
        stackup.save_new(&args.file)
    };
    saved.map_err(|e| miette::miette!("{}", e))?;

    tracing::info!(path = %args.file.display(), id = %stackup.id, "created stackup");

    if !global.quiet {
        println!(
            "{} Created stackup {} at {}",
            style("✓").green(),
            style(&stackup.name).cyan(),
            args.file.display()
        );
        println!(
            "   Add dimensions with: {}",
            style(format!("tolstack dim add {} --name <NAME> --nominal <VALUE>", args.file.display())).dim()
        );
    }

    Ok(())
}
