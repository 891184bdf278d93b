//! `tolstack limits` command - suggest spec limits from the RSS natural limits

use console::style;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::format_limit;
use crate::cli::output::print_structured;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::analysis::{calculate_rss, suggest_limits, AnalysisError};
use crate::core::Config;
use crate::entities::stackup::StackupConfig;

#[derive(clap::Args, Debug)]
pub struct LimitsArgs {
    /// Stackup file
    pub file: PathBuf,

    /// Store the suggested limits in the stackup file
    #[arg(long, short = 'w')]
    pub write: bool,

    /// Capability index for dimensions without one (default: 1.33 or configured)
    #[arg(long)]
    pub default_cpk: Option<f64>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct LimitsReport {
    nominal: f64,
    sigma: f64,
    lower: f64,
    upper: f64,
    written: bool,
}

pub fn run(args: LimitsArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let default_cpk = args.default_cpk.unwrap_or_else(|| config.default_cpk());
    if !default_cpk.is_finite() || default_cpk <= 0.0 {
        return Err(miette::miette!("{}", AnalysisError::InvalidDefaultCpk(default_cpk)));
    }

    let mut stackup = StackupConfig::load(&args.file)
        .map_err(|e| miette::miette!("Failed to load {}: {}", args.file.display(), e))?;

    // Existing limits are about to be replaced, so only the chain must be valid
    if stackup.dimensions.is_empty() {
        return Err(miette::miette!("{}", AnalysisError::EmptyChain));
    }
    for dim in &stackup.dimensions {
        dim.validate().map_err(|e| miette::miette!("{}", e))?;
    }

    let rss = calculate_rss(&stackup.dimensions, default_cpk).result;
    let (upper, lower) = suggest_limits(&rss);

    if args.write {
        let previous = (stackup.lower_spec_limit, stackup.upper_spec_limit);
        stackup.lower_spec_limit = Some(lower);
        stackup.upper_spec_limit = Some(upper);
        stackup
            .save(&args.file)
            .map_err(|e| miette::miette!("{}", e))?;
        tracing::info!(
            path = %args.file.display(),
            lower,
            upper,
            previous_lower = ?previous.0,
            previous_upper = ?previous.1,
            "wrote suggested limits"
        );
    }

    let report = LimitsReport {
        nominal: rss.nominal,
        sigma: rss.sigma,
        lower,
        upper,
        written: args.write,
    };
    if print_structured(&report, args.format)? {
        return Ok(());
    }

    println!(
        "   {} for {} (RSS ±3σ, default cpk {:.2}):",
        style("Suggested Limits").bold(),
        style(&stackup.name).cyan(),
        default_cpk
    );
    println!("     Mean: {:.4}", rss.nominal);
    println!("     σ: {:.4}", rss.sigma);
    println!("     LSL: {}", style(format!("{:.2}", lower)).cyan());
    println!("     USL: {}", style(format!("{:.2}", upper)).cyan());

    if args.write {
        if !global.quiet {
            println!(
                "{} Wrote limits to {}",
                style("✓").green(),
                args.file.display()
            );
        }
    } else if stackup.has_spec() {
        println!(
            "     Current: LSL {} / USL {} (use --write to replace)",
            format_limit(stackup.lower_spec_limit, 0.01),
            format_limit(stackup.upper_spec_limit, 0.01)
        );
    }

    Ok(())
}
