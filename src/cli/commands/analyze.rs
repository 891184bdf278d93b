//! `tolstack analyze` command - run worst-case, RSS and Monte Carlo analysis

use chrono::{DateTime, Utc};
use console::style;
use miette::{IntoDiagnostic, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::helpers::{bar, format_limit, smart_round};
use crate::cli::output::print_structured;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::analysis::{
    analyze, CapabilityRating, HistogramBin, MonteCarloResult, SimulationResult, SpecLimits,
};
use crate::core::Config;
use crate::entities::stackup::StackupConfig;

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Stackup file
    pub file: PathBuf,

    /// Number of Monte Carlo iterations (default: 10000 or configured)
    #[arg(long, short = 'i')]
    pub iterations: Option<usize>,

    /// Seed for a reproducible run (default: configured seed or random)
    #[arg(long, short = 's')]
    pub seed: Option<u64>,

    /// Number of histogram bins (default: 40 or configured)
    #[arg(long)]
    pub bins: Option<usize>,

    /// Worker threads for Monte Carlo; 1 runs sequentially
    #[arg(long, short = 'j')]
    pub threads: Option<usize>,

    /// Capability index for dimensions without one (default: 1.33 or configured)
    #[arg(long)]
    pub default_cpk: Option<f64>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Show ASCII histogram of the Monte Carlo distribution
    #[arg(long, short = 'H')]
    pub histogram: bool,

    /// Write raw Monte Carlo samples as CSV to this path
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Show variance contribution per dimension
    #[arg(long, short = 'S')]
    pub sensitivity: bool,

    /// Include raw samples in JSON/YAML output
    #[arg(long)]
    pub samples: bool,
}

/// Machine-readable analysis report
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub stackup_id: String,
    pub stackup_name: String,
    pub analyzed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub iterations: usize,
    pub default_cpk: f64,
    pub spec_limits: SpecLimits,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_limits: Option<SuggestedLimits>,
    pub results: SimulationResult,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SuggestedLimits {
    pub lower: f64,
    pub upper: f64,
}

pub fn run(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let stackup = StackupConfig::load(&args.file)
        .map_err(|e| miette::miette!("Failed to load {}: {}", args.file.display(), e))?;

    let mut options = config.analysis_options(args.iterations, args.bins, args.threads);
    if let Some(cpk) = args.default_cpk {
        options.default_cpk = cpk;
    }

    let seed = args.seed.or(config.seed());
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    tracing::info!(
        path = %args.file.display(),
        dimensions = stackup.dimension_count(),
        iterations = options.monte_carlo.iterations,
        seed = ?seed,
        "analyzing stackup"
    );

    if args.format == OutputFormat::Text && !global.quiet {
        println!(
            "{} Analyzing stackup {} with {} dimension(s)...",
            style("⚙").cyan(),
            style(&stackup.name).cyan(),
            stackup.dimension_count()
        );
    }

    let mut result = analyze(&stackup, &options, &mut rng).map_err(|e| miette::miette!("{}", e))?;
    let limits = SpecLimits::new(stackup.upper_spec_limit, stackup.lower_spec_limit);

    if let Some(ref path) = args.csv {
        write_samples_csv(path, &result.monte_carlo.samples, limits)?;
        tracing::info!(path = %path.display(), "wrote samples");
    }

    if args.format == OutputFormat::Text {
        print_report(&stackup, &result, &args, options.monte_carlo.iterations);
        if let Some(ref path) = args.csv {
            if !global.quiet {
                println!();
                println!(
                    "{} Wrote {} samples to {}",
                    style("✓").green(),
                    result.monte_carlo.samples.len(),
                    path.display()
                );
            }
        }
        return Ok(());
    }

    if !args.samples {
        result.monte_carlo.samples.clear();
    }
    let suggested = if stackup.has_spec() {
        None
    } else {
        let (upper, lower) = crate::core::analysis::suggest_limits(&result.rss);
        Some(SuggestedLimits { lower, upper })
    };

    let report = AnalysisReport {
        stackup_id: stackup.id.clone(),
        stackup_name: stackup.name.clone(),
        analyzed_at: Utc::now(),
        seed,
        iterations: options.monte_carlo.iterations,
        default_cpk: options.default_cpk,
        spec_limits: limits,
        suggested_limits: suggested,
        results: result,
    };
    print_structured(&report, args.format)?;
    Ok(())
}

/// Write samples as `sample,value,in_spec` rows
fn write_samples_csv(path: &Path, samples: &[f64], limits: SpecLimits) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).into_diagnostic()?;
    writer
        .write_record(["sample", "value", "in_spec"])
        .into_diagnostic()?;
    for (i, value) in samples.iter().enumerate() {
        writer
            .write_record([
                (i + 1).to_string(),
                format!("{:.6}", value),
                u8::from(limits.accepts(*value)).to_string(),
            ])
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

/// Reference precision for formatting: spec band, else worst-case range
fn reference_precision(stackup: &StackupConfig, result: &SimulationResult) -> f64 {
    match (stackup.upper_spec_limit, stackup.lower_spec_limit) {
        (Some(usl), Some(lsl)) if usl > lsl => usl - lsl,
        _ => result.worst_case.range().max(0.001),
    }
}

fn pass_fail(pass: bool) -> console::StyledObject<&'static str> {
    if pass {
        style("PASS").green().bold()
    } else {
        style("FAIL").red().bold()
    }
}

fn print_report(stackup: &StackupConfig, result: &SimulationResult, args: &AnalyzeArgs, iterations: usize) {
    let p = reference_precision(stackup, result);
    let limits = SpecLimits::new(stackup.upper_spec_limit, stackup.lower_spec_limit);

    println!();
    println!(
        "   Target: {} = {} (LSL: {}, USL: {})",
        style(&stackup.name).yellow(),
        smart_round(stackup.target_gap_nominal, p),
        format_limit(stackup.lower_spec_limit, p),
        format_limit(stackup.upper_spec_limit, p)
    );

    let wc = &result.worst_case;
    println!();
    println!("   {} Analysis:", style("Worst-Case").bold());
    println!("     Nominal: {}", smart_round(wc.nominal, p));
    println!(
        "     Range: {} to {}",
        smart_round(wc.min, p),
        smart_round(wc.max, p)
    );
    if stackup.has_spec() {
        println!(
            "     Result: {}",
            pass_fail(limits.accepts(wc.min) && limits.accepts(wc.max))
        );
    }

    let rss = &result.rss;
    println!();
    println!("   {} Analysis:", style("RSS (Statistical)").bold());
    println!("     Mean: {}", smart_round(rss.nominal, p));
    println!("     σ: {}", smart_round(rss.sigma, p));
    println!(
        "     ±3σ: {} to {}",
        smart_round(rss.min, p),
        smart_round(rss.max, p)
    );
    if stackup.has_spec() {
        println!(
            "     Result: {}",
            pass_fail(limits.accepts(rss.min) && limits.accepts(rss.max))
        );
    } else {
        let (upper, lower) = crate::core::analysis::suggest_limits(rss);
        println!(
            "     Suggested limits: {} to {}",
            style(format!("{:.2}", lower)).cyan(),
            style(format!("{:.2}", upper)).cyan()
        );
    }

    if args.sensitivity && !result.contributions.is_empty() {
        println!();
        println!(
            "   {} (Variance Contribution):",
            style("Sensitivity Analysis").bold()
        );
        for contrib in &result.contributions {
            let pct = contrib.percent;
            let pct_styled = if pct >= 50.0 {
                style(format!("{:5.1}%", pct)).red().bold()
            } else if pct >= 25.0 {
                style(format!("{:5.1}%", pct)).yellow()
            } else {
                style(format!("{:5.1}%", pct)).dim()
            };
            println!("     {} {} {}", pct_styled, bar(pct / 100.0, 30), contrib.name);
        }
    }

    let mc = &result.monte_carlo;
    println!();
    println!(
        "   {} ({} iterations):",
        style("Monte Carlo").bold(),
        iterations
    );
    println!("     Mean: {}", smart_round(mc.mean, p));
    println!("     Std Dev: {}", smart_round(mc.std_dev, p));
    println!(
        "     Range: {} to {}",
        smart_round(mc.min, p),
        smart_round(mc.max, p)
    );

    let cap = &result.capability;
    match (cap.cp, cap.cpk) {
        (Some(cp), Some(cpk)) => println!("     Capability: Cp={:.2}, Cpk={:.2}", cp, cpk),
        (None, Some(cpk)) => println!("     Capability: Cpk={:.2}", cpk),
        _ => {}
    }
    if let Some(rating) = cap.rating {
        let styled = match rating {
            CapabilityRating::Capable => style(rating.to_string()).green(),
            CapabilityRating::Marginal => style(rating.to_string()).yellow(),
            CapabilityRating::NotCapable => style(rating.to_string()).red(),
        };
        println!("     Rating: {}", styled);
    }
    println!("     Yield: {:.2}%", mc.yield_percent);
    if stackup.has_spec() {
        println!("     Interference: {:.2}%", cap.interference_percent);
    }

    if args.histogram {
        println!();
        print_histogram(mc, limits);
    }
}

/// Bin index holding `value`, when it lies inside the histogram range
fn marker_bin(histogram: &[HistogramBin], min: f64, max: f64, value: f64) -> Option<usize> {
    if histogram.is_empty() || value < min || value > max {
        return None;
    }
    let width = (max - min) / histogram.len() as f64;
    if width <= 0.0 {
        return Some(0);
    }
    Some((((value - min) / width).floor() as usize).min(histogram.len() - 1))
}

/// Print an ASCII histogram of the Monte Carlo distribution
fn print_histogram(mc: &MonteCarloResult, limits: SpecLimits) {
    let histogram = &mc.histogram;
    if histogram.is_empty() {
        return;
    }

    let max_count = histogram.iter().map(|b| b.count).max().unwrap_or(1).max(1);
    let total: usize = histogram.iter().map(|b| b.count).sum();
    let bar_max_width = 50;

    println!(
        "   {} ({} samples, {} bins):",
        style("Distribution Histogram").bold(),
        total,
        histogram.len()
    );
    println!();

    let lsl_bin = limits
        .lower
        .and_then(|lsl| marker_bin(histogram, mc.min, mc.max, lsl));
    let usl_bin = limits
        .upper
        .and_then(|usl| marker_bin(histogram, mc.min, mc.max, usl));

    for (i, b) in histogram.iter().enumerate() {
        let bar_width = (b.count as f64 / max_count as f64 * bar_max_width as f64) as usize;
        let in_spec = limits.accepts(b.bin);

        let bar_str = if in_spec {
            "█".repeat(bar_width)
        } else {
            "░".repeat(bar_width)
        };

        let marker = match (Some(i) == lsl_bin, Some(i) == usl_bin) {
            (true, true) => " ◄LSL/USL",
            (true, false) => " ◄LSL",
            (false, true) => " ◄USL",
            (false, false) => "",
        };

        let colored_bar = if in_spec {
            style(bar_str).green()
        } else {
            style(bar_str).red()
        };

        println!(
            "   {:>8.3} │{:<width$}│ {:>5}{}",
            b.bin,
            colored_bar,
            b.count,
            style(marker).cyan(),
            width = bar_max_width
        );
    }

    println!("   {:>8} └{}┘", "", "─".repeat(bar_max_width));
    let legend_limits = match (limits.lower, limits.upper) {
        (None, None) => "no spec limits".to_string(),
        (lower, upper) => format!(
            "LSL={}  USL={}",
            lower.map_or("none".to_string(), |v| format!("{:.3}", v)),
            upper.map_or("none".to_string(), |v| format!("{:.3}", v))
        ),
    };
    println!(
        "   {} {}  (█ in-spec, ░ out-of-spec)",
        style("Legend:").dim(),
        legend_limits
    );
}
