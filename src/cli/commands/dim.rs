//! `tolstack dim` command - manage the dimension chain of a stackup

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;
use std::path::{Path, PathBuf};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::helpers::{smart_round, truncate_str};
use crate::cli::output::print_structured;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::dimension::{Dimension, DimensionType, Distribution, Sign};
use crate::entities::process::{find_process, MANUFACTURING_PROCESSES};
use crate::entities::stackup::StackupConfig;

#[derive(Subcommand, Debug)]
pub enum DimCommands {
    /// Append a dimension to the chain
    Add(AddArgs),

    /// List the dimensions of a stackup
    List(ListArgs),

    /// Remove a dimension by ID or 1-based position
    #[command(name = "rm")]
    Remove(RemoveArgs),
}

/// Distribution choices on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DistArg {
    Normal,
    Uniform,
    Trapezoidal,
    Bernoulli,
}

impl From<DistArg> for Distribution {
    fn from(arg: DistArg) -> Self {
        match arg {
            DistArg::Normal => Distribution::Normal,
            DistArg::Uniform => Distribution::Uniform,
            DistArg::Trapezoidal => Distribution::Trapezoidal,
            DistArg::Bernoulli => Distribution::Bernoulli,
        }
    }
}

/// Dimension type choices on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
    Linear,
    Hole,
    Shaft,
    Radial,
}

impl From<TypeArg> for DimensionType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Linear => DimensionType::Linear,
            TypeArg::Hole => DimensionType::Hole,
            TypeArg::Shaft => DimensionType::Shaft,
            TypeArg::Radial => DimensionType::Radial,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Stackup file
    pub file: PathBuf,

    /// Dimension name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Nominal value
    #[arg(long, allow_negative_numbers = true)]
    pub nominal: f64,

    /// Plus tolerance (default: 0, or the process tolerance)
    #[arg(long, allow_negative_numbers = true)]
    pub plus: Option<f64>,

    /// Minus tolerance as a positive magnitude (default: 0, or the process tolerance)
    #[arg(long, allow_negative_numbers = true)]
    pub minus: Option<f64>,

    /// Subtract this dimension from the chain
    #[arg(long)]
    pub negative: bool,

    /// Monte Carlo distribution
    #[arg(long, value_enum, default_value_t = DistArg::Normal)]
    pub dist: DistArg,

    /// Process capability index (default: configured default_cpk)
    #[arg(long)]
    pub cpk: Option<f64>,

    /// Dimension type tag
    #[arg(long = "type", value_enum, default_value_t = TypeArg::Linear)]
    pub dim_type: TypeArg,

    /// Fill tolerances and cpk from a process (see `tolstack processes`)
    #[arg(long, short = 'p')]
    pub process: Option<String>,

    /// Explicit dimension ID (default: generated DIM-<ULID>)
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Stackup file
    pub file: PathBuf,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Stackup file
    pub file: PathBuf,

    /// Dimension ID or 1-based position in the chain
    pub dimension: String,
}

/// Run a dim subcommand
pub fn run(cmd: DimCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DimCommands::Add(args) => run_add(args, global),
        DimCommands::List(args) => run_list(args),
        DimCommands::Remove(args) => run_remove(args, global),
    }
}

fn load(path: &Path) -> Result<StackupConfig> {
    StackupConfig::load(path)
        .map_err(|e| miette::miette!("Failed to load {}: {}", path.display(), e))
}

/// Build the dimension described by `args`
fn build_dimension(args: &AddArgs) -> Result<Dimension> {
    let mut dim = Dimension::new(&args.name, args.nominal, 0.0, 0.0)
        .with_distribution(args.dist.into())
        .with_type(args.dim_type.into());

    if let Some(ref name) = args.process {
        let process = find_process(name).ok_or_else(|| {
            let known: Vec<&str> = MANUFACTURING_PROCESSES.iter().map(|p| p.process).collect();
            miette::miette!(
                "Unknown process '{}'. Known processes: {}",
                name,
                known.join(", ")
            )
        })?;
        dim.apply_process(process);
        // The process fixes the distribution; an explicit --dist still wins
        if args.dist != DistArg::Normal {
            dim.distribution = args.dist.into();
        }
    }

    if let Some(plus) = args.plus {
        dim.tol_plus = plus;
    }
    if let Some(minus) = args.minus {
        dim.tol_minus = minus;
    }
    if let Some(cpk) = args.cpk {
        dim.cpk = Some(cpk);
    }
    if args.negative {
        dim.sign = Sign::Negative;
    }
    if let Some(ref id) = args.id {
        dim.id = id.clone();
    }

    dim.validate().map_err(|e| miette::miette!("{}", e))?;
    Ok(dim)
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut stackup = load(&args.file)?;
    let dim = build_dimension(&args)?;

    if stackup.dimensions.iter().any(|d| d.id == dim.id) {
        return Err(miette::miette!(
            "Stackup already has a dimension with ID '{}'",
            dim.id
        ));
    }

    let id = dim.id.clone();
    let name = dim.name.clone();
    stackup.add_dimension(dim);
    stackup
        .save(&args.file)
        .map_err(|e| miette::miette!("{}", e))?;

    tracing::info!(path = %args.file.display(), id = %id, "added dimension");

    if !global.quiet {
        println!(
            "{} Added dimension {} ({}) - chain now has {} dimension(s)",
            style("✓").green(),
            style(&name).cyan(),
            style(&id).dim(),
            stackup.dimension_count()
        );
    }
    Ok(())
}

#[derive(Tabled)]
struct DimensionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "SIGN")]
    sign: String,
    #[tabled(rename = "NOMINAL")]
    nominal: String,
    #[tabled(rename = "+TOL")]
    plus: String,
    #[tabled(rename = "-TOL")]
    minus: String,
    #[tabled(rename = "DIST")]
    distribution: String,
    #[tabled(rename = "CPK")]
    cpk: String,
}

fn run_list(args: ListArgs) -> Result<()> {
    let stackup = load(&args.file)?;

    if print_structured(&stackup.dimensions, args.format)? {
        return Ok(());
    }

    if stackup.dimensions.is_empty() {
        println!("No dimensions in {}", style(&stackup.name).cyan());
        return Ok(());
    }

    let ref_precision = stackup
        .dimensions
        .iter()
        .map(|d| d.tolerance_band())
        .filter(|b| *b > 0.0)
        .fold(f64::INFINITY, f64::min);
    let ref_precision = if ref_precision.is_finite() { ref_precision } else { 0.01 };

    let rows: Vec<DimensionRow> = stackup
        .dimensions
        .iter()
        .enumerate()
        .map(|(i, d)| DimensionRow {
            index: i + 1,
            id: truncate_str(&d.id, 16),
            name: truncate_str(&d.name, 30),
            sign: d.sign.to_string(),
            nominal: smart_round(d.nominal, ref_precision),
            plus: smart_round(d.tol_plus, ref_precision),
            minus: smart_round(d.tol_minus, ref_precision),
            distribution: d.distribution.to_string(),
            cpk: d.cpk.map_or_else(|| "default".to_string(), |c| format!("{:.2}", c)),
        })
        .collect();

    println!(
        "{} ({} dimension(s))",
        style(&stackup.name).bold(),
        stackup.dimension_count()
    );
    println!("{}", Table::new(rows).with(Style::rounded()));
    Ok(())
}

/// Resolve a dimension reference to an index: exact ID first, then position
fn resolve_index(stackup: &StackupConfig, reference: &str) -> Option<usize> {
    if let Some(idx) = stackup.dimensions.iter().position(|d| d.id == reference) {
        return Some(idx);
    }
    match reference.parse::<usize>() {
        Ok(n) if n >= 1 && n <= stackup.dimensions.len() => Some(n - 1),
        _ => None,
    }
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut stackup = load(&args.file)?;

    let idx = resolve_index(&stackup, &args.dimension).ok_or_else(|| {
        miette::miette!(
            "No dimension matching '{}' (use an ID or a position from 1 to {})",
            args.dimension,
            stackup.dimension_count()
        )
    })?;

    let removed = stackup.dimensions.remove(idx);
    stackup
        .save(&args.file)
        .map_err(|e| miette::miette!("{}", e))?;

    tracing::info!(path = %args.file.display(), id = %removed.id, "removed dimension");

    if !global.quiet {
        println!(
            "{} Removed dimension {} ({})",
            style("✓").green(),
            style(&removed.name).cyan(),
            style(&removed.id).dim()
        );
    }
    Ok(())
}
