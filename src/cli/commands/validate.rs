//! `tolstack validate` command - check stackup files

use console::style;
use miette::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::GlobalOpts;
use crate::entities::stackup::StackupConfig;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Stackup files, or directories to search for .yaml/.yml/.json files
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Continue validation after first error
    #[arg(long)]
    pub keep_going: bool,

    /// Show summary only, don't show individual results
    #[arg(long)]
    pub summary: bool,
}

#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let files = expand_paths(&args.paths);
    if files.is_empty() {
        return Err(miette::miette!("No stackup files found"));
    }

    let show_details = !args.summary && !global.quiet;
    let mut stats = ValidationStats::default();

    if show_details {
        println!(
            "{} Validating {} file(s)...\n",
            style("→").blue(),
            files.len()
        );
    }

    for path in &files {
        stats.files_checked += 1;

        match check_file(path) {
            Ok(count) => {
                stats.files_passed += 1;
                if show_details {
                    println!(
                        "{} {} ({} dimension(s))",
                        style("✓").green(),
                        path.display(),
                        count
                    );
                }
            }
            Err(message) => {
                stats.files_failed += 1;
                tracing::debug!(path = %path.display(), error = %message, "validation failed");
                if show_details {
                    println!("{} {} - {}", style("✗").red(), path.display(), message);
                }
                if !args.keep_going {
                    break;
                }
            }
        }
    }

    if !global.quiet {
        println!();
        println!("{}", style("─".repeat(60)).dim());
        println!("{}", style("Validation Summary").bold());
        println!("{}", style("─".repeat(60)).dim());
        println!("  Files checked:  {}", style(stats.files_checked).cyan());
        println!("  Files passed:   {}", style(stats.files_passed).green());
        println!("  Files failed:   {}", style(stats.files_failed).red());
        println!();
    }

    match stats.files_failed {
        0 => {
            if !global.quiet {
                println!("{} All files passed validation!", style("✓").green().bold());
            }
            Ok(())
        }
        1 => Err(miette::miette!("Validation failed: 1 file has errors")),
        n => Err(miette::miette!("Validation failed: {} files have errors", n)),
    }
}

/// Load and check one file, returning its dimension count
fn check_file(path: &Path) -> std::result::Result<usize, String> {
    let stackup = StackupConfig::load(path).map_err(|e| e.to_string())?;
    stackup.validate().map_err(|e| e.to_string())?;
    Ok(stackup.dimension_count())
}

fn is_stackup_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml" | "json")
    )
}

/// Expand paths - if a directory is given, find all stackup files in it
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| {
                    // Skip hidden directories such as .tolstack
                    let name = e.file_name().to_string_lossy();
                    !name.starts_with('.') || e.depth() == 0
                })
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                if is_stackup_file(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            // Missing files are reported by check_file
            files.push(path.clone());
        }
    }

    files.sort();
    files
}
