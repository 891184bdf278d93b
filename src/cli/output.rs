//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Serialize `value` for a machine-readable format
///
/// Returns `None` for [`OutputFormat::Text`]; the caller renders text itself.
pub fn structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<Option<String>> {
    let rendered = match format {
        OutputFormat::Text => return Ok(None),
        OutputFormat::Json => serde_json::to_string_pretty(value).into_diagnostic()?,
        OutputFormat::Yaml => serde_yml::to_string(value).into_diagnostic()?,
    };
    Ok(Some(rendered))
}

/// Print `value` in a machine-readable format, returning `false` for text
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match structured(value, format)? {
        Some(out) => {
            println!("{}", out.trim_end());
            Ok(true)
        }
        None => Ok(false),
    }
}
