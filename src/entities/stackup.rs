//! Stackup entity - an ordered dimension chain plus optional spec limits
//!
//! This is the persisted form of an analysis. It is stored as YAML by default;
//! JSON files (including exports from older tools using camelCase keys) are
//! read and written when the file extension is `.json`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use ulid::Ulid;

use crate::core::analysis::AnalysisError;
use crate::entities::dimension::Dimension;

/// Errors that can occur while reading or writing stackup files
#[derive(Debug, Error)]
pub enum StackupFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stackup file already exists: {0}")]
    AlreadyExists(String),
}

/// On-disk format of a stackup file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Pick a format from the file extension (anything but `.json` is YAML)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
            _ => FileFormat::Yaml,
        }
    }
}

/// Stackup definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackupConfig {
    /// Identifier
    pub id: String,

    /// Analysis name
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Design target for the closing gap (informational)
    #[serde(default, alias = "targetGapNominal")]
    pub target_gap_nominal: f64,

    /// Upper specification limit; `None` means no limit on that side
    #[serde(default, alias = "upperSpecLimit")]
    pub upper_spec_limit: Option<f64>,

    /// Lower specification limit; `None` means no limit on that side
    #[serde(default, alias = "lowerSpecLimit")]
    pub lower_spec_limit: Option<f64>,

    /// Ordered dimension chain
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

impl Default for StackupConfig {
    fn default() -> Self {
        Self {
            id: format!("TOL-{}", Ulid::new()),
            name: "New Stackup Analysis".to_string(),
            description: String::new(),
            target_gap_nominal: 0.0,
            upper_spec_limit: None,
            lower_spec_limit: None,
            dimensions: Vec::new(),
        }
    }
}

impl StackupConfig {
    /// Create an empty stackup
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set both spec limits, upper first
    pub fn with_limits(mut self, upper: Option<f64>, lower: Option<f64>) -> Self {
        self.upper_spec_limit = upper;
        self.lower_spec_limit = lower;
        self
    }

    /// Append a dimension to the chain
    pub fn add_dimension(&mut self, dimension: Dimension) {
        self.dimensions.push(dimension);
    }

    /// Remove a dimension by ID, returning it if found
    pub fn remove_dimension(&mut self, id: &str) -> Option<Dimension> {
        let idx = self.dimensions.iter().position(|d| d.id == id)?;
        Some(self.dimensions.remove(idx))
    }

    /// Number of dimensions in the chain
    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    /// True when at least one spec limit is defined
    pub fn has_spec(&self) -> bool {
        self.upper_spec_limit.is_some() || self.lower_spec_limit.is_some()
    }

    /// Check every dimension and the spec limits
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.dimensions.is_empty() {
            return Err(AnalysisError::EmptyChain);
        }
        for dim in &self.dimensions {
            dim.validate()?;
        }
        crate::core::analysis::validate_limits(self.upper_spec_limit, self.lower_spec_limit)
    }

    /// Parse a stackup from text in the given format
    pub fn from_str_with(content: &str, format: FileFormat) -> Result<Self, StackupFileError> {
        let stackup = match format {
            FileFormat::Yaml => serde_yml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        };
        Ok(stackup)
    }

    /// Serialize to text in the given format
    pub fn to_string_with(&self, format: FileFormat) -> Result<String, StackupFileError> {
        let content = match format {
            FileFormat::Yaml => serde_yml::to_string(self)?,
            FileFormat::Json => serde_json::to_string_pretty(self)?,
        };
        Ok(content)
    }

    /// Load a stackup file (format chosen by extension)
    pub fn load(path: &Path) -> Result<Self, StackupFileError> {
        let content = fs::read_to_string(path)?;
        let stackup = Self::from_str_with(&content, FileFormat::from_path(path))?;
        tracing::debug!(
            path = %path.display(),
            dimensions = stackup.dimensions.len(),
            "loaded stackup"
        );
        Ok(stackup)
    }

    /// Write the stackup, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<(), StackupFileError> {
        let content = self.to_string_with(FileFormat::from_path(path))?;
        fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "saved stackup");
        Ok(())
    }

    /// Write the stackup, failing if the file already exists
    pub fn save_new(&self, path: &Path) -> Result<(), StackupFileError> {
        if path.exists() {
            return Err(StackupFileError::AlreadyExists(path.display().to_string()));
        }
        self.save(path)
    }
}
