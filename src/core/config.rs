//! Layered tool configuration
//!
//! Layers, lowest precedence first: built-in defaults, the user config file
//! (`<config dir>/tolstack/config.yaml`), the nearest project config
//! (`.tolstack/config.yaml` in the working directory or a parent), then
//! `TOLSTACK_*` environment variables. Command-line flags override all of
//! these at the call site.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::analysis::{
    AnalysisOptions, Execution, MonteCarloSettings, DEFAULT_BINS, DEFAULT_ITERATIONS,
};
use crate::entities::dimension::DEFAULT_CPK;

/// Directory holding project configuration
pub const PROJECT_CONFIG_DIR: &str = ".tolstack";

/// Config file name inside config directories
pub const CONFIG_FILE: &str = "config.yaml";

/// One configuration layer; unset keys fall through to lower layers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bins: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_cpk: Option<f64>,

    /// Worker threads for Monte Carlo; 1 runs sequentially
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ConfigLayer {
    /// Overlay `other` on top of this layer
    fn merge(&mut self, other: ConfigLayer) {
        if other.iterations.is_some() {
            self.iterations = other.iterations;
        }
        if other.bins.is_some() {
            self.bins = other.bins;
        }
        if other.default_cpk.is_some() {
            self.default_cpk = other.default_cpk;
        }
        if other.threads.is_some() {
            self.threads = other.threads;
        }
        if other.seed.is_some() {
            self.seed = other.seed;
        }
    }

    /// Drop values that could never produce a valid analysis
    fn sanitized(mut self, source: &str) -> Self {
        if self.iterations == Some(0) {
            tracing::warn!(source, "ignoring iterations = 0");
            self.iterations = None;
        }
        if self.bins == Some(0) {
            tracing::warn!(source, "ignoring bins = 0");
            self.bins = None;
        }
        if self.threads == Some(0) {
            tracing::warn!(source, "ignoring threads = 0");
            self.threads = None;
        }
        if let Some(cpk) = self.default_cpk {
            if !cpk.is_finite() || cpk <= 0.0 {
                tracing::warn!(source, cpk, "ignoring non-positive default_cpk");
                self.default_cpk = None;
            }
        }
        self
    }

    /// Read a layer from a YAML file; a missing or unreadable file is empty
    pub fn from_file(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_yml::from_str::<ConfigLayer>(&content) {
            Ok(layer) => {
                tracing::debug!(path = %path.display(), "loaded config layer");
                layer.sanitized(&path.display().to_string())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping invalid config file");
                Self::default()
            }
        }
    }

    /// Read a layer from `TOLSTACK_*` variables through `lookup`
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parse<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            let raw = lookup(key)?;
            match raw.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(key, value = %raw, "ignoring unparsable environment value");
                    None
                }
            }
        }

        Self {
            iterations: parse(&lookup, "TOLSTACK_ITERATIONS"),
            bins: parse(&lookup, "TOLSTACK_BINS"),
            default_cpk: parse(&lookup, "TOLSTACK_DEFAULT_CPK"),
            threads: parse(&lookup, "TOLSTACK_THREADS"),
            seed: parse(&lookup, "TOLSTACK_SEED"),
        }
        .sanitized("environment")
    }
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    layer: ConfigLayer,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_layers(Vec::new())
    }
}

impl Config {
    /// Load all layers for the current working directory
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut layers = Vec::new();

        if let Some(path) = Self::user_config_path() {
            layers.push(ConfigLayer::from_file(&path));
        }
        if let Some(path) = Self::find_project_config(&cwd) {
            layers.push(ConfigLayer::from_file(&path));
        }
        layers.push(ConfigLayer::from_env_with(|key| std::env::var(key).ok()));

        Self::from_layers(layers)
    }

    /// Build a config from layers in increasing precedence
    pub fn from_layers(layers: impl IntoIterator<Item = ConfigLayer>) -> Self {
        let mut layer = ConfigLayer::default();
        for l in layers {
            layer.merge(l);
        }
        Self { layer }
    }

    /// `<config dir>/tolstack/config.yaml`
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tolstack").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Nearest `.tolstack/config.yaml` at or above `start`
    pub fn find_project_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_CONFIG_DIR).join(CONFIG_FILE))
            .find(|path| path.is_file())
    }

    pub fn iterations(&self) -> usize {
        self.layer.iterations.unwrap_or(DEFAULT_ITERATIONS)
    }

    pub fn bins(&self) -> usize {
        self.layer.bins.unwrap_or(DEFAULT_BINS)
    }

    pub fn default_cpk(&self) -> f64 {
        self.layer.default_cpk.unwrap_or(DEFAULT_CPK)
    }

    pub fn threads(&self) -> usize {
        self.layer.threads.unwrap_or(1)
    }

    pub fn seed(&self) -> Option<u64> {
        self.layer.seed
    }

    /// Analysis options with command-line overrides applied
    pub fn analysis_options(
        &self,
        iterations: Option<usize>,
        bins: Option<usize>,
        threads: Option<usize>,
    ) -> AnalysisOptions {
        let threads = threads.unwrap_or_else(|| self.threads());
        let execution = if threads == 1 {
            Execution::Sequential
        } else {
            Execution::Parallel { threads }
        };

        AnalysisOptions {
            default_cpk: self.default_cpk(),
            monte_carlo: MonteCarloSettings {
                iterations: iterations.unwrap_or_else(|| self.iterations()),
                bins: bins.unwrap_or_else(|| self.bins()),
                execution,
            },
        }
    }
}
