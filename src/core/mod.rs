//! Core module - the stackup analyzer and tool configuration

pub mod analysis;
pub mod config;

pub use analysis::{
    analyze, analyze_chain, AnalysisError, AnalysisOptions, SimulationResult, SpecLimits,
};
pub use config::Config;
