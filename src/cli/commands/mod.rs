//! CLI command implementations

pub mod analyze;
pub mod completions;
pub mod dim;
pub mod limits;
pub mod new;
pub mod processes;
pub mod validate;
