//! Entity type definitions

pub mod dimension;
pub mod process;
pub mod stackup;

pub use dimension::{Dimension, DimensionType, Distribution, Sign};
pub use process::{find_process, ProcessCapability, IT_GRADES, MANUFACTURING_PROCESSES};
pub use stackup::{FileFormat, StackupConfig, StackupFileError};
