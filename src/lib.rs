// Library exports shared by the converter and range binaries
pub mod cli;
pub mod conversion;
pub mod range;
pub mod utils;

// Re-export commonly used types
pub use cli::{Args, OutputFormat, TargetArg};
pub use conversion::batch::{BatchSummary, RunSummary};
pub use conversion::{ConversionConfig, ConversionEngine, TargetType, TargetTypeSet};
