pub mod core;
pub mod messages;

// Re-export key components
pub use core::Scanner;
pub use messages::{DivergenceRequest, LevelScan, LevelsRequest, UnitResult};
