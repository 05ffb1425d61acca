pub mod enums;
pub mod error;
pub mod rows;

// Re-export the core types to provide a clean public API.
pub use enums::{Predictor, SkipReason};
pub use error::CoreError;
pub use rows::{MacroRow, PriceRow, RegressionPoint, TimeSeriesRow, WindowOutcome};
