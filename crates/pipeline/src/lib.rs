//! # Bullion Pipeline
//!
//! Ties the dataset and regression crates together into one analysis run and
//! memoizes the results.
//!
//! ## Architectural Principles
//!
//! - **Pure core**: `Pipeline::run` has no side effects beyond logging; the
//!   same inputs and parameters always produce the same `AnalysisReport`.
//! - **Explicit memoization**: `AnalysisCache` is an ordinary value owned by
//!   its caller, keyed by a SHA-256 digest of the request.
//!
//! ## Public API
//!
//! - `Pipeline`, `AnalysisParams`: run one analysis.
//! - `AnalysisReport`, `Summary`: the results.
//! - `AnalysisCache`, `CacheKey`, `CacheStats`: bounded result cache.
//! - `load_inputs`: read both CSV exports from disk.

pub mod cache;
pub mod error;
pub mod pipeline;
pub mod report;

pub use cache::{AnalysisCache, CacheKey, CacheStats};
pub use error::PipelineError;
pub use pipeline::{AnalysisParams, Pipeline};
pub use report::{AnalysisReport, CORRELATION_COLUMNS, Summary, correlation_matrix};

use core_types::{MacroRow, PriceRow};
use std::path::Path;

/// Reads the price and macro exports.
pub fn load_inputs(prices: &Path, macros: &Path) -> Result<(Vec<PriceRow>, Vec<MacroRow>), PipelineError> {
    let price_rows = dataset::load_price_rows(prices)?;
    let macro_rows = dataset::load_macro_rows(macros)?;
    Ok((price_rows, macro_rows))
}
