//! # Bullion Rolling Statistics
//!
//! Position-based rolling statistics over nullable `f64` series, plus the full
//! pairwise correlation matrix used for the macro heatmap.
//!
//! ## Architectural Principles
//!
//! - **Layer 0 Logic:** This is a pure logic crate with no knowledge of rows,
//!   files or dates. It operates on `&[Option<f64>]` columns.
//! - **Null Propagation:** A rolling value is `None` whenever its window is not
//!   yet full or contains a null. Nothing is interpolated.
//!
//! ## Public API
//!
//! - `SlidingWindow`: fixed-capacity trailing window with O(1) push/evict.
//! - `rolling_std`, `rolling_corr`: trailing sample std-dev and Pearson correlation.
//! - `CorrelationMatrix`: pairwise-complete correlation matrix.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod correlation;
pub mod error;
pub mod rolling;
pub mod stats;
pub mod window;

// Re-export the key components to create a clean, public-facing API.
pub use correlation::CorrelationMatrix;
pub use error::AnalyticsError;
pub use rolling::{rolling_corr, rolling_std, scale};
pub use window::SlidingWindow;
