//! # Bullion Rolling Regression
//!
//! Fits gold returns on India CPI, DXY, the US 10-year yield and gold search
//! interest over a trailing window of rows, one ordinary least squares solve
//! per window end-date.
//!
//! Windows that cannot be fitted are never an error: they come back as
//! `WindowOutcome::Skipped` with a reason, and `rolling_betas` simply omits
//! them.

pub mod engine;
pub mod error;
pub mod ols;

pub use engine::{PARAMETERS, RollingRegression, rolling_betas};
pub use error::{FitError, RegressionError};
pub use ols::{OlsFit, fit};
