use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Rolling window must be at least {min} rows, got {got}")]
    InvalidWindow { min: usize, got: usize },

    #[error("Series lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}
