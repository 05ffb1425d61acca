use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegressionError {
    #[error("Regression window of {got} rows is too small; at least {min} rows are needed")]
    InvalidWindow { min: usize, got: usize },
}

/// Numerical failures of a single least-squares solve.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
    #[error("design matrix is rank deficient")]
    RankDeficient,

    #[error("singular value decomposition did not converge")]
    NonConvergent,

    #[error("solution contains non-finite coefficients")]
    NonFinite,

    #[error("response has {rows} rows but the design matrix has {expected}")]
    DimensionMismatch { expected: usize, rows: usize },
}
