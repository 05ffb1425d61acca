use crate::error::FitError;
use nalgebra::{DMatrix, DVector};

/// Relative singular-value cutoff for the rank test.
pub const RANK_RTOL: f64 = 1e-10;

/// The result of one ordinary least squares solve.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// One coefficient per design-matrix column, in column order.
    pub coefficients: DVector<f64>,
    /// `None` when the response has zero variance.
    pub r_squared: Option<f64>,
}

/// Solves `min ||y - X b||²` through the singular value decomposition.
///
/// Singular values below `RANK_RTOL` times the largest one count as zero. A
/// design matrix without full column rank is reported as `RankDeficient`
/// rather than resolved with a minimum-norm solution.
pub fn fit(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<OlsFit, FitError> {
    let (n, p) = x.shape();
    if y.len() != n {
        return Err(FitError::DimensionMismatch { expected: n, rows: y.len() });
    }
    if n < p {
        return Err(FitError::RankDeficient);
    }

    let svd = x
        .clone()
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or(FitError::NonConvergent)?;

    let max_sv = svd.singular_values.iter().copied().fold(0.0, f64::max);
    let tolerance = max_sv * RANK_RTOL;
    if svd.rank(tolerance) < p {
        return Err(FitError::RankDeficient);
    }

    let coefficients = svd.solve(y, tolerance).map_err(|_| FitError::NonConvergent)?;
    if coefficients.iter().any(|b| !b.is_finite()) {
        return Err(FitError::NonFinite);
    }

    let residuals = y - x * &coefficients;
    let ss_res = residuals.norm_squared();
    let mean = y.mean();
    let ss_tot: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    let r_squared = (ss_tot > 0.0).then(|| 1.0 - ss_res / ss_tot);

    Ok(OlsFit { coefficients, r_squared })
}
