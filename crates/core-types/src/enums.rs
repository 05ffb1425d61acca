use serde::{Deserialize, Serialize};
use std::fmt;

/// The macro drivers that gold returns are regressed on.
///
/// The order of `Predictor::ALL` is the column order of the design matrix
/// (after the intercept column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predictor {
    IndiaCpi,
    Dxy,
    Us10yYield,
    GoogleTrendsGold,
}

impl Predictor {
    pub const ALL: [Predictor; 4] = [
        Predictor::IndiaCpi,
        Predictor::Dxy,
        Predictor::Us10yYield,
        Predictor::GoogleTrendsGold,
    ];

    /// The source column header this predictor is read from.
    pub fn column(&self) -> &'static str {
        match self {
            Predictor::IndiaCpi => "India_CPI",
            Predictor::Dxy => "DXY",
            Predictor::Us10yYield => "US10Y_Yield",
            Predictor::GoogleTrendsGold => "GoogleTrends_Gold",
        }
    }

    /// The name of the coefficient this predictor produces.
    pub fn beta_name(&self) -> &'static str {
        match self {
            Predictor::IndiaCpi => "inflation_beta",
            Predictor::Dxy => "dxy_beta",
            Predictor::Us10yYield => "yield_beta",
            Predictor::GoogleTrendsGold => "sentiment_beta",
        }
    }

    /// Looks up a predictor by its coefficient name, e.g. `dxy_beta`.
    pub fn from_beta_name(name: &str) -> Option<Predictor> {
        Predictor::ALL.into_iter().find(|p| p.beta_name() == name)
    }
}

impl fmt::Display for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Why a regression window produced no point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A response or predictor value in the window was null or non-finite.
    NullValue,
    /// The design matrix does not have full column rank.
    RankDeficient,
    /// The decomposition failed to converge.
    NonConvergent,
    /// The solver returned NaN or infinite coefficients.
    NonFinite,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::NullValue => "null value in window",
            SkipReason::RankDeficient => "rank-deficient design matrix",
            SkipReason::NonConvergent => "decomposition did not converge",
            SkipReason::NonFinite => "non-finite coefficients",
        };
        f.write_str(s)
    }
}
