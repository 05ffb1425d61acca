use crate::enums::{Predictor, SkipReason};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the precious-metal price export, exactly as read.
///
/// Cells are kept as raw text; parsing and coercion happen during the merge so
/// that a bad cell can degrade to null instead of failing the load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: String,
    pub gold_price: String,
    pub silver_price: String,
    pub gold_returns: String,
    pub silver_returns: String,
}

/// One row of the macroeconomic indicator export, exactly as read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacroRow {
    pub date: String,
    pub india_cpi: String,
    pub dxy: String,
    pub us10y_yield: String,
    pub googletrends_gold: String,
    /// Optional in the source; empty when the column is absent.
    pub googletrends_silver: String,
}

/// One merged, typed row of the joined price and macro series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub date: NaiveDate,

    // Prices and returns
    pub gold_close: Option<f64>,
    pub silver_close: Option<f64>,
    pub gold_returns: Option<f64>,
    pub silver_returns: Option<f64>,

    // Macro and sentiment indicators
    pub dxy: Option<f64>,
    pub us10y_yield: Option<f64>,
    pub india_cpi: Option<f64>,
    pub googletrends_gold: Option<f64>,
    pub googletrends_silver: Option<f64>,

    // Derived columns, filled in once after the join
    pub gold_volatility: Option<f64>,
    pub silver_volatility: Option<f64>,
    pub gold_to_dxy_corr: Option<f64>,
    pub gold_to_yield_corr: Option<f64>,
    pub gold_silver_ratio: Option<f64>,
}

impl TimeSeriesRow {
    /// Creates a row for `date` with every value null.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }

    /// Returns the value of a regression predictor column.
    pub fn predictor(&self, predictor: Predictor) -> Option<f64> {
        match predictor {
            Predictor::IndiaCpi => self.india_cpi,
            Predictor::Dxy => self.dxy,
            Predictor::Us10yYield => self.us10y_yield,
            Predictor::GoogleTrendsGold => self.googletrends_gold,
        }
    }

    /// True when the response and every predictor are present.
    pub fn has_regression_inputs(&self) -> bool {
        self.gold_returns.is_some() && Predictor::ALL.iter().all(|p| self.predictor(*p).is_some())
    }
}

/// The fitted coefficients of one rolling regression window.
///
/// `date` is the date of the row immediately after the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionPoint {
    pub date: NaiveDate,
    pub inflation_beta: Option<f64>,
    pub dxy_beta: Option<f64>,
    pub yield_beta: Option<f64>,
    pub sentiment_beta: Option<f64>,
    pub intercept: Option<f64>,
    pub r_squared: Option<f64>,
    pub observations: usize,
}

impl RegressionPoint {
    pub fn beta(&self, predictor: Predictor) -> Option<f64> {
        match predictor {
            Predictor::IndiaCpi => self.inflation_beta,
            Predictor::Dxy => self.dxy_beta,
            Predictor::Us10yYield => self.yield_beta,
            Predictor::GoogleTrendsGold => self.sentiment_beta,
        }
    }
}

/// The result of evaluating one window end-index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WindowOutcome {
    Fitted(RegressionPoint),
    Skipped {
        index: usize,
        date: NaiveDate,
        reason: SkipReason,
    },
}

impl WindowOutcome {
    pub fn point(&self) -> Option<&RegressionPoint> {
        match self {
            WindowOutcome::Fitted(point) => Some(point),
            WindowOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, WindowOutcome::Skipped { .. })
    }
}
