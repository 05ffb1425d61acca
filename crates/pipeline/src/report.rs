use analytics::CorrelationMatrix;
use chrono::NaiveDate;
use core_types::{RegressionPoint, SkipReason, TimeSeriesRow};
use dataset::MergeReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Columns that feed the correlation heatmap, in display order.
pub const CORRELATION_COLUMNS: [&str; 7] = [
    "gold_returns",
    "silver_returns",
    "india_cpi",
    "dxy",
    "us10y_yield",
    "googletrends_gold",
    "googletrends_silver",
];

/// Everything one analysis run produces.
///
/// This struct is the output of `Pipeline::run` and the data transfer object
/// served to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub rows: Vec<TimeSeriesRow>,
    pub betas: Vec<RegressionPoint>,
    pub skipped_windows: BTreeMap<SkipReason, usize>,
    pub correlations: CorrelationMatrix,
    pub merge: MergeReport,
    pub summary: Summary,
}

/// Headline figures for the terminal table and the `/api/summary` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub regression_points: usize,
    pub skipped_windows: usize,
    pub latest_gold_close: Option<f64>,
    pub latest_gold_silver_ratio: Option<f64>,
    pub latest_gold_volatility: Option<f64>,
    pub latest_gold_to_dxy_corr: Option<f64>,
    pub latest_betas: Option<RegressionPoint>,
}

impl Summary {
    pub fn new(rows: &[TimeSeriesRow], betas: &[RegressionPoint], skipped_windows: usize) -> Self {
        // Latest non-null value of a column, scanning back from the end.
        let latest = |f: fn(&TimeSeriesRow) -> Option<f64>| rows.iter().rev().find_map(f);

        Self {
            rows: rows.len(),
            first_date: rows.first().map(|r| r.date),
            last_date: rows.last().map(|r| r.date),
            regression_points: betas.len(),
            skipped_windows,
            latest_gold_close: latest(|r| r.gold_close),
            latest_gold_silver_ratio: latest(|r| r.gold_silver_ratio),
            latest_gold_volatility: latest(|r| r.gold_volatility),
            latest_gold_to_dxy_corr: latest(|r| r.gold_to_dxy_corr),
            latest_betas: betas.last().cloned(),
        }
    }
}

/// Builds the pairwise correlation matrix over the heatmap columns.
pub fn correlation_matrix(rows: &[TimeSeriesRow]) -> CorrelationMatrix {
    let extract = |f: fn(&TimeSeriesRow) -> Option<f64>| rows.iter().map(f).collect::<Vec<_>>();
    let columns: [Vec<Option<f64>>; 7] = [
        extract(|r| r.gold_returns),
        extract(|r| r.silver_returns),
        extract(|r| r.india_cpi),
        extract(|r| r.dxy),
        extract(|r| r.us10y_yield),
        extract(|r| r.googletrends_gold),
        extract(|r| r.googletrends_silver),
    ];

    let named: Vec<(&str, &[Option<f64>])> = CORRELATION_COLUMNS
        .iter()
        .zip(&columns)
        .map(|(name, values)| (*name, values.as_slice()))
        .collect();
    CorrelationMatrix::from_columns(&named)
}
