use crate::error::PipelineError;
use crate::report::{AnalysisReport, Summary, correlation_matrix};
use configuration::{AnalysisConfig, MergeParams, RegressionParams};
use core_types::{MacroRow, PriceRow, WindowOutcome};
use dataset::DatasetMerger;
use regression::RollingRegression;
use serde::Serialize;
use std::collections::BTreeMap;

/// The parameters that influence an analysis result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AnalysisParams {
    pub merge: MergeParams,
    pub regression: RegressionParams,
}

impl From<&AnalysisConfig> for AnalysisParams {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            merge: config.merge,
            regression: config.regression,
        }
    }
}

/// Runs the merge, the rolling regression and the correlation matrix in one pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline;

impl Pipeline {
    /// Computes a full report. The result depends only on the arguments.
    pub fn run(
        prices: &[PriceRow],
        macros: &[MacroRow],
        params: &AnalysisParams,
    ) -> Result<AnalysisReport, PipelineError> {
        let engine = RollingRegression::new(params.regression)?;
        let merged = DatasetMerger::new(params.merge).merge(prices, macros)?;
        let rows = merged.rows;

        let mut betas = Vec::new();
        let mut skipped_windows = BTreeMap::new();
        for outcome in engine.evaluate_windows(&rows) {
            match outcome {
                WindowOutcome::Fitted(point) => betas.push(point),
                WindowOutcome::Skipped { reason, .. } => *skipped_windows.entry(reason).or_insert(0) += 1,
            }
        }

        let correlations = correlation_matrix(&rows);
        let summary = Summary::new(&rows, &betas, skipped_windows.values().sum());

        tracing::info!(
            rows = summary.rows,
            points = summary.regression_points,
            skipped = summary.skipped_windows,
            "Analysis complete."
        );

        Ok(AnalysisReport {
            rows,
            betas,
            skipped_windows,
            correlations,
            merge: merged.report,
            summary,
        })
    }
}
