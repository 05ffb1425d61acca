use crate::{error::AppError, AppState};
use analytics::CorrelationMatrix;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use core_types::{Predictor, RegressionPoint, SkipReason, TimeSeriesRow};
use pipeline::{CacheStats, Summary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Optional inclusive date bounds, e.g. `?from=2023-01-01&to=2023-12-31`.
#[derive(Debug, Default, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    fn validate(&self) -> Result<(), AppError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => Err(AppError::BadRequest(format!(
                "`from` ({from}) is after `to` ({to})"
            ))),
            _ => Ok(()),
        }
    }

    fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub loaded: bool,
    pub cache: CacheStats,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: Summary,
    pub skipped_windows: BTreeMap<SkipReason, usize>,
    pub joined_rows: usize,
    pub unmatched_price_dates: usize,
    pub unmatched_macro_dates: usize,
    pub duplicate_dates: usize,
    pub coercion_warnings: usize,
}

/// One coefficient over time.
#[derive(Debug, Serialize)]
pub struct BetaPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// # GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(Health {
        status: "ok",
        loaded: state.is_loaded(),
        cache: state.cache_stats(),
    })
}

/// # GET /api/summary
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Result<Json<SummaryResponse>, AppError> {
    let report = state.current()?;
    Ok(Json(summary_response(&report)))
}

/// # GET /api/series
/// The merged table with derived columns, optionally restricted to a date range.
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<TimeSeriesRow>>, AppError> {
    range.validate()?;
    let report = state.current()?;
    let rows = report.rows.iter().filter(|r| range.contains(r.date)).cloned().collect();
    Ok(Json(rows))
}

/// # GET /api/betas
pub async fn get_betas(
    State(state): State<Arc<AppState>>,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<RegressionPoint>>, AppError> {
    range.validate()?;
    let report = state.current()?;
    let points = report.betas.iter().filter(|p| range.contains(p.date)).cloned().collect();
    Ok(Json(points))
}

/// # GET /api/betas/:beta
/// A single coefficient series such as `dxy_beta`.
pub async fn get_beta_series(
    Path(beta): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<BetaPoint>>, AppError> {
    let predictor = Predictor::from_beta_name(&beta)
        .ok_or_else(|| AppError::NotFound(format!("Unknown coefficient `{beta}`")))?;
    range.validate()?;
    let report = state.current()?;
    let series = report
        .betas
        .iter()
        .filter(|p| range.contains(p.date))
        .map(|p| BetaPoint {
            date: p.date,
            value: p.beta(predictor),
        })
        .collect();
    Ok(Json(series))
}

/// # GET /api/correlations
pub async fn get_correlations(State(state): State<Arc<AppState>>) -> Result<Json<CorrelationMatrix>, AppError> {
    let report = state.current()?;
    Ok(Json(report.correlations.clone()))
}

/// # POST /api/reload
/// Recomputes from the configured files. Runs off the async executor.
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<SummaryResponse>, AppError> {
    let report = tokio::task::spawn_blocking(move || state.reload()).await??;
    Ok(Json(summary_response(&report)))
}

fn summary_response(report: &pipeline::AnalysisReport) -> SummaryResponse {
    SummaryResponse {
        summary: report.summary.clone(),
        skipped_windows: report.skipped_windows.clone(),
        joined_rows: report.merge.joined_rows,
        unmatched_price_dates: report.merge.unmatched_price_dates,
        unmatched_macro_dates: report.merge.unmatched_macro_dates,
        duplicate_dates: report.merge.duplicate_dates,
        coercion_warnings: report.merge.coercion_warnings.len(),
    }
}
