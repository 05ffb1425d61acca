use crate::error::AppError;
use configuration::Config;
use pipeline::{AnalysisCache, AnalysisParams, AnalysisReport, CacheStats, PipelineError};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// The shared application state that all handlers can access.
///
/// Locks are only taken inside synchronous methods, never across an await.
pub struct AppState {
    config: Config,
    cache: Mutex<AnalysisCache>,
    report: RwLock<Option<Arc<AnalysisReport>>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let cache = AnalysisCache::new(config.analysis.cache_capacity);
        Self {
            config,
            cache: Mutex::new(cache),
            report: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The report currently being served.
    pub fn current(&self) -> Result<Arc<AnalysisReport>, AppError> {
        self.report
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| AppError::NotFound("No analysis has been loaded yet".to_string()))
    }

    /// Re-reads the configured exports and swaps in the resulting report.
    ///
    /// Unchanged files hit the cache, so the served `Arc` stays the same.
    pub fn reload(&self) -> Result<Arc<AnalysisReport>, AppError> {
        let data = &self.config.data;
        let (Some(prices), Some(macros)) = (&data.prices_path, &data.macro_path) else {
            return Err(PipelineError::MissingInput(
                "data.prices_path and data.macro_path must both be configured".to_string(),
            )
            .into());
        };

        let (price_rows, macro_rows) = pipeline::load_inputs(prices, macros)?;
        let params = AnalysisParams::from(&self.config.analysis);
        let report = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_compute(&price_rows, &macro_rows, &params)?;

        *self.report.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&report));
        tracing::info!(rows = report.summary.rows, points = report.summary.regression_points, "Serving new analysis.");
        Ok(report)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).stats()
    }

    pub fn is_loaded(&self) -> bool {
        self.report.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}
