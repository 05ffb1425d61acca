use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] dataset::DatasetError),

    #[error("Regression error: {0}")]
    Regression(#[from] regression::RegressionError),

    #[error("Failed to serialize inputs for the cache key: {0}")]
    CacheKey(#[from] serde_json::Error),

    #[error("Input paths are not configured: {0}")]
    MissingInput(String),
}
