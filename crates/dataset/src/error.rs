use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to read input file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read workbook {path}: {source}")]
    Workbook {
        path: String,
        #[source]
        source: calamine::Error,
    },

    #[error("Workbook {0} has no worksheet with a header row")]
    EmptyWorkbook(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column '{column}' is missing from the {source_name} dataset")]
    MissingColumn { source_name: String, column: String },

    #[error("Failed to compute derived columns: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Failed to build data frame: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
