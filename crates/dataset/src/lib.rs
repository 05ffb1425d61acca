//! # Bullion Dataset
//!
//! Loads the two spreadsheets (CSV exports or workbooks), joins them by date
//! into one typed series and fills in the derived rolling columns. Also writes the results back out
//! as CSV or Parquet.
//!
//! ## Public API
//!
//! - `load_price_rows`, `load_macro_rows`: header-driven loaders for CSV files
//!   and the first sheet of `.xlsx`/`.xls`/`.ods` workbooks.
//! - `merge` / `DatasetMerger`: the inner join plus derived columns.
//! - `MergeReport`: join bookkeeping and coercion warnings.
//! - `write_series_csv`, `write_betas_csv`, `series_frame`, `betas_frame`, `write_parquet`.

pub mod derive;
pub mod error;
pub mod export;
pub mod loader;
pub mod merger;
pub mod parse;

pub use derive::derive_columns;
pub use error::DatasetError;
pub use export::{betas_frame, series_frame, write_betas_csv, write_parquet, write_series_csv};
pub use loader::{load_macro_rows, load_price_rows, read_macro_rows, read_price_rows};
pub use merger::{CoercionWarning, DatasetMerger, MergeReport, MergedDataset, merge};
