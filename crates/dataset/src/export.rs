use crate::error::DatasetError;
use core_types::{RegressionPoint, TimeSeriesRow};
use polars::prelude::{DataFrame, NamedFrom, ParquetWriter, Series};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the merged series as CSV with a header row. Nulls become empty cells.
pub fn write_series_csv<W: Write>(writer: W, rows: &[TimeSeriesRow]) -> Result<(), DatasetError> {
    write_csv(writer, rows)
}

/// Writes the regression points as CSV with a header row.
pub fn write_betas_csv<W: Write>(writer: W, points: &[RegressionPoint]) -> Result<(), DatasetError> {
    write_csv(writer, points)
}

fn write_csv<W: Write, T: Serialize>(writer: W, records: &[T]) -> Result<(), DatasetError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Converts the merged series into a column-oriented data frame.
pub fn series_frame(rows: &[TimeSeriesRow]) -> Result<DataFrame, DatasetError> {
    let col = |name: &str, f: fn(&TimeSeriesRow) -> Option<f64>| {
        Series::new(name, rows.iter().map(f).collect::<Vec<_>>())
    };
    let dates: Vec<_> = rows.iter().map(|r| r.date).collect();

    let df = DataFrame::new(vec![
        Series::new("date", dates),
        // Prices and returns
        col("gold_close", |r| r.gold_close),
        col("silver_close", |r| r.silver_close),
        col("gold_returns", |r| r.gold_returns),
        col("silver_returns", |r| r.silver_returns),
        // Macro indicators
        col("dxy", |r| r.dxy),
        col("us10y_yield", |r| r.us10y_yield),
        col("india_cpi", |r| r.india_cpi),
        col("googletrends_gold", |r| r.googletrends_gold),
        col("googletrends_silver", |r| r.googletrends_silver),
        // Derived
        col("gold_volatility", |r| r.gold_volatility),
        col("silver_volatility", |r| r.silver_volatility),
        col("gold_to_dxy_corr", |r| r.gold_to_dxy_corr),
        col("gold_to_yield_corr", |r| r.gold_to_yield_corr),
        col("gold_silver_ratio", |r| r.gold_silver_ratio),
    ])?;

    Ok(df)
}

/// Converts regression points into a column-oriented data frame.
pub fn betas_frame(points: &[RegressionPoint]) -> Result<DataFrame, DatasetError> {
    let col = |name: &str, f: fn(&RegressionPoint) -> Option<f64>| {
        Series::new(name, points.iter().map(f).collect::<Vec<_>>())
    };
    let dates: Vec<_> = points.iter().map(|p| p.date).collect();
    let observations: Vec<u64> = points.iter().map(|p| p.observations as u64).collect();

    let df = DataFrame::new(vec![
        Series::new("date", dates),
        col("inflation_beta", |p| p.inflation_beta),
        col("dxy_beta", |p| p.dxy_beta),
        col("yield_beta", |p| p.yield_beta),
        col("sentiment_beta", |p| p.sentiment_beta),
        col("intercept", |p| p.intercept),
        col("r_squared", |p| p.r_squared),
        Series::new("observations", observations),
    ])?;

    Ok(df)
}

/// Writes a data frame to a Parquet file, replacing any existing file.
pub fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), DatasetError> {
    let mut file = File::create(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    ParquetWriter::new(&mut file).finish(df)?;
    tracing::info!(path = %path.display(), rows = df.height(), "Wrote Parquet file.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use polars::prelude::ParquetReader;
    use polars::prelude::SerReader;

    fn row(day: u32) -> TimeSeriesRow {
        let mut row = TimeSeriesRow::empty(NaiveDate::from_ymd_opt(2024, 2, day).unwrap());
        row.gold_close = Some(2000.0 + day as f64);
        row.silver_close = Some(25.0);
        row.gold_silver_ratio = Some((2000.0 + day as f64) / 25.0);
        row
    }

    #[test]
    fn series_csv_has_header_and_empty_nulls() {
        let mut buf = Vec::new();
        write_series_csv(&mut buf, &[row(1)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("date,gold_close,silver_close,gold_returns"));
        let first = lines.next().unwrap();
        assert!(first.starts_with("2024-02-01,2001.0,25.0,,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn frames_have_one_row_per_record() {
        let df = series_frame(&[row(1), row(2), row(3)]).unwrap();
        assert_eq!(df.shape(), (3, 15));

        let point = RegressionPoint {
            date: NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
            inflation_beta: Some(0.1),
            dxy_beta: Some(-0.2),
            yield_beta: None,
            sentiment_beta: Some(0.0),
            intercept: Some(1.0),
            r_squared: Some(0.5),
            observations: 180,
        };
        let df = betas_frame(&[point]).unwrap();
        assert_eq!(df.shape(), (1, 8));
    }

    #[test]
    fn parquet_round_trips_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.parquet");
        let mut df = series_frame(&[row(1), row(2)]).unwrap();

        write_parquet(&mut df, &path).unwrap();

        let read = ParquetReader::new(File::open(&path).unwrap()).finish().unwrap();
        assert_eq!(read.shape(), (2, 15));
    }
}
