use analytics::{AnalyticsError, rolling_corr, rolling_std, scale};
use configuration::MergeParams;
use core_types::TimeSeriesRow;

/// Fills the derived columns of a sorted, joined series in place.
///
/// Each column depends only on source columns, and every rolling window runs
/// over the full series by row position.
pub fn derive_columns(rows: &mut [TimeSeriesRow], params: &MergeParams) -> Result<(), AnalyticsError> {
    let column = |f: fn(&TimeSeriesRow) -> Option<f64>| rows.iter().map(f).collect::<Vec<_>>();
    let gold_returns = column(|r| r.gold_returns);
    let silver_returns = column(|r| r.silver_returns);
    let dxy = column(|r| r.dxy);
    let yields = column(|r| r.us10y_yield);

    let annualization = params.annualization();
    let mut gold_volatility = rolling_std(&gold_returns, params.volatility_window)?;
    scale(&mut gold_volatility, annualization);
    let mut silver_volatility = rolling_std(&silver_returns, params.volatility_window)?;
    scale(&mut silver_volatility, annualization);

    let gold_to_dxy = rolling_corr(&gold_returns, &dxy, params.correlation_window)?;
    let gold_to_yield = rolling_corr(&gold_returns, &yields, params.correlation_window)?;

    for (i, row) in rows.iter_mut().enumerate() {
        row.gold_volatility = gold_volatility[i];
        row.silver_volatility = silver_volatility[i];
        row.gold_to_dxy_corr = gold_to_dxy[i];
        row.gold_to_yield_corr = gold_to_yield[i];
        row.gold_silver_ratio = ratio(row.gold_close, row.silver_close);
    }

    Ok(())
}

/// Plain division; a zero silver price yields an infinite ratio, not a null.
fn ratio(gold: Option<f64>, silver: Option<f64>) -> Option<f64> {
    Some(gold? / silver?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Days, NaiveDate};

    fn rows(n: usize) -> Vec<TimeSeriesRow> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let mut row = TimeSeriesRow::empty(start + Days::new(i as u64));
                let t = i as f64;
                row.gold_close = Some(1800.0 + t);
                row.silver_close = Some(22.0 + (t * 0.3).sin());
                row.gold_returns = Some((t * 0.7).sin() * 0.01);
                row.silver_returns = Some((t * 1.3).cos() * 0.02);
                row.dxy = Some(100.0 + (t * 0.2).cos());
                row.us10y_yield = Some(3.5 + t * 0.001);
                row
            })
            .collect()
    }

    #[test]
    fn rolling_columns_are_null_before_their_window() {
        let mut series = rows(120);
        derive_columns(&mut series, &MergeParams::default()).unwrap();

        assert!(series[..29].iter().all(|r| r.gold_volatility.is_none()));
        assert!(series[29..].iter().all(|r| r.gold_volatility.is_some()));
        assert!(series[..89].iter().all(|r| r.gold_to_dxy_corr.is_none()));
        assert!(series[89..].iter().all(|r| r.gold_to_dxy_corr.is_some()));
        assert!(series[89..].iter().all(|r| r.gold_to_yield_corr.is_some()));
    }

    #[test]
    fn volatility_is_annualized_sample_std() {
        let mut series = rows(30);
        let returns: Vec<f64> = series.iter().filter_map(|r| r.gold_returns).collect();
        derive_columns(&mut series, &MergeParams::default()).unwrap();

        let expected = analytics::stats::sample_std(&returns).unwrap() * 252f64.sqrt();
        assert_relative_eq!(series[29].gold_volatility.unwrap(), expected);
    }

    #[test]
    fn ratio_is_exact_division_and_null_aware() {
        let mut series = rows(3);
        series[1].silver_close = None;
        series[2].silver_close = Some(0.0);
        derive_columns(&mut series, &MergeParams::default()).unwrap();

        assert_eq!(
            series[0].gold_silver_ratio,
            Some(series[0].gold_close.unwrap() / series[0].silver_close.unwrap())
        );
        assert_eq!(series[1].gold_silver_ratio, None);
        assert_eq!(series[2].gold_silver_ratio, Some(f64::INFINITY));
    }

    #[test]
    fn single_row_has_only_the_ratio() {
        let mut series = rows(1);
        derive_columns(&mut series, &MergeParams::default()).unwrap();

        let row = &series[0];
        assert!(row.gold_volatility.is_none());
        assert!(row.silver_volatility.is_none());
        assert!(row.gold_to_dxy_corr.is_none());
        assert!(row.gold_to_yield_corr.is_none());
        assert!(row.gold_silver_ratio.is_some());
    }
}
