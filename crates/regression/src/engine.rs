use crate::error::{FitError, RegressionError};
use crate::ols;
use analytics::SlidingWindow;
use chrono::NaiveDate;
use configuration::{MIN_REGRESSION_WINDOW, NullPolicy, RegressionParams};
use core_types::{Predictor, RegressionPoint, SkipReason, TimeSeriesRow, WindowOutcome};
use nalgebra::{DMatrix, DVector};

/// Intercept plus one column per predictor.
pub const PARAMETERS: usize = Predictor::ALL.len() + 1;

/// `gold_returns` followed by the predictors, laid out by `column`.
type Observation = [f64; PARAMETERS];

/// Fits gold returns on the macro drivers over a trailing window of rows.
#[derive(Debug, Clone)]
pub struct RollingRegression {
    params: RegressionParams,
}

impl RollingRegression {
    /// Creates the engine, rejecting windows with no residual degrees of freedom.
    pub fn new(params: RegressionParams) -> Result<Self, RegressionError> {
        if params.window < MIN_REGRESSION_WINDOW {
            return Err(RegressionError::InvalidWindow {
                min: MIN_REGRESSION_WINDOW,
                got: params.window,
            });
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &RegressionParams {
        &self.params
    }

    /// Evaluates every window end-index and reports what happened to each.
    ///
    /// Under `NullPolicy::DropRows` rows missing any regression input are
    /// removed once, up front, so windows run over the filtered sequence. For
    /// each index `i` from `window` onward the model is fitted on rows
    /// `[i - window, i)` and keyed by the date of row `i`.
    pub fn evaluate_windows(&self, rows: &[TimeSeriesRow]) -> Vec<WindowOutcome> {
        let window = self.params.window;
        let usable: Vec<&TimeSeriesRow> = match self.params.null_policy {
            NullPolicy::DropRows => rows.iter().filter(|r| r.has_regression_inputs()).collect(),
            NullPolicy::SkipWindows => rows.iter().collect(),
        };

        if usable.len() <= window {
            tracing::debug!(rows = usable.len(), window, "Not enough rows for a regression window.");
            return Vec::new();
        }

        let mut buf: SlidingWindow<Observation> = SlidingWindow::new(window);
        let mut outcomes = Vec::with_capacity(usable.len() - window);

        for (index, row) in usable.iter().enumerate() {
            if index >= window {
                let outcome = match fit_window(&buf) {
                    Ok(fit) => WindowOutcome::Fitted(point(row.date, fit, window)),
                    Err(reason) => {
                        tracing::debug!(index, date = %row.date, %reason, "Regression window skipped.");
                        WindowOutcome::Skipped { index, date: row.date, reason }
                    }
                };
                outcomes.push(outcome);
            }
            buf.push(observation(row));
        }

        let skipped = outcomes.iter().filter(|o| o.is_skipped()).count();
        tracing::info!(
            rows = rows.len(),
            usable_rows = usable.len(),
            window,
            fitted = outcomes.len() - skipped,
            skipped,
            "Rolling regression complete."
        );
        outcomes
    }

    /// The fitted points only, in ascending date order.
    pub fn rolling_betas(&self, rows: &[TimeSeriesRow]) -> Vec<RegressionPoint> {
        self.evaluate_windows(rows)
            .iter()
            .filter_map(|outcome| outcome.point().cloned())
            .collect()
    }
}

/// Runs the rolling regression with the default null policy.
pub fn rolling_betas(rows: &[TimeSeriesRow], window: usize) -> Result<Vec<RegressionPoint>, RegressionError> {
    let engine = RollingRegression::new(RegressionParams {
        window,
        ..RegressionParams::default()
    })?;
    Ok(engine.rolling_betas(rows))
}

/// Design-matrix column of each predictor; column 0 is the intercept and
/// slot 0 of an `Observation` is the response.
fn column(predictor: Predictor) -> usize {
    match predictor {
        Predictor::IndiaCpi => 1,
        Predictor::Dxy => 2,
        Predictor::Us10yYield => 3,
        Predictor::GoogleTrendsGold => 4,
    }
}

/// Extracts the response and predictors, or `None` if any is null or non-finite.
fn observation(row: &TimeSeriesRow) -> Option<Observation> {
    let mut values = [0.0; PARAMETERS];
    values[0] = row.gold_returns?;
    for predictor in Predictor::ALL {
        values[column(predictor)] = row.predictor(predictor)?;
    }
    values.iter().all(|v| v.is_finite()).then_some(values)
}

fn fit_window(buf: &SlidingWindow<Observation>) -> Result<ols::OlsFit, SkipReason> {
    if !buf.is_complete() {
        return Err(SkipReason::NullValue);
    }

    let observations: Vec<&Observation> = buf.present().collect();
    let n = observations.len();
    let y = DVector::from_iterator(n, observations.iter().map(|o| o[0]));
    // Column 0 is the intercept; columns 1.. are the predictors.
    let x = DMatrix::from_fn(n, PARAMETERS, |r, c| if c == 0 { 1.0 } else { observations[r][c] });

    ols::fit(&x, &y).map_err(|e| match e {
        FitError::RankDeficient => SkipReason::RankDeficient,
        FitError::NonFinite => SkipReason::NonFinite,
        FitError::NonConvergent | FitError::DimensionMismatch { .. } => SkipReason::NonConvergent,
    })
}

fn point(date: NaiveDate, fit: ols::OlsFit, observations: usize) -> RegressionPoint {
    let beta = |predictor: Predictor| fit.coefficients.get(column(predictor)).copied();

    RegressionPoint {
        date,
        inflation_beta: beta(Predictor::IndiaCpi),
        dxy_beta: beta(Predictor::Dxy),
        yield_beta: beta(Predictor::Us10yYield),
        sentiment_beta: beta(Predictor::GoogleTrendsGold),
        intercept: fit.coefficients.get(0).copied(),
        r_squared: fit.r_squared,
        observations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Days;

    const INFLATION: f64 = 0.004;
    const DXY: f64 = -0.0015;
    const YIELD: f64 = 0.002;
    const SENTIMENT: f64 = 0.0001;
    const INTERCEPT: f64 = 0.05;

    /// A deterministic series whose returns are an exact linear function of the drivers.
    fn series(n: usize) -> Vec<TimeSeriesRow> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let t = i as f64;
                let mut row = TimeSeriesRow::empty(start + Days::new(i as u64));
                let cpi = 5.0 + (0.05 * t).sin() + 0.01 * t;
                let dxy = 100.0 + 2.0 * (0.11 * t).cos();
                let yld = 4.0 + (0.23 * t + 1.0).sin();
                let trends = 50.0 + 10.0 * (0.37 * t).sin();
                row.india_cpi = Some(cpi);
                row.dxy = Some(dxy);
                row.us10y_yield = Some(yld);
                row.googletrends_gold = Some(trends);
                row.gold_returns =
                    Some(INTERCEPT + INFLATION * cpi + DXY * dxy + YIELD * yld + SENTIMENT * trends);
                row
            })
            .collect()
    }

    fn engine(window: usize, null_policy: NullPolicy) -> RollingRegression {
        RollingRegression::new(RegressionParams { window, null_policy }).unwrap()
    }

    #[test]
    fn complete_series_yields_one_point_per_index() {
        let rows = series(300);
        let points = rolling_betas(&rows, 180).unwrap();

        assert_eq!(points.len(), 120);
        for (k, point) in points.iter().enumerate() {
            assert_eq!(point.date, rows[180 + k].date);
            assert!(Predictor::ALL.iter().all(|p| point.beta(*p).is_some()));
            assert_eq!(point.observations, 180);
        }
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn recovers_known_coefficients() {
        let points = rolling_betas(&series(200), 180).unwrap();
        let point = &points[0];

        assert_relative_eq!(point.inflation_beta.unwrap(), INFLATION, epsilon = 1e-8);
        assert_relative_eq!(point.dxy_beta.unwrap(), DXY, epsilon = 1e-8);
        assert_relative_eq!(point.yield_beta.unwrap(), YIELD, epsilon = 1e-8);
        assert_relative_eq!(point.sentiment_beta.unwrap(), SENTIMENT, epsilon = 1e-8);
        assert_relative_eq!(point.intercept.unwrap(), INTERCEPT, epsilon = 1e-6);
    }

    #[test]
    fn null_rows_are_dropped_before_windowing() {
        let mut rows = series(300);
        rows[50].dxy = None;

        let points = engine(180, NullPolicy::DropRows).rolling_betas(&rows);

        // The row disappears, so the filtered sequence is one shorter.
        assert_eq!(points.len(), 119);
        assert_eq!(points[0].date, rows[181].date);
    }

    #[test]
    fn null_rows_skip_covering_windows_when_kept() {
        let mut rows = series(300);
        rows[50].dxy = None;

        let outcomes = engine(180, NullPolicy::SkipWindows).evaluate_windows(&rows);
        assert_eq!(outcomes.len(), 120);

        // Windows [i - 180, i) contain index 50 for i in 180..=230.
        for outcome in &outcomes {
            match outcome {
                WindowOutcome::Skipped { index, reason, .. } => {
                    assert!(*index <= 230);
                    assert_eq!(*reason, SkipReason::NullValue);
                }
                WindowOutcome::Fitted(point) => assert!(point.date > rows[230].date),
            }
        }
        let skipped = outcomes.iter().filter(|o| o.is_skipped()).count();
        assert_eq!(skipped, 51);
    }

    #[test]
    fn collinear_windows_are_skipped_not_fatal() {
        let mut rows = series(40);
        for row in &mut rows {
            row.googletrends_gold = Some(42.0);
        }

        let outcomes = engine(20, NullPolicy::DropRows).evaluate_windows(&rows);

        assert_eq!(outcomes.len(), 20);
        assert!(outcomes.iter().all(|o| matches!(
            o,
            WindowOutcome::Skipped { reason: SkipReason::RankDeficient, .. }
        )));
    }

    #[test]
    fn short_input_produces_nothing() {
        assert!(rolling_betas(&series(180), 180).unwrap().is_empty());
        assert!(rolling_betas(&[], 180).unwrap().is_empty());
    }

    #[test]
    fn output_is_deterministic() {
        let rows = series(250);
        let first = rolling_betas(&rows, 180).unwrap();
        let second = rolling_betas(&rows, 180).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tiny_windows_are_rejected() {
        let err = rolling_betas(&series(10), PARAMETERS).unwrap_err();
        assert_eq!(err, RegressionError::InvalidWindow { min: 6, got: 5 });
    }

    #[test]
    fn configured_minimum_leaves_one_residual_degree_of_freedom() {
        assert_eq!(MIN_REGRESSION_WINDOW, PARAMETERS + 1);
        assert!(RollingRegression::new(RegressionParams {
            window: MIN_REGRESSION_WINDOW,
            null_policy: NullPolicy::DropRows,
        })
        .is_ok());
    }
}
