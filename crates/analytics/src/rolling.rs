use crate::error::AnalyticsError;
use crate::stats;
use crate::window::SlidingWindow;

/// Trailing sample standard deviation over `window` rows.
///
/// Output has the same length as `values`. An entry is `None` until the window
/// has filled (the first `window - 1` rows) and whenever the window holds a
/// null.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>, AnalyticsError> {
    check_window(window)?;

    let mut buf = SlidingWindow::new(window);
    let mut scratch = Vec::with_capacity(window);

    Ok(values
        .iter()
        .map(|value| {
            buf.push(value.filter(|v| v.is_finite()));
            if !buf.is_complete() {
                return None;
            }
            scratch.clear();
            scratch.extend(buf.present().copied());
            stats::sample_std(&scratch)
        })
        .collect())
}

/// Trailing Pearson correlation between two aligned series over `window` rows.
///
/// A row pair counts as null when either side is null. An entry is `None` until
/// the window has filled, whenever it holds a null pair, and when either side
/// has zero variance inside the window.
pub fn rolling_corr(
    left: &[Option<f64>],
    right: &[Option<f64>],
    window: usize,
) -> Result<Vec<Option<f64>>, AnalyticsError> {
    check_window(window)?;
    if left.len() != right.len() {
        return Err(AnalyticsError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }

    let mut buf = SlidingWindow::new(window);
    let mut xs = Vec::with_capacity(window);
    let mut ys = Vec::with_capacity(window);

    Ok(left
        .iter()
        .zip(right)
        .map(|(l, r)| {
            let pair = match (l, r) {
                (Some(l), Some(r)) if l.is_finite() && r.is_finite() => Some((*l, *r)),
                _ => None,
            };
            buf.push(pair);
            if !buf.is_complete() {
                return None;
            }
            xs.clear();
            ys.clear();
            for (x, y) in buf.present() {
                xs.push(*x);
                ys.push(*y);
            }
            stats::pearson(&xs, &ys)
        })
        .collect())
}

/// Multiplies every present value by `factor`.
pub fn scale(values: &mut [Option<f64>], factor: f64) {
    for value in values.iter_mut().flatten() {
        *value *= factor;
    }
}

fn check_window(window: usize) -> Result<(), AnalyticsError> {
    if window < 2 {
        return Err(AnalyticsError::InvalidWindow { min: 2, got: window });
    }
    Ok(())
}
