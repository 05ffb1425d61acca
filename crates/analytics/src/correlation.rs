use crate::stats;
use serde::{Deserialize, Serialize};

/// A symmetric matrix of pairwise Pearson correlations.
///
/// Each pair is computed over the rows where both columns are present, so one
/// sparse column does not shrink the sample of every other pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major; `values[i][j]` correlates `labels[i]` with `labels[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Builds the matrix over the given named columns.
    ///
    /// Columns without a single present value are left out. Columns are
    /// expected to be aligned row for row; extra rows in a longer column are
    /// ignored.
    pub fn from_columns(columns: &[(&str, &[Option<f64>])]) -> Self {
        let kept: Vec<&(&str, &[Option<f64>])> = columns
            .iter()
            .filter(|(_, values)| values.iter().any(|v| v.is_some_and(f64::is_finite)))
            .collect();
        if kept.len() < columns.len() {
            tracing::debug!(
                dropped = columns.len() - kept.len(),
                "Left empty columns out of the correlation matrix."
            );
        }

        let labels = kept.iter().map(|(name, _)| name.to_string()).collect();
        let n = kept.len();
        let mut values = vec![vec![None; n]; n];

        for i in 0..n {
            for j in i..n {
                let r = pairwise(kept[i].1, kept[j].1);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Self { labels, values }
    }

    /// Looks up the correlation between two labelled columns.
    pub fn get(&self, left: &str, right: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == left)?;
        let j = self.labels.iter().position(|l| l == right)?;
        self.values[i][j]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn pairwise(left: &[Option<f64>], right: &[Option<f64>]) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = left
        .iter()
        .zip(right)
        .filter_map(|pair| match pair {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .unzip();
    stats::pearson(&xs, &ys)
}
