//! Pairwise association over the continuous metrics.
//!
//! Each unordered metric pair is correlated over the records where both
//! members are present (pairwise-complete): a record missing one metric
//! still contributes to every pair it does observe. The matrix is symmetric
//! with a unit diagonal; degenerate pairs (fewer than 2 co-observations, or
//! zero variance in either series) are undefined rather than a division by
//! zero.

use serde::Serialize;

use hygieia_stats::pearson;

use crate::record::{CONTINUOUS_METRICS, ScoredRecord};

/// Symmetric correlation matrix over named metrics.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<String>,
    /// `coefficients[i][j]` is r(metrics[i], metrics[j]); `None` when the
    /// pair is degenerate.
    pub coefficients: Vec<Vec<Option<f64>>>,
    /// Co-observation count backing each coefficient.
    pub n_observations: Vec<Vec<usize>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.metrics.iter().position(|m| m == a)?;
        let j = self.metrics.iter().position(|m| m == b)?;
        self.coefficients[i][j]
    }

    pub fn size(&self) -> usize {
        self.metrics.len()
    }
}

/// Correlate the default continuous metrics.
pub fn correlation_matrix(scored: &[ScoredRecord]) -> CorrelationMatrix {
    correlation_matrix_for(scored, CONTINUOUS_METRICS)
}

/// Correlate an explicit metric list.
pub fn correlation_matrix_for(scored: &[ScoredRecord], metrics: &[&str]) -> CorrelationMatrix {
    let k = metrics.len();
    let mut coefficients = vec![vec![None; k]; k];
    let mut n_observations = vec![vec![0usize; k]; k];

    // Extract each metric's series once; None marks an unobserved cell.
    let series: Vec<Vec<Option<f64>>> = metrics
        .iter()
        .map(|m| scored.iter().map(|r| r.metric(m)).collect())
        .collect();

    for i in 0..k {
        coefficients[i][i] = Some(1.0);
        n_observations[i][i] = series[i].iter().filter(|v| v.is_some()).count();

        for j in (i + 1)..k {
            // Pairwise-complete: keep exactly the rows observing both.
            let mut xs = Vec::new();
            let mut ys = Vec::new();
            for (x, y) in series[i].iter().zip(series[j].iter()) {
                if let (Some(x), Some(y)) = (x, y) {
                    xs.push(*x);
                    ys.push(*y);
                }
            }
            let r = pearson(&xs, &ys);
            coefficients[i][j] = r;
            coefficients[j][i] = r;
            n_observations[i][j] = xs.len();
            n_observations[j][i] = xs.len();
        }
    }

    CorrelationMatrix {
        metrics: metrics.iter().map(|m| m.to_string()).collect(),
        coefficients,
        n_observations,
    }
}
