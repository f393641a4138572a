//! Assumption checks and k-sample comparison tests for survey metrics.
//!
//! Provides the statistical primitives the analysis engine builds on: a
//! normality check (Jarque-Bera), a variance-homogeneity check (Levene),
//! one-way ANOVA, the Kruskal-Wallis rank test, and Pearson correlation,
//! plus the descriptive helpers shared by the aggregation layer. Each test
//! returns a [`StatTest`] with a statistic, an optional p-value, and a
//! details string; a test that cannot be computed reports `p_value: None`
//! rather than a fabricated number.

use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor};

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a single statistical test.
#[derive(Debug, Clone)]
pub struct StatTest {
    pub name: String,
    pub statistic: f64,
    /// `None` when the test could not be computed (see `details`).
    pub p_value: Option<f64>,
    pub details: String,
}

impl StatTest {
    /// Whether the test rejects its null hypothesis at `alpha`.
    /// An uncomputable test never rejects.
    pub fn rejects_at(&self, alpha: f64) -> bool {
        match self.p_value {
            Some(p) => p < alpha,
            None => false,
        }
    }
}

/// Build a `StatTest` for input too small or too degenerate to test.
fn uncomputable(name: &str, why: impl Into<String>) -> StatTest {
    StatTest {
        name: name.to_string(),
        statistic: 0.0,
        p_value: None,
        details: why.into(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Descriptive helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (divisor n−1).
///
/// `None` for fewer than two observations: a singleton has no internal
/// variance to measure.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (n - 1) as f64).sqrt())
}

/// Median via the linear-interpolation quantile.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between order statistics.
/// `q` is clamped to [0, 1]. `None` for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Midranks (1-based). Tied values share the average of the ranks they span.
pub fn rank(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // Positions i..=j hold a tie group; assign the midrank.
        let midrank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = midrank;
        }
        i = j + 1;
    }
    ranks
}

// ═══════════════════════════════════════════════════════════════════════════════
// Normality: Jarque-Bera
// ═══════════════════════════════════════════════════════════════════════════════

/// Jarque-Bera normality test.
///
/// JB = n/6 · (S² + K²/4) where S is skewness and K is excess kurtosis,
/// referred to a χ² distribution with 2 degrees of freedom. Needs at least
/// 3 observations and non-zero variance.
pub fn jarque_bera(values: &[f64]) -> StatTest {
    let name = "Jarque-Bera";
    let n = values.len();
    if n < 3 {
        return uncomputable(name, format!("need at least 3 observations, got {n}"));
    }

    let m = mean(values);
    let nf = n as f64;
    let m2: f64 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    if m2 < 1e-12 {
        return uncomputable(name, "zero variance");
    }
    let m3: f64 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;
    let m4: f64 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>() / nf;

    let skew = m3 / m2.powf(1.5);
    let excess_kurt = m4 / (m2 * m2) - 3.0;
    let jb = nf / 6.0 * (skew * skew + excess_kurt * excess_kurt / 4.0);

    let dist = ChiSquared::new(2.0).unwrap();
    let p = dist.sf(jb);
    StatTest {
        name: name.to_string(),
        statistic: jb,
        p_value: Some(p),
        details: format!("n={n}, skew={skew:.3}, excess_kurtosis={excess_kurt:.3}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Variance homogeneity: Levene
// ═══════════════════════════════════════════════════════════════════════════════

/// Levene's test for equality of variances across groups, centered on the
/// group means. W is referred to F(k−1, N−k).
pub fn levene(groups: &[&[f64]]) -> StatTest {
    let name = "Levene";
    let k = groups.len();
    let total: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 {
        return uncomputable(name, format!("need at least 2 groups, got {k}"));
    }
    if groups.iter().any(|g| g.is_empty()) || total <= k {
        return uncomputable(name, "a group is empty or too small");
    }

    // Absolute deviations from each group's mean.
    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.iter().map(|v| (v - m).abs()).collect()
        })
        .collect();

    let grand_mean = {
        let sum: f64 = deviations.iter().flatten().sum();
        sum / total as f64
    };

    let between: f64 = deviations
        .iter()
        .map(|d| d.len() as f64 * (mean(d) - grand_mean).powi(2))
        .sum();
    let within: f64 = deviations
        .iter()
        .map(|d| {
            let m = mean(d);
            d.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        })
        .sum();

    let df1 = (k - 1) as f64;
    let df2 = (total - k) as f64;
    if within < 1e-12 {
        return uncomputable(name, "zero within-group spread");
    }
    let w = (between / df1) / (within / df2);

    let dist = FisherSnedecor::new(df1, df2).unwrap();
    let p = dist.sf(w);
    StatTest {
        name: name.to_string(),
        statistic: w,
        p_value: Some(p),
        details: format!("k={k}, N={total}, df=({df1:.0},{df2:.0})"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Parametric comparison: one-way ANOVA
// ═══════════════════════════════════════════════════════════════════════════════

/// One-way analysis of variance across `groups`.
///
/// F = (SS_between / (k−1)) / (SS_within / (N−k)), referred to F(k−1, N−k).
pub fn one_way_anova(groups: &[&[f64]]) -> StatTest {
    let name = "One-way ANOVA";
    let k = groups.len();
    let total: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 {
        return uncomputable(name, format!("need at least 2 groups, got {k}"));
    }
    if groups.iter().any(|g| g.is_empty()) || total <= k {
        return uncomputable(name, "a group is empty or too small");
    }

    let grand_mean = {
        let sum: f64 = groups.iter().flat_map(|g| g.iter()).sum();
        sum / total as f64
    };

    let ss_between: f64 = groups
        .iter()
        .map(|g| g.len() as f64 * (mean(g) - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        })
        .sum();

    let df1 = (k - 1) as f64;
    let df2 = (total - k) as f64;
    if ss_within < 1e-12 {
        return uncomputable(name, "zero within-group variance");
    }
    let f = (ss_between / df1) / (ss_within / df2);

    let dist = FisherSnedecor::new(df1, df2).unwrap();
    let p = dist.sf(f);
    StatTest {
        name: name.to_string(),
        statistic: f,
        p_value: Some(p),
        details: format!("k={k}, N={total}, df=({df1:.0},{df2:.0})"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Non-parametric comparison: Kruskal-Wallis
// ═══════════════════════════════════════════════════════════════════════════════

/// Kruskal-Wallis rank test across `groups`, with midrank ties correction.
/// H is referred to χ²(k−1).
pub fn kruskal_wallis(groups: &[&[f64]]) -> StatTest {
    let name = "Kruskal-Wallis";
    let k = groups.len();
    let total: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 {
        return uncomputable(name, format!("need at least 2 groups, got {k}"));
    }
    if groups.iter().any(|g| g.is_empty()) {
        return uncomputable(name, "a group is empty");
    }

    // Pool, rank, then split rank sums back per group.
    let pooled: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let ranks = rank(&pooled);

    let nf = total as f64;
    let mut h = 0.0;
    let mut offset = 0;
    for g in groups {
        let rank_sum: f64 = ranks[offset..offset + g.len()].iter().sum();
        h += rank_sum * rank_sum / g.len() as f64;
        offset += g.len();
    }
    h = 12.0 / (nf * (nf + 1.0)) * h - 3.0 * (nf + 1.0);

    // Ties correction: divide by 1 − Σ(t³−t)/(N³−N).
    let mut sorted = pooled.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mut tie_sum = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j + 1 < sorted.len() && sorted[j + 1] == sorted[i] {
            j += 1;
        }
        let t = (j - i + 1) as f64;
        tie_sum += t * t * t - t;
        i = j + 1;
    }
    let correction = 1.0 - tie_sum / (nf * nf * nf - nf);
    if correction < 1e-12 {
        return uncomputable(name, "all observations identical");
    }
    h /= correction;

    let df = (k - 1) as f64;
    let dist = ChiSquared::new(df).unwrap();
    let p = dist.sf(h);
    StatTest {
        name: name.to_string(),
        statistic: h,
        p_value: Some(p),
        details: format!("k={k}, N={total}, ties_correction={correction:.4}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Association: Pearson
// ═══════════════════════════════════════════════════════════════════════════════

/// Pearson correlation coefficient between two equal-length series.
///
/// `None` for fewer than 2 observations or zero variance in either series.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let mean_x = mean(&x[..n]);
    let mean_y = mean(&y[..n]);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = x[i] - mean_x;
        let dy = y[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom < 1e-12 { None } else { Some(cov / denom) }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
