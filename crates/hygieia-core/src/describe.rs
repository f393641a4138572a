//! Descriptive summaries of the cohort: frequency tables for categorical
//! demographics and spread statistics for the continuous metrics.

use serde::Serialize;
use std::collections::BTreeMap;

use hygieia_stats::{mean, median, quantile, sample_std};

use crate::record::{CONTINUOUS_METRICS, RawRecord, ScoredRecord, fields};

/// One categorical value's frequency.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyRow {
    pub value: i64,
    pub count: usize,
    pub percentage: f64,
    pub proportion: f64,
}

/// Frequency distribution for one categorical field, sorted by count
/// descending.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyTable {
    pub field: String,
    pub rows: Vec<FrequencyRow>,
    pub missing: usize,
}

/// Categorical demographics summarized by frequency tables.
pub const CATEGORICAL_FIELDS: &[&str] = &[
    fields::AGE,
    fields::MATERNAL_EDUCATION,
    fields::PATERNAL_EDUCATION,
    fields::MATERNAL_OCCUPATION,
    fields::PATERNAL_OCCUPATION,
];

/// Frequency distribution of `field` over the raw records.
pub fn frequency_table(records: &[RawRecord], field: &str) -> FrequencyTable {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    let mut missing = 0usize;
    for record in records {
        match record.code(field) {
            Some(code) => *counts.entry(code).or_insert(0) += 1,
            None => missing += 1,
        }
    }

    let total: usize = counts.values().sum();
    let mut rows: Vec<FrequencyRow> = counts
        .into_iter()
        .map(|(value, count)| FrequencyRow {
            value,
            count,
            percentage: if total == 0 {
                0.0
            } else {
                (count as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
            },
            proportion: if total == 0 {
                0.0
            } else {
                (count as f64 / total as f64 * 10000.0).round() / 10000.0
            },
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.value.cmp(&b.value)));

    FrequencyTable {
        field: field.to_string(),
        rows,
        missing,
    }
}

/// Spread statistics for one continuous variable.
#[derive(Debug, Clone, Serialize)]
pub struct ContinuousSummary {
    pub variable: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `None` below 2 observations.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
}

/// Summaries for every continuous metric with at least one observation.
pub fn continuous_summaries(scored: &[ScoredRecord]) -> Vec<ContinuousSummary> {
    CONTINUOUS_METRICS
        .iter()
        .filter_map(|metric| {
            let values: Vec<f64> = scored.iter().filter_map(|r| r.metric(metric)).collect();
            if values.is_empty() {
                return None;
            }
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some(ContinuousSummary {
                variable: metric.to_string(),
                count: values.len(),
                mean: mean(&values),
                median: median(&values).unwrap_or(0.0),
                std: sample_std(&values),
                min,
                max,
                q25: quantile(&values, 0.25).unwrap_or(0.0),
                q75: quantile(&values, 0.75).unwrap_or(0.0),
            })
        })
        .collect()
}
