//! Grouped aggregation: partition scored records by a grouping attribute
//! and compute per-group descriptive statistics.
//!
//! Records whose grouping value is missing (or not a whole-number code) are
//! counted in `excluded_missing_key`, never silently dropped. Every record
//! with a usable grouping value lands in exactly one bucket, so the bucket
//! sizes sum to the number of usable records.

use serde::Serialize;
use std::collections::BTreeMap;

use hygieia_stats::{mean, sample_std};

use crate::record::ScoredRecord;

/// The two metrics compared across groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    Knowledge,
    Practice,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Knowledge => "knowledge_score",
            Self::Practice => "practice_score",
        }
    }

    pub const ALL: [Metric; 2] = [Metric::Knowledge, Metric::Practice];
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One bucket's raw observations.
#[derive(Debug, Clone, Serialize)]
pub struct GroupBucket {
    /// The grouping field's code for this bucket.
    pub key: i64,
    pub knowledge: Vec<f64>,
    pub practice: Vec<f64>,
}

impl GroupBucket {
    pub fn values(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Knowledge => &self.knowledge,
            Metric::Practice => &self.practice,
        }
    }
}

/// Per-group descriptive statistics for the summary table.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub key: i64,
    pub n: usize,
    pub mean_knowledge: f64,
    /// Sample standard deviation (n−1). `None` for a singleton group,
    /// which has no internal variance to measure.
    pub std_knowledge: Option<f64>,
    pub mean_practice: f64,
    pub std_practice: Option<f64>,
}

/// The full partition for one grouping field.
#[derive(Debug, Clone, Serialize)]
pub struct GroupedScores {
    pub group_field: String,
    /// Buckets in ascending key order.
    pub buckets: Vec<GroupBucket>,
    /// Records whose grouping value was missing or not a whole-number code.
    pub excluded_missing_key: usize,
}

impl GroupedScores {
    /// Summary rows, one per bucket, in key order.
    pub fn summaries(&self) -> Vec<GroupSummary> {
        self.buckets
            .iter()
            .map(|b| GroupSummary {
                key: b.key,
                n: b.knowledge.len(),
                mean_knowledge: mean(&b.knowledge),
                std_knowledge: sample_std(&b.knowledge),
                mean_practice: mean(&b.practice),
                std_practice: sample_std(&b.practice),
            })
            .collect()
    }

    /// Per-group observation slices for one metric, bucket order preserved.
    pub fn metric_groups(&self, metric: Metric) -> Vec<&[f64]> {
        self.buckets.iter().map(|b| b.values(metric)).collect()
    }

    /// Total records across all buckets.
    pub fn total_grouped(&self) -> usize {
        self.buckets.iter().map(|b| b.knowledge.len()).sum()
    }
}

/// Partition `scored` by the value of `group_field`.
pub fn group_by(scored: &[ScoredRecord], group_field: &str) -> GroupedScores {
    let mut buckets: BTreeMap<i64, GroupBucket> = BTreeMap::new();
    let mut excluded = 0usize;

    for record in scored {
        match record.raw.code(group_field) {
            Some(key) => {
                let bucket = buckets.entry(key).or_insert_with(|| GroupBucket {
                    key,
                    knowledge: Vec::new(),
                    practice: Vec::new(),
                });
                bucket.knowledge.push(record.knowledge_score as f64);
                bucket.practice.push(record.practice_score as f64);
            }
            None => excluded += 1,
        }
    }

    if excluded > 0 {
        log::debug!("{excluded} records excluded from '{group_field}' grouping (missing key)");
    }

    GroupedScores {
        group_field: group_field.to_string(),
        buckets: buckets.into_values().collect(),
        excluded_missing_key: excluded,
    }
}
