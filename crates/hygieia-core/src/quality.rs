//! Data-quality assessment: purely observational inspection of raw and
//! scored records.
//!
//! The assessor never halts a run and never alters a score. It emits one
//! entry per (row, field, issue) for missing values, responses outside the
//! rubric's declared domain, and values outside physical range, then rolls
//! them up into a report with an overall quality ratio. Entirely-empty rows
//! are assessed like any others; excluding them is the loader's policy
//! decision, not this module's.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::record::{RawRecord, Schema, ScoredRecord, fields};
use crate::rubric::AnswerKey;

/// Kind of data-quality problem found in one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueKind {
    /// The value is the declared-missing sentinel (or absent).
    Missing,
    /// A question response outside the rubric's declared code domain.
    OutOfDomain,
    /// A numeric value outside its physical range.
    OutOfRange,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::OutOfDomain => write!(f, "out_of_domain"),
            Self::OutOfRange => write!(f, "out_of_range"),
        }
    }
}

/// One flagged cell.
#[derive(Debug, Clone, Serialize)]
pub struct QualityIssue {
    /// 0-based batch row.
    pub row: usize,
    pub field: String,
    pub kind: IssueKind,
    pub detail: String,
}

/// Physical-range rule for one numeric field.
#[derive(Debug, Clone, Copy)]
struct RangeRule {
    field: &'static str,
    min: f64,
    max: f64,
}

/// Declarative range table. Derived scores are checked too, as a guard on
/// the engine's own invariants.
const RANGE_RULES: &[RangeRule] = &[
    RangeRule { field: fields::AGE, min: 0.0, max: 120.0 },
    RangeRule { field: fields::INCOME_PER_MONTH, min: 0.0, max: f64::INFINITY },
    RangeRule { field: fields::FAMILY_MEMBERS_MALE, min: 0.0, max: 100.0 },
    RangeRule { field: fields::FAMILY_MEMBERS_FEMALE, min: 0.0, max: 100.0 },
    RangeRule { field: "total_family_members", min: 0.0, max: 200.0 },
    RangeRule { field: "knowledge_score", min: 0.0, max: 9.0 },
    RangeRule { field: "practice_score", min: 0.0, max: 7.0 },
    RangeRule { field: "total_score", min: 0.0, max: 16.0 },
];

/// Inspect one raw/scored record pair.
pub fn assess_record(
    raw: &RawRecord,
    scored: &ScoredRecord,
    key: &AnswerKey,
    schema: &Schema,
) -> Vec<QualityIssue> {
    let row = scored.row;
    let mut issues = Vec::new();

    // Missing demographics.
    for field in schema.demographic_fields() {
        if raw.is_missing(field) {
            issues.push(QualityIssue {
                row,
                field: field.to_string(),
                kind: IssueKind::Missing,
                detail: format!("missing value in '{field}'"),
            });
        }
    }

    // Question fields: missing, or outside the declared domain.
    for question in schema
        .knowledge_fields()
        .iter()
        .chain(schema.practice_fields().iter())
    {
        let value = raw.get(question);
        if value.is_missing() {
            issues.push(QualityIssue {
                row,
                field: question.to_string(),
                kind: IssueKind::Missing,
                detail: format!("missing response to '{question}'"),
            });
            continue;
        }
        let in_domain = value
            .as_code()
            .is_some_and(|code| key.is_valid_code(question, code));
        if !in_domain {
            issues.push(QualityIssue {
                row,
                field: question.to_string(),
                kind: IssueKind::OutOfDomain,
                detail: format!(
                    "response {:?} to '{question}' is outside the declared codes",
                    value.as_f64()
                ),
            });
        }
    }

    // Physical ranges, on raw demographics and derived fields alike.
    for rule in RANGE_RULES {
        let value = match rule.field {
            "total_family_members" => scored.total_family_members,
            "knowledge_score" => Some(scored.knowledge_score as f64),
            "practice_score" => Some(scored.practice_score as f64),
            "total_score" => Some(scored.total_score as f64),
            raw_field => raw.numeric(raw_field),
        };
        if let Some(v) = value {
            if v < rule.min || v > rule.max {
                issues.push(QualityIssue {
                    row,
                    field: rule.field.to_string(),
                    kind: IssueKind::OutOfRange,
                    detail: format!("value {v} outside [{}, {}]", rule.min, rule.max),
                });
            }
        }
    }

    // Degraded per-capita income from a zero denominator. The missing-data
    // paths are already covered by the missing-value entries above.
    if scored.per_capita_income.is_none()
        && raw.numeric(fields::INCOME_PER_MONTH).is_some()
        && scored.total_family_members == Some(0.0)
    {
        issues.push(QualityIssue {
            row,
            field: "per_capita_income".to_string(),
            kind: IssueKind::OutOfRange,
            detail: "family size is zero; per-capita income undefined".to_string(),
        });
    }

    issues
}

/// Roll-up of every flagged cell plus the overall quality ratio.
#[derive(Debug, Clone, Serialize)]
pub struct DataQualityReport {
    pub total_rows: usize,
    pub total_fields: usize,
    pub total_cells: usize,
    pub missing_count: usize,
    pub invalid_count: usize,
    /// Distinct (row, field) pairs with at least one issue, counted over
    /// the schema's input fields only. Derived-field findings appear in
    /// `issues` but not here.
    pub flagged_cells: usize,
    /// 1 − flagged_cells / total_cells, always in [0, 1].
    /// 1.0 for an empty batch.
    pub quality_ratio: f64,
    pub issues: Vec<QualityIssue>,
}

/// Assess a whole batch. Always computable, even when every statistical
/// test downstream is unavailable.
pub fn assess_all(
    records: &[RawRecord],
    scored: &[ScoredRecord],
    key: &AnswerKey,
    schema: &Schema,
) -> DataQualityReport {
    debug_assert_eq!(records.len(), scored.len());

    let mut issues = Vec::new();
    for (raw, sc) in records.iter().zip(scored.iter()) {
        issues.extend(assess_record(raw, sc, key, schema));
    }

    let missing_count = issues.iter().filter(|i| i.kind == IssueKind::Missing).count();
    let invalid_count = issues.len() - missing_count;

    // The ratio's denominator covers the schema's input cells, so only
    // issues on those fields count toward it. Derived-field entries
    // (family totals, score guards, per-capita) stay in `issues` but
    // cannot push the ratio below zero.
    let schema_fields: HashSet<&str> = schema.required_fields().into_iter().collect();
    let flagged: HashSet<(usize, &str)> = issues
        .iter()
        .filter(|i| schema_fields.contains(i.field.as_str()))
        .map(|i| (i.row, i.field.as_str()))
        .collect();
    let flagged_cells = flagged.len();

    let total_fields = schema.required_fields().len();
    let total_cells = records.len() * total_fields;
    let quality_ratio = if total_cells == 0 {
        1.0
    } else {
        1.0 - flagged_cells as f64 / total_cells as f64
    };

    if !issues.is_empty() {
        log::warn!(
            "{} quality issues across {} rows ({} missing, {} invalid)",
            issues.len(),
            records.len(),
            missing_count,
            invalid_count
        );
    }

    DataQualityReport {
        total_rows: records.len(),
        total_fields,
        total_cells,
        missing_count,
        invalid_count,
        flagged_cells,
        quality_ratio,
        issues,
    }
}
