//! Single-call batch analysis: the full forward pipeline over one bounded
//! in-memory batch.
//!
//! Raw records flow strictly forward: score engine → {quality assessor,
//! group aggregator, correlation engine} → test selector. The scored set is
//! frozen before any aggregation step; nothing downstream of the score
//! engine alters a score.

use serde::Serialize;

use crate::correlate::{CorrelationMatrix, correlation_matrix};
use crate::describe::{
    CATEGORICAL_FIELDS, ContinuousSummary, FrequencyTable, continuous_summaries, frequency_table,
};
use crate::error::CoreError;
use crate::groups::{GroupSummary, Metric, group_by};
use crate::quality::{DataQualityReport, assess_all};
use crate::record::{RawRecord, Schema};
use crate::rubric::AnswerKey;
use crate::score::score_all;
use crate::selector::{TestResult, select_and_run};

pub use crate::record::ScoredRecord;

/// Everything one batch analysis produces. Downstream consumers (report
/// text, CSV export) read these structures verbatim and must not re-derive
/// scores.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub group_field: String,
    pub scored: Vec<ScoredRecord>,
    pub group_summaries: Vec<GroupSummary>,
    /// Records excluded from grouping for a missing grouping value.
    pub excluded_missing_key: usize,
    /// One comparison result per metric of interest.
    pub test_results: Vec<TestResult>,
    pub correlation: CorrelationMatrix,
    pub quality: DataQualityReport,
    pub frequency_tables: Vec<FrequencyTable>,
    pub continuous: Vec<ContinuousSummary>,
}

/// Run the full pipeline over `records`, grouping by `group_field`.
///
/// The only error paths are structural: a malformed answer key. Per-record
/// problems degrade into the quality report instead.
pub fn analyze(
    records: &[RawRecord],
    key: &AnswerKey,
    schema: &Schema,
    group_field: &str,
) -> Result<AnalysisReport, CoreError> {
    key.validate()?;

    let scored = score_all(records, key);
    let quality = assess_all(records, &scored, key, schema);

    let grouped = group_by(&scored, group_field);
    let test_results: Vec<TestResult> = Metric::ALL
        .iter()
        .map(|&metric| select_and_run(&grouped, metric))
        .collect();

    let correlation = correlation_matrix(&scored);
    let frequency_tables = CATEGORICAL_FIELDS
        .iter()
        .map(|f| frequency_table(records, f))
        .collect();
    let continuous = continuous_summaries(&scored);

    log::info!(
        "analyzed {} records: {} groups by '{}', quality ratio {:.3}",
        records.len(),
        grouped.buckets.len(),
        group_field,
        quality.quality_ratio
    );

    Ok(AnalysisReport {
        group_field: group_field.to_string(),
        group_summaries: grouped.summaries(),
        excluded_missing_key: grouped.excluded_missing_key,
        scored,
        test_results,
        correlation,
        quality,
        frequency_tables,
        continuous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fields;
    use crate::selector::TestOutcome;

    /// Deterministic synthetic cohort: three education levels with
    /// different answer quality.
    fn cohort(n: usize) -> Vec<RawRecord> {
        let mut state = 0x5eed_u64;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as f64 / (1u64 << 31) as f64
        };
        (0..n)
            .map(|i| {
                let education = (i % 3 + 1) as f64;
                let mut raw = RawRecord::new()
                    .with(fields::AGE, 12.0 + (next() * 5.0).floor())
                    .with(fields::MATERNAL_EDUCATION, education)
                    .with(fields::PATERNAL_EDUCATION, ((i % 4) + 1) as f64)
                    .with(fields::MATERNAL_OCCUPATION, 1.0)
                    .with(fields::PATERNAL_OCCUPATION, 2.0)
                    .with(fields::INCOME_PER_MONTH, 8000.0 + next() * 20000.0)
                    .with(fields::FAMILY_MEMBERS_MALE, (next() * 4.0).floor() + 1.0)
                    .with(fields::FAMILY_MEMBERS_FEMALE, (next() * 4.0).floor() + 1.0);
                // Higher maternal education answers more items correctly.
                let p_correct = 0.3 + 0.2 * education;
                for (q, correct, wrong) in [
                    (fields::K_MENARCHE_AGE_RANGE, 2.0, 1.0),
                    (fields::K_MENSTRUATION_PERCEPTION, 2.0, 3.0),
                    (fields::K_RESPONSIBLE_ORGAN, 3.0, 1.0),
                    (fields::K_BLEEDING_DURATION_RANGE, 4.0, 2.0),
                    (fields::K_CYCLE_LENGTH, 3.0, 1.0),
                    (fields::K_DISPOSAL_METHOD, 1.0, 2.0),
                    (fields::K_DISPOSAL_PLACE, 2.0, 1.0),
                    (fields::P_WRAPS_PAD_IN_PAPER, 1.0, 2.0),
                    (fields::P_DISPOSAL_SITE, 1.0, 3.0),
                    (fields::P_BATHING_FREQUENCY, 1.0, 2.0),
                    (fields::P_CLEANS_GENITALIA, 1.0, 2.0),
                    (fields::P_WASHES_HANDS_WITH_SOAP, 1.0, 2.0),
                ] {
                    raw = raw.with(q, if next() < p_correct { correct } else { wrong });
                }
                raw.with(fields::K_RECOMMENDED_ABSORBENT, 3.0)
                    .with(fields::K_CHANGE_FREQUENCY, 2.0)
                    .with(fields::P_ABSORBENT_USED, 3.0)
                    .with(fields::P_CHANGE_FREQUENCY, 2.0)
            })
            .collect()
    }

    #[test]
    fn test_full_pipeline_coherence() {
        let key = AnswerKey::survey();
        let schema = Schema::survey();
        let records = cohort(120);
        let report = analyze(&records, &key, &schema, fields::MATERNAL_EDUCATION).unwrap();

        assert_eq!(report.scored.len(), 120);
        // Partition invariant.
        let grouped_total: usize = report.group_summaries.iter().map(|s| s.n).sum();
        assert_eq!(grouped_total + report.excluded_missing_key, 120);
        // One test result per metric, each with p in [0,1] or unavailable.
        assert_eq!(report.test_results.len(), 2);
        for result in &report.test_results {
            match &result.outcome {
                TestOutcome::Completed { p_value, .. } => {
                    assert!((0.0..=1.0).contains(p_value));
                }
                TestOutcome::Unavailable { reason } => assert!(!reason.is_empty()),
            }
        }
        // Quality ratio is always computable.
        assert!((0.0..=1.0).contains(&report.quality.quality_ratio));
        // Correlation matrix covers the declared metrics.
        assert_eq!(report.correlation.size(), 7);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let key = AnswerKey::survey();
        let schema = Schema::survey();
        let records = cohort(20);
        let report = analyze(&records, &key, &schema, fields::MATERNAL_EDUCATION).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"group_field\""));
        assert!(json.contains("\"quality_ratio\""));
    }

    #[test]
    fn test_empty_batch_still_coherent() {
        let key = AnswerKey::survey();
        let schema = Schema::survey();
        let report = analyze(&[], &key, &schema, fields::MATERNAL_EDUCATION).unwrap();
        assert!(report.scored.is_empty());
        assert_eq!(report.quality.quality_ratio, 1.0);
        for result in &report.test_results {
            assert!(matches!(result.outcome, TestOutcome::Unavailable { .. }));
        }
    }
}
