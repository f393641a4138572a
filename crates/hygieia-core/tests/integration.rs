//! Integration tests for hygieia-core.
//!
//! These tests run the full pipeline over small hand-built cohorts:
//! scoring → quality → grouping → test selection → correlation.

use hygieia_core::{
    AnswerKey, Metric, RawRecord, Schema, TestOutcome, analyze, correlation_matrix, fields,
    group_by, score_all, select_and_run,
};

/// A respondent answering every question with a correct code.
fn fully_correct() -> RawRecord {
    RawRecord::new()
        .with(fields::AGE, 14.0)
        .with(fields::MATERNAL_EDUCATION, 3.0)
        .with(fields::PATERNAL_EDUCATION, 3.0)
        .with(fields::MATERNAL_OCCUPATION, 1.0)
        .with(fields::PATERNAL_OCCUPATION, 2.0)
        .with(fields::INCOME_PER_MONTH, 30000.0)
        .with(fields::FAMILY_MEMBERS_MALE, 3.0)
        .with(fields::FAMILY_MEMBERS_FEMALE, 4.0)
        .with(fields::K_MENARCHE_AGE_RANGE, 2.0)
        .with(fields::K_MENSTRUATION_PERCEPTION, 2.0)
        .with(fields::K_RESPONSIBLE_ORGAN, 3.0)
        .with(fields::K_BLEEDING_DURATION_RANGE, 4.0)
        .with(fields::K_CYCLE_LENGTH, 3.0)
        .with(fields::K_RECOMMENDED_ABSORBENT, 1.0)
        .with(fields::K_CHANGE_FREQUENCY, 2.0)
        .with(fields::K_DISPOSAL_METHOD, 1.0)
        .with(fields::K_DISPOSAL_PLACE, 2.0)
        .with(fields::P_ABSORBENT_USED, 2.0)
        .with(fields::P_WRAPS_PAD_IN_PAPER, 1.0)
        .with(fields::P_DISPOSAL_SITE, 1.0)
        .with(fields::P_CHANGE_FREQUENCY, 3.0)
        .with(fields::P_BATHING_FREQUENCY, 1.0)
        .with(fields::P_CLEANS_GENITALIA, 1.0)
        .with(fields::P_WASHES_HANDS_WITH_SOAP, 1.0)
}

#[test]
fn fully_correct_respondent_scores_maximum() {
    let key = AnswerKey::survey();
    let scored = score_all(&[fully_correct()], &key);
    assert_eq!(scored[0].knowledge_score, 9);
    assert_eq!(scored[0].practice_score, 7);
    assert_eq!(scored[0].total_score, 16);
}

#[test]
fn per_capita_income_derives_from_family_size() {
    let key = AnswerKey::survey();
    let scored = score_all(&[fully_correct()], &key);
    assert_eq!(scored[0].total_family_members, Some(7.0));
    // 30000 / 7 = 4285.714..., rounded to 2 decimal places.
    assert_eq!(scored[0].per_capita_income, Some(4285.71));
}

#[test]
fn missing_family_count_nullifies_derived_fields() {
    let key = AnswerKey::survey();
    let mut record = fully_correct();
    record.set(fields::FAMILY_MEMBERS_MALE, hygieia_core::Value::Missing);
    let scored = score_all(&[record], &key);
    assert_eq!(scored[0].total_family_members, None);
    assert_eq!(scored[0].per_capita_income, None);
    // Scores are unaffected by demographic gaps.
    assert_eq!(scored[0].total_score, 16);
}

#[test]
fn single_group_yields_unavailable_tests() {
    let key = AnswerKey::survey();
    // Everyone shares one education level: nothing to compare.
    let records: Vec<RawRecord> = (0..10).map(|_| fully_correct()).collect();
    let scored = score_all(&records, &key);
    let grouped = group_by(&scored, fields::MATERNAL_EDUCATION);
    for metric in Metric::ALL {
        let result = select_and_run(&grouped, metric);
        assert!(matches!(result.outcome, TestOutcome::Unavailable { .. }));
    }
}

#[test]
fn identical_scores_never_fabricate_a_statistic() {
    let key = AnswerKey::survey();
    // Two education levels, but every respondent scores identically.
    let records: Vec<RawRecord> = (0..12)
        .map(|i| fully_correct().with(fields::MATERNAL_EDUCATION, (i % 2 + 1) as f64))
        .collect();
    let scored = score_all(&records, &key);
    let grouped = group_by(&scored, fields::MATERNAL_EDUCATION);
    for metric in Metric::ALL {
        let result = select_and_run(&grouped, metric);
        match result.outcome {
            TestOutcome::Unavailable { ref reason } => assert!(!reason.is_empty()),
            TestOutcome::Completed { .. } => panic!("zero-variance data completed a test"),
        }
    }
}

#[test]
fn age_correlates_with_knowledge_when_built_that_way() {
    let key = AnswerKey::survey();
    // Older respondents answer strictly more knowledge items correctly.
    let records: Vec<RawRecord> = (0..20)
        .map(|i| {
            let mut record = fully_correct().with(fields::AGE, 10.0 + i as f64);
            let correct_items = [
                fields::K_MENARCHE_AGE_RANGE,
                fields::K_MENSTRUATION_PERCEPTION,
                fields::K_RESPONSIBLE_ORGAN,
                fields::K_BLEEDING_DURATION_RANGE,
                fields::K_CYCLE_LENGTH,
            ];
            // Younger respondents get more of these items wrong.
            for item in correct_items.iter().take(5 - (i / 4).min(5)) {
                record = record.with(*item, 9.0);
            }
            record
        })
        .collect();
    let scored = score_all(&records, &key);
    let matrix = correlation_matrix(&scored);
    let r = matrix.get(fields::AGE, "knowledge_score").unwrap();
    assert!(r > 0.5, "expected positive association, got {r}");
    // Symmetry and unit diagonal.
    assert_eq!(matrix.get("knowledge_score", fields::AGE), Some(r));
    assert_eq!(matrix.get(fields::AGE, fields::AGE), Some(1.0));
}

#[test]
fn pipeline_partition_and_quality_invariants() {
    let key = AnswerKey::survey();
    let schema = Schema::survey();
    let mut records: Vec<RawRecord> = (0..30)
        .map(|i| {
            fully_correct()
                .with(fields::MATERNAL_EDUCATION, (i % 3 + 1) as f64)
                .with(fields::K_RESPONSIBLE_ORGAN, if i % 2 == 0 { 3.0 } else { 1.0 })
                .with(fields::P_BATHING_FREQUENCY, if i % 3 == 0 { 1.0 } else { 2.0 })
        })
        .collect();
    // One record with a missing grouping value.
    let mut stray = fully_correct();
    stray.set(fields::MATERNAL_EDUCATION, hygieia_core::Value::Missing);
    records.push(stray);

    let report = analyze(&records, &key, &schema, fields::MATERNAL_EDUCATION).unwrap();

    assert_eq!(report.scored.len(), 31);
    assert_eq!(report.excluded_missing_key, 1);
    let grouped_total: usize = report.group_summaries.iter().map(|s| s.n).sum();
    assert_eq!(grouped_total, 30);

    // The missing grouping cell is also a quality finding.
    assert!(report.quality.missing_count >= 1);
    assert!((0.0..=1.0).contains(&report.quality.quality_ratio));

    // Every completed test carries a bounded p-value and a rationale.
    for result in &report.test_results {
        if let TestOutcome::Completed {
            p_value, rationale, ..
        } = &result.outcome
        {
            assert!((0.0..=1.0).contains(p_value));
            assert!(!rationale.is_empty());
        }
    }
}
