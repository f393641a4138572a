//! The score engine: a pure, deterministic transform from one raw record
//! (plus the answer key) to one scored record.
//!
//! Scoring never fails and never mutates its input. Per-record data
//! problems degrade: an out-of-domain or missing response contributes 0
//! points, and a missing or zero family-size denominator turns per-capita
//! income into null. The quality assessor, not this module, reports those
//! degradations.

use crate::record::{RawRecord, ScoredRecord, fields};
use crate::rubric::AnswerKey;

/// Round to 2 decimal places, half away from zero.
///
/// The rounding mode is a documented choice: the boundary cases differ
/// under round-half-to-even, and the original pipeline rounded half away
/// from zero at these magnitudes.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Score one raw record against the answer key.
///
/// Pure function of its two inputs: the same record always yields the same
/// scored record, so batches may be scored in any order or in parallel.
pub fn score_record(row: usize, raw: &RawRecord, key: &AnswerKey) -> ScoredRecord {
    // Family size: a missing addend must not silently act as zero, which
    // would understate family size, so the sum is missing instead.
    let male = raw.numeric(fields::FAMILY_MEMBERS_MALE);
    let female = raw.numeric(fields::FAMILY_MEMBERS_FEMALE);
    let total_family_members = match (male, female) {
        (Some(m), Some(f)) => Some(m + f),
        _ => None,
    };

    // Per-capita income: null on missing income, missing family size, or a
    // zero denominator. The division can never raise.
    let income = raw.numeric(fields::INCOME_PER_MONTH);
    let per_capita_income = match (income, total_family_members) {
        (Some(inc), Some(size)) if size != 0.0 => Some(round2(inc / size)),
        _ => None,
    };

    let knowledge_score = sum_section(raw, key, key.knowledge_questions());
    let practice_score = sum_section(raw, key, key.practice_questions());

    debug_assert!(knowledge_score <= 9);
    debug_assert!(practice_score <= 7);

    ScoredRecord {
        row,
        raw: raw.clone(),
        total_family_members,
        per_capita_income,
        knowledge_score,
        practice_score,
        total_score: knowledge_score + practice_score,
    }
}

/// Plain sum of per-question contributions; no weighting, no correction.
fn sum_section(raw: &RawRecord, key: &AnswerKey, questions: &[&'static str]) -> u32 {
    questions
        .iter()
        .map(|q| match raw.code(q) {
            Some(code) => key.score_response(q, code),
            None => 0,
        })
        .sum()
}

/// Score a whole batch, preserving input order. Row numbers are batch
/// positions.
pub fn score_all(records: &[RawRecord], key: &AnswerKey) -> Vec<ScoredRecord> {
    records
        .iter()
        .enumerate()
        .map(|(row, raw)| score_record(row, raw, key))
        .collect()
}
