//! # hygieia-core
//!
//! Scoring and statistical-inference engine for hygiene cohort surveys.
//!
//! Turns raw, messy survey responses into validated per-subject metrics,
//! partitions subjects by a grouping attribute, and selects and runs the
//! statistically appropriate group-comparison test with an automatic
//! robustness fallback.
//!
//! ## Quick Start
//!
//! ```
//! use hygieia_core::{AnswerKey, RawRecord, Schema, analyze, fields};
//!
//! let key = AnswerKey::survey();
//! let schema = Schema::survey();
//!
//! let records = vec![
//!     RawRecord::new()
//!         .with(fields::MATERNAL_EDUCATION, 2.0)
//!         .with(fields::INCOME_PER_MONTH, 30000.0)
//!         .with(fields::FAMILY_MEMBERS_MALE, 4.0)
//!         .with(fields::FAMILY_MEMBERS_FEMALE, 3.0)
//!         .with(fields::K_RESPONSIBLE_ORGAN, 3.0),
//! ];
//!
//! let report = analyze(&records, &key, &schema, fields::MATERNAL_EDUCATION).unwrap();
//! assert_eq!(report.scored[0].per_capita_income, Some(4285.71));
//! assert_eq!(report.scored[0].knowledge_score, 1);
//! ```
//!
//! ## Architecture
//!
//! RawRecord → ScoreEngine → ScoredRecord → {QualityAssessor,
//! GroupAggregator, CorrelationEngine} → TestSelector
//!
//! Data flows strictly forward over one bounded in-memory batch. Scoring is
//! a pure per-record transform; everything downstream reads the frozen
//! scored set. Per-record data problems never abort a run (they degrade
//! into quality-report entries), and a statistical test that cannot be
//! supported by the data yields an explicit `Unavailable` result, never a
//! fabricated statistic.

pub mod analysis;
pub mod correlate;
pub mod describe;
pub mod error;
pub mod groups;
pub mod quality;
pub mod record;
pub mod rubric;
pub mod score;
pub mod selector;

pub use analysis::{AnalysisReport, analyze};
pub use correlate::{CorrelationMatrix, correlation_matrix, correlation_matrix_for};
pub use describe::{
    CATEGORICAL_FIELDS, ContinuousSummary, FrequencyRow, FrequencyTable, continuous_summaries,
    frequency_table,
};
pub use error::CoreError;
pub use groups::{GroupBucket, GroupSummary, GroupedScores, Metric, group_by};
pub use quality::{DataQualityReport, IssueKind, QualityIssue, assess_all, assess_record};
pub use record::{CONTINUOUS_METRICS, RawRecord, Schema, ScoredRecord, Value, fields};
pub use rubric::{AnswerKey, RubricEntry, ScoringRule};
pub use score::{score_all, score_record};
pub use selector::{PRECHECK_ALPHA, TestBranch, TestOutcome, TestResult, select_and_run};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
