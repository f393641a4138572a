//! Record model: the declared field schema, raw survey records, and the
//! scored records derived from them.
//!
//! Raw records come from an upstream loader and are never mutated here.
//! Scored records are created once by the score engine and are read-only
//! inputs to every downstream component.

use serde::Serialize;
use std::collections::HashMap;

use crate::error::CoreError;

/// Field name constants for the survey schema.
pub mod fields {
    // Demographics
    pub const AGE: &str = "age";
    pub const MATERNAL_EDUCATION: &str = "maternal_education";
    pub const PATERNAL_EDUCATION: &str = "paternal_education";
    pub const MATERNAL_OCCUPATION: &str = "maternal_occupation";
    pub const PATERNAL_OCCUPATION: &str = "paternal_occupation";
    pub const INCOME_PER_MONTH: &str = "income_per_month";
    pub const FAMILY_MEMBERS_MALE: &str = "family_members_male";
    pub const FAMILY_MEMBERS_FEMALE: &str = "family_members_female";

    // Knowledge section (9 questions)
    pub const K_MENARCHE_AGE_RANGE: &str = "menarche_age_range";
    pub const K_MENSTRUATION_PERCEPTION: &str = "menstruation_perception";
    pub const K_RESPONSIBLE_ORGAN: &str = "responsible_organ";
    pub const K_BLEEDING_DURATION_RANGE: &str = "bleeding_duration_range";
    pub const K_CYCLE_LENGTH: &str = "cycle_length";
    pub const K_RECOMMENDED_ABSORBENT: &str = "recommended_absorbent";
    pub const K_CHANGE_FREQUENCY: &str = "recommended_change_frequency";
    pub const K_DISPOSAL_METHOD: &str = "disposal_method";
    pub const K_DISPOSAL_PLACE: &str = "disposal_place";

    // Practice section (7 questions)
    pub const P_ABSORBENT_USED: &str = "absorbent_used";
    pub const P_WRAPS_PAD_IN_PAPER: &str = "wraps_pad_in_paper";
    pub const P_DISPOSAL_SITE: &str = "disposal_site";
    pub const P_CHANGE_FREQUENCY: &str = "change_frequency";
    pub const P_BATHING_FREQUENCY: &str = "bathing_frequency";
    pub const P_CLEANS_GENITALIA: &str = "cleans_genitalia";
    pub const P_WASHES_HANDS_WITH_SOAP: &str = "washes_hands_with_soap";

    pub const DEMOGRAPHICS: &[&str] = &[
        AGE,
        MATERNAL_EDUCATION,
        PATERNAL_EDUCATION,
        MATERNAL_OCCUPATION,
        PATERNAL_OCCUPATION,
        INCOME_PER_MONTH,
        FAMILY_MEMBERS_MALE,
        FAMILY_MEMBERS_FEMALE,
    ];

    pub const KNOWLEDGE_QUESTIONS: &[&str] = &[
        K_MENARCHE_AGE_RANGE,
        K_MENSTRUATION_PERCEPTION,
        K_RESPONSIBLE_ORGAN,
        K_BLEEDING_DURATION_RANGE,
        K_CYCLE_LENGTH,
        K_RECOMMENDED_ABSORBENT,
        K_CHANGE_FREQUENCY,
        K_DISPOSAL_METHOD,
        K_DISPOSAL_PLACE,
    ];

    pub const PRACTICE_QUESTIONS: &[&str] = &[
        P_ABSORBENT_USED,
        P_WRAPS_PAD_IN_PAPER,
        P_DISPOSAL_SITE,
        P_CHANGE_FREQUENCY,
        P_BATHING_FREQUENCY,
        P_CLEANS_GENITALIA,
        P_WASHES_HANDS_WITH_SOAP,
    ];
}

/// A single field value: a numeric response or the declared-missing sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// The value as an integer response code, if it is a whole number.
    pub fn as_code(&self) -> Option<i64> {
        match self.as_f64() {
            Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Some(v as i64),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            Self::Number(v)
        } else {
            Self::Missing
        }
    }
}

/// One raw survey response: field name → value. Absent fields read as missing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawRecord {
    values: HashMap<String, Value>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.values.insert(field.into(), value);
    }

    pub fn with(mut self, field: impl Into<String>, value: f64) -> Self {
        self.set(field, Value::Number(value));
        self
    }

    pub fn get(&self, field: &str) -> Value {
        self.values.get(field).copied().unwrap_or(Value::Missing)
    }

    pub fn numeric(&self, field: &str) -> Option<f64> {
        self.get(field).as_f64()
    }

    pub fn code(&self, field: &str) -> Option<i64> {
        self.get(field).as_code()
    }

    pub fn is_missing(&self, field: &str) -> bool {
        self.get(field).is_missing()
    }
}

/// The declared survey schema: required field names by role.
#[derive(Debug, Clone)]
pub struct Schema {
    demographic: Vec<&'static str>,
    knowledge: Vec<&'static str>,
    practice: Vec<&'static str>,
}

impl Schema {
    /// The full survey schema.
    pub fn survey() -> Self {
        Self {
            demographic: fields::DEMOGRAPHICS.to_vec(),
            knowledge: fields::KNOWLEDGE_QUESTIONS.to_vec(),
            practice: fields::PRACTICE_QUESTIONS.to_vec(),
        }
    }

    pub fn demographic_fields(&self) -> &[&'static str] {
        &self.demographic
    }

    pub fn knowledge_fields(&self) -> &[&'static str] {
        &self.knowledge
    }

    pub fn practice_fields(&self) -> &[&'static str] {
        &self.practice
    }

    /// All required raw-input fields.
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.demographic
            .iter()
            .chain(self.knowledge.iter())
            .chain(self.practice.iter())
            .copied()
            .collect()
    }

    /// Validate that `present` covers the declared schema. Input that does
    /// not carry the full schema cannot be scored at all.
    pub fn validate_fields<S: AsRef<str>>(&self, present: &[S]) -> Result<(), CoreError> {
        let missing: Vec<String> = self
            .required_fields()
            .iter()
            .filter(|f| !present.iter().any(|p| p.as_ref() == **f))
            .map(|f| f.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::MissingSchema { missing })
        }
    }
}

/// Continuous metrics considered by correlation and descriptive summaries.
pub const CONTINUOUS_METRICS: &[&str] = &[
    fields::AGE,
    fields::INCOME_PER_MONTH,
    "total_family_members",
    "per_capita_income",
    "knowledge_score",
    "practice_score",
    "total_score",
];

/// A raw record plus its derived fields. Created once by the score engine;
/// read-only everywhere downstream.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRecord {
    /// 0-based position in the input batch.
    pub row: usize,
    pub raw: RawRecord,
    /// Male + female counts; missing when either addend is missing.
    pub total_family_members: Option<f64>,
    /// Income / family size, 2 dp; null on missing or zero denominator.
    pub per_capita_income: Option<f64>,
    pub knowledge_score: u32,
    pub practice_score: u32,
    pub total_score: u32,
}

impl ScoredRecord {
    /// Read a continuous metric by name, `None` when unobserved.
    pub fn metric(&self, name: &str) -> Option<f64> {
        match name {
            "total_family_members" => self.total_family_members,
            "per_capita_income" => self.per_capita_income,
            "knowledge_score" => Some(self.knowledge_score as f64),
            "practice_score" => Some(self.practice_score as f64),
            "total_score" => Some(self.total_score as f64),
            other => self.raw.numeric(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_field_reads_missing() {
        let r = RawRecord::new();
        assert!(r.is_missing(fields::AGE));
        assert_eq!(r.numeric(fields::AGE), None);
    }

    #[test]
    fn test_code_requires_whole_number() {
        let r = RawRecord::new()
            .with("q", 3.0)
            .with("frac", 3.5);
        assert_eq!(r.code("q"), Some(3));
        assert_eq!(r.code("frac"), None);
    }

    #[test]
    fn test_non_finite_is_missing() {
        let v: Value = f64::NAN.into();
        assert!(v.is_missing());
    }

    #[test]
    fn test_schema_validation() {
        let schema = Schema::survey();
        let all: Vec<String> = schema
            .required_fields()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(schema.validate_fields(&all).is_ok());

        let mut some = all.clone();
        some.retain(|f| f != fields::AGE && f != fields::INCOME_PER_MONTH);
        match schema.validate_fields(&some) {
            Err(CoreError::MissingSchema { missing }) => {
                assert!(missing.contains(&fields::AGE.to_string()));
                assert!(missing.contains(&fields::INCOME_PER_MONTH.to_string()));
            }
            other => panic!("expected MissingSchema, got {other:?}"),
        }
    }

    #[test]
    fn test_required_field_count() {
        assert_eq!(Schema::survey().required_fields().len(), 8 + 9 + 7);
    }
}
