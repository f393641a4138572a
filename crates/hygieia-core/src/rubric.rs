//! The answer key: a declarative table mapping each question to its scoring
//! rule. Rules are data, not branching code, so they can be audited and
//! tested independently of the scoring loop.
//!
//! Two rule kinds exist. `Exact` awards the point for one specific response
//! code. `AnyOf` awards it for any code in a declared accepted set, used
//! where the questionnaire scores documented behavior rather than a single
//! correct answer (e.g. which absorbent is used). A missing response always
//! earns 0 and is never an error.

use serde::Serialize;
use std::collections::HashMap;

use crate::error::CoreError;
use crate::record::fields;

/// How one question's response code maps to points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScoringRule {
    /// Exactly this code earns the point.
    Exact(i64),
    /// Any code in the set earns the point.
    AnyOf(Vec<i64>),
}

impl ScoringRule {
    /// Points earned by `code` under this rule.
    pub fn score(&self, code: i64) -> u32 {
        if self.accepts(code) { 1 } else { 0 }
    }

    /// Whether `code` earns the point.
    pub fn accepts(&self, code: i64) -> bool {
        match self {
            Self::Exact(expected) => code == *expected,
            Self::AnyOf(accepted) => accepted.contains(&code),
        }
    }
}

/// One rubric entry: the scoring rule plus the question's declared domain
/// of valid response codes.
#[derive(Debug, Clone, Serialize)]
pub struct RubricEntry {
    pub rule: ScoringRule,
    /// All codes the questionnaire declares for this question. Responses
    /// outside this set are treated as missing by the scorer and flagged
    /// by the quality assessor.
    pub valid_codes: Vec<i64>,
}

/// Immutable rubric for the whole questionnaire, loaded once per run.
#[derive(Debug, Clone)]
pub struct AnswerKey {
    entries: HashMap<&'static str, RubricEntry>,
    knowledge_questions: Vec<&'static str>,
    practice_questions: Vec<&'static str>,
}

impl AnswerKey {
    /// The authoritative survey rubric.
    ///
    /// Knowledge section (9 questions, max score 9) and practice section
    /// (7 questions, max score 7). Codes follow the questionnaire coding
    /// sheet; see each entry for the accepted answers.
    pub fn survey() -> Self {
        let mut entries = HashMap::new();

        // Knowledge section. One point per question.
        entries.insert(
            fields::K_MENARCHE_AGE_RANGE,
            RubricEntry {
                // 10-14 years
                rule: ScoringRule::Exact(2),
                valid_codes: vec![1, 2, 3],
            },
        );
        entries.insert(
            fields::K_MENSTRUATION_PERCEPTION,
            RubricEntry {
                // physiological process
                rule: ScoringRule::Exact(2),
                valid_codes: vec![1, 2, 3, 4],
            },
        );
        entries.insert(
            fields::K_RESPONSIBLE_ORGAN,
            RubricEntry {
                // uterus
                rule: ScoringRule::Exact(3),
                valid_codes: vec![1, 2, 3, 4],
            },
        );
        entries.insert(
            fields::K_BLEEDING_DURATION_RANGE,
            RubricEntry {
                // 3-7 days
                rule: ScoringRule::Exact(4),
                valid_codes: vec![1, 2, 3, 4],
            },
        );
        entries.insert(
            fields::K_CYCLE_LENGTH,
            RubricEntry {
                // 28 days
                rule: ScoringRule::Exact(3),
                valid_codes: vec![1, 2, 3, 4],
            },
        );
        entries.insert(
            fields::K_RECOMMENDED_ABSORBENT,
            RubricEntry {
                // awareness of any option counts
                rule: ScoringRule::AnyOf(vec![1, 2, 3, 4, 5]),
                valid_codes: vec![1, 2, 3, 4, 5],
            },
        );
        entries.insert(
            fields::K_CHANGE_FREQUENCY,
            RubricEntry {
                // awareness of the need to change counts
                rule: ScoringRule::AnyOf(vec![1, 2, 3, 4]),
                valid_codes: vec![1, 2, 3, 4],
            },
        );
        entries.insert(
            fields::K_DISPOSAL_METHOD,
            RubricEntry {
                // wrapped in paper
                rule: ScoringRule::Exact(1),
                valid_codes: vec![1, 2],
            },
        );
        entries.insert(
            fields::K_DISPOSAL_PLACE,
            RubricEntry {
                // dustbin
                rule: ScoringRule::Exact(2),
                valid_codes: vec![1, 2, 3],
            },
        );

        // Practice section. One point per question.
        entries.insert(
            fields::P_ABSORBENT_USED,
            RubricEntry {
                // any documented absorbent counts
                rule: ScoringRule::AnyOf(vec![1, 2, 3, 4, 5]),
                valid_codes: vec![1, 2, 3, 4, 5],
            },
        );
        entries.insert(
            fields::P_WRAPS_PAD_IN_PAPER,
            RubricEntry {
                rule: ScoringRule::Exact(1),
                valid_codes: vec![1, 2],
            },
        );
        entries.insert(
            fields::P_DISPOSAL_SITE,
            RubricEntry {
                // dustbin
                rule: ScoringRule::Exact(1),
                valid_codes: vec![1, 2, 3],
            },
        );
        entries.insert(
            fields::P_CHANGE_FREQUENCY,
            RubricEntry {
                rule: ScoringRule::AnyOf(vec![1, 2, 3, 4]),
                valid_codes: vec![1, 2, 3, 4],
            },
        );
        entries.insert(
            fields::P_BATHING_FREQUENCY,
            RubricEntry {
                // daily
                rule: ScoringRule::Exact(1),
                valid_codes: vec![1, 2, 3],
            },
        );
        entries.insert(
            fields::P_CLEANS_GENITALIA,
            RubricEntry {
                rule: ScoringRule::Exact(1),
                valid_codes: vec![1, 2],
            },
        );
        entries.insert(
            fields::P_WASHES_HANDS_WITH_SOAP,
            RubricEntry {
                rule: ScoringRule::Exact(1),
                valid_codes: vec![1, 2],
            },
        );

        Self {
            entries,
            knowledge_questions: fields::KNOWLEDGE_QUESTIONS.to_vec(),
            practice_questions: fields::PRACTICE_QUESTIONS.to_vec(),
        }
    }

    /// Questions contributing to the knowledge score, in questionnaire order.
    pub fn knowledge_questions(&self) -> &[&'static str] {
        &self.knowledge_questions
    }

    /// Questions contributing to the practice score, in questionnaire order.
    pub fn practice_questions(&self) -> &[&'static str] {
        &self.practice_questions
    }

    /// Look up the rubric entry for a question.
    pub fn entry_for(&self, question: &str) -> Option<&RubricEntry> {
        self.entries.get(question)
    }

    /// Look up just the scoring rule for a question.
    pub fn rule_for(&self, question: &str) -> Option<&ScoringRule> {
        self.entries.get(question).map(|e| &e.rule)
    }

    /// Points earned by `code` on `question`. Out-of-domain codes earn 0,
    /// identically to a missing response.
    pub fn score_response(&self, question: &str, code: i64) -> u32 {
        match self.entries.get(question) {
            Some(entry) if entry.valid_codes.contains(&code) => entry.rule.score(code),
            _ => 0,
        }
    }

    /// Whether `code` is in the question's declared response domain.
    pub fn is_valid_code(&self, question: &str, code: i64) -> bool {
        self.entries
            .get(question)
            .is_some_and(|e| e.valid_codes.contains(&code))
    }

    /// Structural check: every declared question must carry a rule whose
    /// accepted codes lie inside the declared domain.
    pub fn validate(&self) -> Result<(), CoreError> {
        for question in self
            .knowledge_questions
            .iter()
            .chain(self.practice_questions.iter())
        {
            let entry = self.entries.get(question).ok_or(CoreError::MalformedKey {
                question: question.to_string(),
            })?;
            let in_domain = match &entry.rule {
                ScoringRule::Exact(code) => entry.valid_codes.contains(code),
                ScoringRule::AnyOf(accepted) => {
                    accepted.iter().all(|c| entry.valid_codes.contains(c))
                }
            };
            if !in_domain {
                return Err(CoreError::MalformedKey {
                    question: question.to_string(),
                });
            }
        }
        Ok(())
    }
}
