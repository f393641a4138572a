//! Structural errors. Per-record data problems never surface here; they
//! degrade to quality-report entries instead.

use std::fmt;

/// The only halting conditions of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The declared schema is missing entirely from the input.
    MissingSchema { missing: Vec<String> },
    /// The answer key's entry for a question is absent or inconsistent.
    MalformedKey { question: String },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSchema { missing } => {
                write!(f, "input is missing required fields: {}", missing.join(", "))
            }
            Self::MalformedKey { question } => {
                write!(f, "answer key entry for question '{question}' is missing or malformed")
            }
        }
    }
}

impl std::error::Error for CoreError {}
