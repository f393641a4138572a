//! CSV loader for survey batches.
//!
//! The input format is a plain comma-separated file: the first non-empty
//! line names the fields, every following line is one respondent. Cells
//! parse as numbers; anything else (including the common NA spellings)
//! reads as a missing value. Rows with no observed cell at all are dropped
//! before scoring.

use std::fmt;
use std::fs;
use std::path::Path;

use hygieia_core::{CoreError, RawRecord, Schema, Value};

/// Cell spellings treated as the missing sentinel (matched case-insensitively).
const MISSING_TOKENS: &[&str] = &["", "na", "n/a", "nan", "null", "none", "-", "."];

/// Loader failures. Anything past the header degrades into missing values
/// instead of an error.
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    /// No header line found.
    Empty,
    /// The header does not carry the declared schema.
    Schema(CoreError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "read failed: {e}"),
            Self::Empty => write!(f, "input has no header line"),
            Self::Schema(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Empty => None,
            Self::Schema(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// A parsed batch plus loader-level bookkeeping.
#[derive(Debug)]
pub struct LoadedBatch {
    pub records: Vec<RawRecord>,
    /// Rows dropped because every cell was missing.
    pub skipped_blank: usize,
    /// Cells that were neither numeric nor a recognized missing token.
    pub unparsed_cells: usize,
}

/// Load and parse a survey CSV file, validating its header against `schema`.
pub fn load_csv(path: &Path, schema: &Schema) -> Result<LoadedBatch, LoadError> {
    let text = fs::read_to_string(path)?;
    parse_csv(&text, schema)
}

/// Parse CSV text. Separated from I/O so tests can feed strings directly.
pub fn parse_csv(text: &str, schema: &Schema) -> Result<LoadedBatch, LoadError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header = lines.next().ok_or(LoadError::Empty)?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    schema.validate_fields(&columns).map_err(LoadError::Schema)?;

    let mut records = Vec::new();
    let mut skipped_blank = 0usize;
    let mut unparsed_cells = 0usize;

    for line in lines {
        let mut record = RawRecord::new();
        let mut observed = 0usize;

        // Cells beyond the header are ignored; short rows read as missing.
        for (column, cell) in columns.iter().zip(line.split(',')) {
            match parse_cell(cell) {
                Cell::Number(v) => {
                    record.set(*column, Value::Number(v));
                    observed += 1;
                }
                Cell::Missing => {}
                Cell::Unparsed => {
                    log::debug!("unparsed cell '{}' in column '{column}'", cell.trim());
                    unparsed_cells += 1;
                }
            }
        }

        if observed == 0 {
            skipped_blank += 1;
        } else {
            records.push(record);
        }
    }

    if skipped_blank > 0 || unparsed_cells > 0 {
        log::info!(
            "loaded {} records ({} blank rows dropped, {} unparsed cells)",
            records.len(),
            skipped_blank,
            unparsed_cells
        );
    }

    Ok(LoadedBatch {
        records,
        skipped_blank,
        unparsed_cells,
    })
}

enum Cell {
    Number(f64),
    Missing,
    Unparsed,
}

fn parse_cell(cell: &str) -> Cell {
    let cell = cell.trim();
    if MISSING_TOKENS.iter().any(|t| cell.eq_ignore_ascii_case(t)) {
        return Cell::Missing;
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Number(v),
        _ => Cell::Unparsed,
    }
}
