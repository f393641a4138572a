//! Analysis run persistence.
//!
//! Each `analyze` invocation with an output directory writes a timestamped
//! run directory for offline inspection.
//!
//! # Storage Format
//!
//! Each run is a directory containing:
//! - `run.json` — metadata (id, timing, input, grouping field)
//! - `scored_records.csv` — per-respondent raw and derived fields
//! - `group_summaries.csv` — per-group means and standard deviations
//! - `correlation_matrix.csv` — pairwise coefficients, blank when undefined
//! - `quality_issues.csv` — every flagged cell
//! - `results.json` — the complete analysis report

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hygieia_core::{AnalysisReport, ScoredRecord, fields};

// ---------------------------------------------------------------------------
// Run metadata (run.json)
// ---------------------------------------------------------------------------

/// Run metadata written to run.json when the run finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub version: u32,
    pub id: String,
    pub started_at: String,
    pub ended_at: String,
    pub duration_ms: u64,
    pub input: String,
    pub group_field: String,
    pub rows: usize,
    pub hygieia_version: String,
}

// ---------------------------------------------------------------------------
// Run writer
// ---------------------------------------------------------------------------

/// Writes one analysis run directory.
pub struct RunWriter {
    run_dir: PathBuf,
    run_id: String,
    started_at: SystemTime,
    started_instant: Instant,
    input: String,
    group_field: String,
}

impl RunWriter {
    /// Create the run directory under `output_dir`, named
    /// `analysis-{timestamp}`.
    pub fn new(output_dir: &Path, input: &str, group_field: &str) -> std::io::Result<Self> {
        let started_at = SystemTime::now();
        let ts = started_at.duration_since(UNIX_EPOCH).unwrap_or_default();
        let run_dir = output_dir.join(format!("analysis-{}", format_iso8601_compact(ts)));
        fs::create_dir_all(&run_dir)?;

        Ok(Self {
            run_dir,
            run_id: Uuid::new_v4().to_string(),
            started_at,
            started_instant: Instant::now(),
            input: input.to_string(),
            group_field: group_field.to_string(),
        })
    }

    /// Write every artifact derived from the report.
    pub fn write_report(&self, report: &AnalysisReport) -> std::io::Result<()> {
        write_scored_csv(&self.run_dir.join("scored_records.csv"), &report.scored)?;
        self.write_group_summaries(report)?;
        self.write_correlation_matrix(report)?;
        self.write_quality_issues(report)?;

        let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
        fs::write(self.run_dir.join("results.json"), json)?;
        Ok(())
    }

    fn write_group_summaries(&self, report: &AnalysisReport) -> std::io::Result<()> {
        let file = File::create(self.run_dir.join("group_summaries.csv"))?;
        let mut w = BufWriter::new(file);
        writeln!(
            w,
            "group_field,key,n,mean_knowledge,std_knowledge,mean_practice,std_practice"
        )?;
        for s in &report.group_summaries {
            writeln!(
                w,
                "{},{},{},{:.4},{},{:.4},{}",
                report.group_field,
                s.key,
                s.n,
                s.mean_knowledge,
                fmt_opt(s.std_knowledge, 4),
                s.mean_practice,
                fmt_opt(s.std_practice, 4)
            )?;
        }
        w.flush()
    }

    fn write_correlation_matrix(&self, report: &AnalysisReport) -> std::io::Result<()> {
        let file = File::create(self.run_dir.join("correlation_matrix.csv"))?;
        let mut w = BufWriter::new(file);
        let matrix = &report.correlation;
        writeln!(w, "metric,{}", matrix.metrics.join(","))?;
        for (metric, row) in matrix.metrics.iter().zip(matrix.coefficients.iter()) {
            let cells: Vec<String> = row.iter().map(|r| fmt_opt(*r, 4)).collect();
            writeln!(w, "{},{}", metric, cells.join(","))?;
        }
        w.flush()
    }

    fn write_quality_issues(&self, report: &AnalysisReport) -> std::io::Result<()> {
        let file = File::create(self.run_dir.join("quality_issues.csv"))?;
        let mut w = BufWriter::new(file);
        writeln!(w, "row,field,kind,detail")?;
        for issue in &report.quality.issues {
            writeln!(
                w,
                "{},{},{},\"{}\"",
                issue.row,
                issue.field,
                issue.kind,
                issue.detail.replace('"', "\"\"")
            )?;
        }
        w.flush()
    }

    /// Finalize the run, writing run.json.
    pub fn finish(self, rows: usize) -> std::io::Result<PathBuf> {
        let ended_at = SystemTime::now();
        let meta = RunMeta {
            version: 1,
            id: self.run_id,
            started_at: format_iso8601(
                self.started_at.duration_since(UNIX_EPOCH).unwrap_or_default(),
            ),
            ended_at: format_iso8601(ended_at.duration_since(UNIX_EPOCH).unwrap_or_default()),
            duration_ms: self.started_instant.elapsed().as_millis() as u64,
            input: self.input,
            group_field: self.group_field,
            rows,
            hygieia_version: hygieia_core::VERSION.to_string(),
        };

        let json = serde_json::to_string_pretty(&meta).map_err(std::io::Error::other)?;
        fs::write(self.run_dir.join("run.json"), json)?;
        Ok(self.run_dir)
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }
}

/// Write scored records as CSV. Shared by the `score` command and RunWriter.
pub fn write_scored_csv(path: &Path, scored: &[ScoredRecord]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    writeln!(
        w,
        "row,{},total_family_members,per_capita_income,knowledge_score,practice_score,total_score",
        fields::DEMOGRAPHICS.join(",")
    )?;
    for record in scored {
        let demographics: Vec<String> = fields::DEMOGRAPHICS
            .iter()
            .map(|f| fmt_opt(record.raw.numeric(f), 2))
            .collect();
        writeln!(
            w,
            "{},{},{},{},{},{},{}",
            record.row,
            demographics.join(","),
            fmt_opt(record.total_family_members, 2),
            fmt_opt(record.per_capita_income, 2),
            record.knowledge_score,
            record.practice_score,
            record.total_score
        )?;
    }
    w.flush()
}

/// Missing values render as an empty cell.
fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) => format!("{v:.decimals$}"),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Timestamp helpers
// ---------------------------------------------------------------------------

/// Compact ISO-8601 for directory names. Example: `2026-02-15T013000Z`
fn format_iso8601_compact(since_epoch: Duration) -> String {
    let (year, month, day, hour, min, sec) = secs_to_utc(since_epoch.as_secs());
    format!("{year:04}-{month:02}-{day:02}T{hour:02}{min:02}{sec:02}Z")
}

/// Full ISO-8601. Example: `2026-02-15T01:30:00Z`
fn format_iso8601(since_epoch: Duration) -> String {
    let (year, month, day, hour, min, sec) = secs_to_utc(since_epoch.as_secs());
    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{min:02}:{sec:02}Z")
}

/// Seconds since Unix epoch to (year, month, day, hour, minute, second) UTC.
/// No leap second handling.
fn secs_to_utc(secs: u64) -> (u64, u64, u64, u64, u64, u64) {
    let sec = secs % 60;
    let min = (secs / 60) % 60;
    let hour = (secs / 3600) % 24;

    let mut days = secs / 86400;
    let mut year = 1970u64;
    loop {
        let days_in_year = if is_leap(year) { 366 } else { 365 };
        if days < days_in_year {
            break;
        }
        days -= days_in_year;
        year += 1;
    }

    let months_days: [u64; 12] = if is_leap(year) {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };

    let mut month = 0u64;
    for (i, &md) in months_days.iter().enumerate() {
        if days < md {
            month = i as u64 + 1;
            break;
        }
        days -= md;
    }

    (year, month, days + 1, hour, min, sec)
}

fn is_leap(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hygieia_core::{AnswerKey, RawRecord, Schema, analyze};

    fn small_report() -> AnalysisReport {
        let key = AnswerKey::survey();
        let schema = Schema::survey();
        let records: Vec<RawRecord> = (0..6)
            .map(|i| {
                RawRecord::new()
                    .with(fields::AGE, 13.0 + i as f64)
                    .with(fields::MATERNAL_EDUCATION, (i % 2 + 1) as f64)
                    .with(fields::INCOME_PER_MONTH, 15000.0)
                    .with(fields::FAMILY_MEMBERS_MALE, 2.0)
                    .with(fields::FAMILY_MEMBERS_FEMALE, 3.0)
                    .with(fields::K_RESPONSIBLE_ORGAN, 3.0)
                    .with(fields::P_WASHES_HANDS_WITH_SOAP, 1.0)
            })
            .collect();
        analyze(&records, &key, &schema, fields::MATERNAL_EDUCATION).unwrap()
    }

    #[test]
    fn test_run_writer_creates_all_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = RunWriter::new(tmp.path(), "survey.csv", fields::MATERNAL_EDUCATION).unwrap();
        let report = small_report();
        writer.write_report(&report).unwrap();

        let dir = writer.finish(report.scored.len()).unwrap();
        for artifact in [
            "run.json",
            "scored_records.csv",
            "group_summaries.csv",
            "correlation_matrix.csv",
            "quality_issues.csv",
            "results.json",
        ] {
            assert!(dir.join(artifact).exists(), "missing {artifact}");
        }
    }

    #[test]
    fn test_run_meta_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = RunWriter::new(tmp.path(), "survey.csv", "maternal_education").unwrap();
        let dir = writer.finish(42).unwrap();

        let meta: RunMeta =
            serde_json::from_str(&fs::read_to_string(dir.join("run.json")).unwrap()).unwrap();
        assert_eq!(meta.version, 1);
        assert_eq!(meta.rows, 42);
        assert_eq!(meta.input, "survey.csv");
        assert_eq!(meta.group_field, "maternal_education");
        assert!(meta.started_at.ends_with('Z'));
        assert!(!meta.id.is_empty());
    }

    #[test]
    fn test_scored_csv_shape() {
        let tmp = tempfile::tempdir().unwrap();
        let report = small_report();
        let path = tmp.path().join("scored.csv");
        write_scored_csv(&path, &report.scored).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + report.scored.len());
        assert!(lines[0].starts_with("row,age,"));
        assert!(lines[0].ends_with("knowledge_score,practice_score,total_score"));
        // Derived columns keep full 2-decimal precision: family size 5,
        // per-capita 15000 / 5.
        assert!(lines[1].contains("5.00"));
        assert!(lines[1].contains("3000.00"));
    }

    #[test]
    fn test_quality_issue_detail_is_quoted() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = RunWriter::new(tmp.path(), "s.csv", "maternal_education").unwrap();
        let report = small_report();
        writer.write_report(&report).unwrap();

        let text = fs::read_to_string(writer.run_dir().join("quality_issues.csv")).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "row,field,kind,detail");
        // Records above omit most questions, so issues must exist and every
        // detail column is quoted.
        let first = lines.next().unwrap();
        assert!(first.ends_with('"'));
    }

    #[test]
    fn test_format_iso8601_epoch() {
        assert_eq!(format_iso8601(Duration::from_secs(0)), "1970-01-01T00:00:00Z");
        assert_eq!(
            format_iso8601_compact(Duration::from_secs(0)),
            "1970-01-01T000000Z"
        );
    }

    #[test]
    fn test_secs_to_utc_known_date() {
        // 2000-01-01 00:00:00 UTC = 946684800
        assert_eq!(secs_to_utc(946684800), (2000, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_is_leap() {
        assert!(is_leap(2000));
        assert!(is_leap(2024));
        assert!(!is_leap(1900));
        assert!(!is_leap(2023));
    }
}
