//! `hygieia quality` — audit a survey CSV without running the full analysis.

use hygieia_core::{AnswerKey, Schema, assess_all, score_all};

pub fn run(input: &str, output: Option<&str>, limit: usize) {
    let key = AnswerKey::survey();
    if let Err(e) = key.validate() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let schema = Schema::survey();
    let records = super::load_or_exit(input, &schema);
    let scored = score_all(&records, &key);
    let report = assess_all(&records, &scored, &key, &schema);

    println!("Data quality");
    println!("  Rows:          {}", report.total_rows);
    println!("  Cells:         {}", report.total_cells);
    println!("  Missing:       {}", report.missing_count);
    println!("  Invalid:       {}", report.invalid_count);
    println!("  Flagged cells: {}", report.flagged_cells);
    println!("  Quality:       {:.1}%", report.quality_ratio * 100.0);

    if !report.issues.is_empty() {
        println!("\n{:>5} {:<28} {:<14} Detail", "Row", "Field", "Kind");
        for issue in report.issues.iter().take(limit) {
            println!(
                "{:>5} {:<28} {:<14} {}",
                issue.row, issue.field, issue.kind, issue.detail
            );
        }
        if report.issues.len() > limit {
            println!("  ... {} more (use --output for the full list)", report.issues.len() - limit);
        }
    }

    if let Some(path) = output {
        let json = match serde_json::to_string_pretty(&report) {
            Ok(j) => j,
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                std::process::exit(1);
            }
        };
        if let Err(e) = std::fs::write(path, json) {
            eprintln!("Failed to write {path}: {e}");
            std::process::exit(1);
        }
        println!("\nQuality report saved to: {path}");
    }
}
