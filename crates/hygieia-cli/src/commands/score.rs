//! `hygieia score` — score every respondent in a survey CSV.

use std::path::Path;

use hygieia_core::{AnswerKey, Schema, score_all};

use crate::output::write_scored_csv;

pub fn run(input: &str, output: Option<&str>) {
    let key = AnswerKey::survey();
    if let Err(e) = key.validate() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let schema = Schema::survey();
    let records = super::load_or_exit(input, &schema);
    let scored = score_all(&records, &key);

    println!(
        "{:>5} {:>10} {:>9} {:>6} {:>12}",
        "Row", "Knowledge", "Practice", "Total", "Per-capita"
    );
    for record in &scored {
        let per_capita = record
            .per_capita_income
            .map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        println!(
            "{:>5} {:>10} {:>9} {:>6} {:>12}",
            record.row,
            record.knowledge_score,
            record.practice_score,
            record.total_score,
            per_capita
        );
    }

    if !scored.is_empty() {
        let n = scored.len() as f64;
        let mean_k: f64 = scored.iter().map(|r| r.knowledge_score as f64).sum::<f64>() / n;
        let mean_p: f64 = scored.iter().map(|r| r.practice_score as f64).sum::<f64>() / n;
        println!("\n{} record(s). Mean knowledge {mean_k:.2}/9, mean practice {mean_p:.2}/7.", scored.len());
    } else {
        println!("\nNo records.");
    }

    if let Some(path) = output {
        if let Err(e) = write_scored_csv(Path::new(path), &scored) {
            eprintln!("Failed to write {path}: {e}");
            std::process::exit(1);
        }
        println!("Scored records saved to: {path}");
    }
}
