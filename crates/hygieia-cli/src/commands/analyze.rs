//! `hygieia analyze` — the full pipeline: scoring, quality, grouping, test
//! selection, and correlations, with an optional persisted run directory.

use std::path::Path;

use hygieia_core::{AnswerKey, Schema, analyze, fields};

use crate::output::RunWriter;
use crate::report;

pub fn run(input: &str, group_by: &str, output: Option<&str>) {
    let schema = Schema::survey();
    if !fields::DEMOGRAPHICS.contains(&group_by) {
        eprintln!(
            "Error: '{group_by}' is not a demographic field. Choose one of: {}",
            fields::DEMOGRAPHICS.join(", ")
        );
        std::process::exit(1);
    }

    let records = super::load_or_exit(input, &schema);

    let key = AnswerKey::survey();
    let analysis = match analyze(&records, &key, &schema, group_by) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    print!("{}", report::render(&analysis));

    if let Some(dir) = output {
        let writer = match RunWriter::new(Path::new(dir), input, group_by) {
            Ok(w) => w,
            Err(e) => {
                eprintln!("Error creating run directory: {e}");
                std::process::exit(1);
            }
        };
        if let Err(e) = writer.write_report(&analysis) {
            eprintln!("Error writing run artifacts: {e}");
            std::process::exit(1);
        }
        match writer.finish(analysis.scored.len()) {
            Ok(run_dir) => println!("\nRun saved to: {}", run_dir.display()),
            Err(e) => {
                eprintln!("Error finalizing run: {e}");
                std::process::exit(1);
            }
        }
    }
}
