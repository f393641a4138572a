pub mod analyze;
pub mod quality;
pub mod score;

use std::path::Path;

use hygieia_core::{RawRecord, Schema};

use crate::loader;

/// Load a survey CSV or exit with a message. Structural problems (missing
/// file, header without the schema) are fatal; per-cell problems are not.
pub fn load_or_exit(path: &str, schema: &Schema) -> Vec<RawRecord> {
    match loader::load_csv(Path::new(path), schema) {
        Ok(batch) => {
            if batch.skipped_blank > 0 {
                eprintln!("Note: dropped {} blank row(s)", batch.skipped_blank);
            }
            if batch.unparsed_cells > 0 {
                eprintln!(
                    "Note: {} unparsed cell(s) treated as missing",
                    batch.unparsed_cells
                );
            }
            batch.records
        }
        Err(e) => {
            eprintln!("Error loading {path}: {e}");
            std::process::exit(1);
        }
    }
}
