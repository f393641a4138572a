//! Plain-text report rendering for an analysis run.
//!
//! Consumes the finished report verbatim; no statistic is re-derived here.

use hygieia_core::{AnalysisReport, TestBranch, TestOutcome};

/// Significance threshold quoted in the rendered interpretation lines.
const ALPHA: f64 = 0.05;

/// Minimum |r| worth calling out in the correlation section.
const NOTABLE_R: f64 = 0.3;

/// Render the full report as Markdown-flavored text.
pub fn render(report: &AnalysisReport) -> String {
    let mut out = String::new();

    out.push_str("# Hygieia — Survey Analysis Report\n\n");
    out.push_str(&format!(
        "Records: {} | Grouped by: {} | Excluded (missing grouping value): {}\n\n",
        report.scored.len(),
        report.group_field,
        report.excluded_missing_key
    ));

    quality_section(&mut out, report);
    demographics_section(&mut out, report);
    continuous_section(&mut out, report);
    groups_section(&mut out, report);
    tests_section(&mut out, report);
    correlation_section(&mut out, report);

    out
}

fn quality_section(out: &mut String, report: &AnalysisReport) {
    let q = &report.quality;
    out.push_str("## Data Quality\n\n");
    out.push_str(&format!(
        "- Rows: {}\n- Cells: {}\n- Missing: {}\n- Invalid: {}\n- Flagged cells: {}\n- Quality ratio: {:.1}%\n\n",
        q.total_rows,
        q.total_cells,
        q.missing_count,
        q.invalid_count,
        q.flagged_cells,
        q.quality_ratio * 100.0
    ));
}

fn demographics_section(out: &mut String, report: &AnalysisReport) {
    out.push_str("## Demographics\n\n");
    for table in &report.frequency_tables {
        out.push_str(&format!("### {}\n\n", table.field));
        out.push_str("| Value | Count | % |\n|-------|-------|---|\n");
        for row in &table.rows {
            out.push_str(&format!(
                "| {} | {} | {:.2} |\n",
                row.value, row.count, row.percentage
            ));
        }
        if table.missing > 0 {
            out.push_str(&format!("\nMissing: {}\n", table.missing));
        }
        out.push('\n');
    }
}

fn continuous_section(out: &mut String, report: &AnalysisReport) {
    out.push_str("## Continuous Variables\n\n");
    out.push_str("| Variable | N | Mean | Median | SD | Min | Max |\n");
    out.push_str("|----------|---|------|--------|----|-----|-----|\n");
    for s in &report.continuous {
        out.push_str(&format!(
            "| {} | {} | {:.2} | {:.2} | {} | {:.2} | {:.2} |\n",
            s.variable,
            s.count,
            s.mean,
            s.median,
            fmt_opt(s.std),
            s.min,
            s.max
        ));
    }
    out.push('\n');
}

fn groups_section(out: &mut String, report: &AnalysisReport) {
    out.push_str(&format!("## Scores by {}\n\n", report.group_field));
    out.push_str("| Group | N | Knowledge (mean ± SD) | Practice (mean ± SD) |\n");
    out.push_str("|-------|---|-----------------------|----------------------|\n");
    for s in &report.group_summaries {
        out.push_str(&format!(
            "| {} | {} | {:.2} ± {} | {:.2} ± {} |\n",
            s.key,
            s.n,
            s.mean_knowledge,
            fmt_opt(s.std_knowledge),
            s.mean_practice,
            fmt_opt(s.std_practice)
        ));
    }
    out.push('\n');
}

fn tests_section(out: &mut String, report: &AnalysisReport) {
    out.push_str("## Group Comparison Tests\n\n");
    for result in &report.test_results {
        out.push_str(&format!("### {}\n\n", result.metric));
        match &result.outcome {
            TestOutcome::Completed {
                branch,
                test_name,
                statistic,
                p_value,
                rationale,
            } => {
                let branch_label = match branch {
                    TestBranch::Parametric => "parametric",
                    TestBranch::NonParametric => "non-parametric",
                };
                out.push_str(&format!(
                    "- Test: {test_name} ({branch_label})\n- Statistic: {statistic:.4}\n- p-value: {p_value:.4}\n- Selection: {rationale}\n"
                ));
                let verdict = if *p_value < ALPHA {
                    format!(
                        "Group means differ significantly (p = {p_value:.4} < {ALPHA})."
                    )
                } else {
                    format!(
                        "No significant difference between groups (p = {p_value:.4} >= {ALPHA})."
                    )
                };
                out.push_str(&format!("- Interpretation: {verdict}\n\n"));
            }
            TestOutcome::Unavailable { reason } => {
                out.push_str(&format!("- Not available: {reason}\n\n"));
            }
        }
    }
}

fn correlation_section(out: &mut String, report: &AnalysisReport) {
    let matrix = &report.correlation;
    out.push_str("## Correlations\n\n");

    out.push_str(&format!("| | {} |\n", matrix.metrics.join(" | ")));
    out.push_str(&format!("|--|{}\n", "--|".repeat(matrix.metrics.len())));
    for (metric, row) in matrix.metrics.iter().zip(matrix.coefficients.iter()) {
        let cells: Vec<String> = row.iter().map(|r| fmt_opt(*r)).collect();
        out.push_str(&format!("| {} | {} |\n", metric, cells.join(" | ")));
    }
    out.push('\n');

    let mut notable = Vec::new();
    for i in 0..matrix.metrics.len() {
        for j in (i + 1)..matrix.metrics.len() {
            if let Some(r) = matrix.coefficients[i][j] {
                if r.abs() >= NOTABLE_R {
                    notable.push((i, j, r));
                }
            }
        }
    }
    if notable.is_empty() {
        out.push_str("No notable pairwise correlations (|r| >= 0.3).\n");
    } else {
        notable.sort_by(|a, b| b.2.abs().partial_cmp(&a.2.abs()).unwrap_or(std::cmp::Ordering::Equal));
        out.push_str("Notable pairs:\n\n");
        for (i, j, r) in notable {
            out.push_str(&format!(
                "- {} vs {}: r = {:.3} ({} {})\n",
                matrix.metrics[i],
                matrix.metrics[j],
                r,
                strength(r),
                direction(r)
            ));
        }
    }
}

fn strength(r: f64) -> &'static str {
    if r.abs() >= 0.7 {
        "strong"
    } else if r.abs() >= 0.3 {
        "moderate"
    } else {
        "weak"
    }
}

fn direction(r: f64) -> &'static str {
    if r < 0.0 { "negative" } else { "positive" }
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    }
}
