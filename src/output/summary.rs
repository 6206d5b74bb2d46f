//! Terminal summary of a load report.
//!
//! One table row per load expectation. Loads that never became
//! interactive inside their window are highlighted.

use crate::parser::schema::{LoadExpectationRecord, LoadReport};
use colored::*;

const URL_WIDTH: usize = 40;
const FRAME_WIDTH: usize = 12;

/// Render a human-readable summary of a report for the terminal
pub fn render_summary(report: &LoadReport) -> String {
    let mut lines = Vec::new();

    lines.push(String::new());
    lines.push(format!("  {}", "PAGE LOAD SUMMARY".bold()));
    lines.push(format!("  Trace: {}", report.trace_file));
    lines.push(format!(
        "  Loads: {}   Trace end: {}",
        report.load_expectations.len(),
        format_ms(Some(report.trace_end))
    ));
    lines.push(String::new());

    if report.load_expectations.is_empty() {
        lines.push("  No qualifying main-frame navigations found.".to_string());
        return lines.join("\n");
    }

    lines.push(format!(
        "  {:<8} {:<frame$} {:<width$} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "PID",
        "FRAME",
        "URL",
        "FMP",
        "DCL",
        "FCI",
        "TTI",
        "DURATION",
        frame = FRAME_WIDTH,
        width = URL_WIDTH
    ));
    lines.push(format!("  {}", "-".repeat(8 + FRAME_WIDTH + URL_WIDTH + 5 * 11 + 2)));

    for record in &report.load_expectations {
        lines.push(render_row(record));
    }

    let never_interactive = report
        .load_expectations
        .iter()
        .filter(|record| record.interactive.is_none())
        .count();
    if never_interactive > 0 {
        lines.push(String::new());
        lines.push(format!(
            "  {} load(s) never became interactive; their duration runs to the end of the window",
            never_interactive.to_string().yellow()
        ));
    }

    lines.join("\n")
}

fn render_row(record: &LoadExpectationRecord) -> String {
    // Marker times are shown relative to navigation start
    let relative = |ts: Option<f64>| format_ms(ts.map(|t| t - record.start));

    let row = format!(
        "  {:<8} {:<frame$} {:<width$} {:>10} {:>10} {:>10} {:>10} {:>10}",
        record.renderer_pid,
        truncate(&record.frame_id, FRAME_WIDTH),
        truncate(&record.url, URL_WIDTH),
        relative(record.first_meaningful_paint.as_ref().map(|e| e.start)),
        relative(record.dom_content_loaded_end.as_ref().map(|e| e.start)),
        relative(record.first_cpu_idle),
        relative(record.interactive),
        format_ms(Some(record.duration)),
        frame = FRAME_WIDTH,
        width = URL_WIDTH
    );

    if record.interactive.is_none() {
        row.yellow().to_string()
    } else {
        row
    }
}

fn format_ms(value: Option<f64>) -> String {
    match value {
        Some(ms) => format!("{:.1}ms", ms),
        None => "-".to_string(),
    }
}

/// Shorten long cells, keeping the beginning
fn truncate(url: &str, max_len: usize) -> String {
    if url.chars().count() <= max_len {
        return url.to_string();
    }
    let kept: String = url.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}
