use crate::output::read_report;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;
    let interactive = report
        .load_expectations
        .iter()
        .filter(|record| record.interactive.is_some())
        .count();

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Trace: {}", report.trace_file);
    println!("  Trace End: {:.3}ms", report.trace_end);
    println!("  Load Expectations: {}", report.load_expectations.len());
    println!("  Became Interactive: {}", interactive);

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Page Load Trace Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string             - Schema version (e.g., '1.0.0')");
        println!("  trace_file: string          - Analyzed trace path");
        println!("  trace_end: number           - Trace upper bound (ms)");
        println!("  load_expectations: array    - One entry per main-frame navigation");
        println!("    kind: string              - Load subtype ('successful')");
        println!("    renderer_pid: number      - Renderer process id");
        println!("    frame_id: string          - Frame identifier");
        println!("    url: string               - Navigated URL");
        println!("    start: number             - Navigation start (ms)");
        println!("    duration: number          - Until interactive, else until window end (ms)");
        println!("    navigation_start: object  - Source event (pid, tid, category, name, start)");
        println!("    first_meaningful_paint: object? - FMP event");
        println!("    dom_content_loaded_end: object? - DOMContentLoadedEnd event");
        println!("    first_cpu_idle: number?   - First CPU Idle (ms)");
        println!("    interactive: number?      - Time To Interactive (ms)");
        println!("  generated_at: string        - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Page Load Trace v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Page-load interactivity metrics from browser performance traces.");
}
