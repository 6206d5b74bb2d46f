use page_load_trace::commands::{execute_analyze, validate_args, validate_report_file, AnalyzeArgs};
use page_load_trace::loading::DclSelection;
use page_load_trace::output::read_report;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_trace(dir: &Path) -> PathBuf {
    let trace = json!({
        "traceEvents": [
            {"ph": "M", "name": "thread_name", "pid": 5, "tid": 1, "args": {"name": "CrRendererMain"}},
            {"ph": "R", "cat": "blink.user_timing", "name": "navigationStart", "ts": 0, "pid": 5, "tid": 1,
             "args": {"frame": "F", "data": {"documentLoaderURL": "https://example.com/", "isLoadingMainFrame": true}}},
            {"ph": "R", "cat": "loading", "name": "firstMeaningfulPaintCandidate", "ts": 400000, "pid": 5, "tid": 1,
             "args": {"frame": "F"}},
            {"ph": "R", "cat": "blink.user_timing", "name": "domContentLoadedEventEnd", "ts": 300000, "pid": 5, "tid": 1,
             "args": {"frame": "F"}},
            {"ph": "R", "cat": "blink.user_timing", "name": "domContentLoadedEventEnd", "ts": 600000, "pid": 5, "tid": 1,
             "args": {"frame": "F"}},
            {"ph": "I", "cat": "devtools.timeline", "name": "TracingEnd", "ts": 10000000, "pid": 5, "tid": 1}
        ]
    });
    let path = dir.join("trace.json");
    std::fs::write(&path, trace.to_string()).unwrap();
    path
}

#[test]
fn test_validate_args_requires_existing_trace() {
    let dir = tempdir().unwrap();

    let missing = AnalyzeArgs {
        trace: dir.path().join("missing.json"),
        ..Default::default()
    };
    assert!(validate_args(&missing).is_err());

    let empty = AnalyzeArgs::default();
    assert!(validate_args(&empty).is_err());

    let ok = AnalyzeArgs {
        trace: write_trace(dir.path()),
        ..Default::default()
    };
    assert!(validate_args(&ok).is_ok());
}

#[test]
fn test_validate_args_checks_config_and_output() {
    let dir = tempdir().unwrap();
    let trace = write_trace(dir.path());

    let no_config = AnalyzeArgs {
        trace: trace.clone(),
        config: Some(dir.path().join("absent.toml")),
        ..Default::default()
    };
    assert!(validate_args(&no_config).is_err());

    let no_output = AnalyzeArgs {
        trace,
        output_json: PathBuf::new(),
        ..Default::default()
    };
    assert!(validate_args(&no_output).is_err());
}

#[test]
fn test_analyze_writes_report() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out").join("report.json");
    let args = AnalyzeArgs {
        trace: write_trace(dir.path()),
        output_json: output.clone(),
        ..Default::default()
    };

    execute_analyze(args).unwrap();

    let report = read_report(&output).unwrap();
    assert_eq!(report.trace_end, 10_000.0);
    assert_eq!(report.load_expectations.len(), 1);

    let record = &report.load_expectations[0];
    assert_eq!(record.url, "https://example.com/");
    assert_eq!(record.frame_id, "F");
    assert_eq!(record.dom_content_loaded_end.as_ref().map(|e| e.start), Some(600.0));
    // Quiet from FMP onwards: interactive as soon as DCL has fired
    assert_eq!(record.interactive, Some(600.0));
    assert_eq!(record.first_cpu_idle, Some(600.0));
    assert_eq!(record.duration, 600.0);

    validate_report_file(output).unwrap();
}

#[test]
fn test_analyze_applies_config_and_override() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("analysis.toml");
    std::fs::write(
        &config,
        "dcl_selection = \"first\"\n\n[interactivity]\nquiet_window_ms = 20000.0\n",
    )
    .unwrap();

    let output = dir.path().join("report.json");
    let args = AnalyzeArgs {
        trace: write_trace(dir.path()),
        output_json: output.clone(),
        config: Some(config.clone()),
        ..Default::default()
    };
    execute_analyze(args.clone()).unwrap();

    let record = read_report(&output).unwrap().load_expectations.remove(0);
    assert_eq!(record.dom_content_loaded_end.map(|e| e.start), Some(300.0));
    // A 20s quiet window cannot fit before the 10s trace end
    assert_eq!(record.interactive, None);
    assert_eq!(record.duration, 10_000.0);

    let overridden = AnalyzeArgs {
        dcl_selection: Some(DclSelection::Last),
        ..args
    };
    execute_analyze(overridden).unwrap();
    let record = read_report(&output).unwrap().load_expectations.remove(0);
    assert_eq!(record.dom_content_loaded_end.map(|e| e.start), Some(600.0));
}

#[test]
fn test_analyze_rejects_invalid_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("analysis.toml");
    std::fs::write(&config, "[interactivity]\nquiet_window_ms = -1.0\n").unwrap();

    let args = AnalyzeArgs {
        trace: write_trace(dir.path()),
        output_json: dir.path().join("report.json"),
        config: Some(config),
        ..Default::default()
    };
    assert!(execute_analyze(args).is_err());
}
