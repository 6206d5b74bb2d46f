//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Loads analysis configuration
//! 2. Parses the trace
//! 3. Computes load expectations per renderer
//! 4. Writes the JSON report
//! 5. Optionally prints a summary

use crate::commands::models::AnalyzeArgs;
use crate::loading::LoadExpectationEngine;
use crate::output::{render_summary, write_report};
use crate::parser::{parse_trace_file, to_report};
use crate::utils::config::{load_config, AnalysisConfig};
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Config file read/parse failures
/// * Trace parsing errors
/// * File write errors
///
/// # Example
/// ```ignore
/// let args = AnalyzeArgs {
///     trace: PathBuf::from("trace.json"),
///     print_summary: true,
///     ..Default::default()
/// };
///
/// execute_analyze(args)?;
/// ```
pub fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    let start_time = Instant::now();

    let config = resolve_config(&args)?;
    debug!("Analysis config: {:?}", config);

    info!("Parsing trace data...");
    let model = parse_trace_file(&args.trace)
        .with_context(|| format!("Failed to parse trace {}", args.trace.display()))?;

    info!("Computing load expectations...");
    let engine = LoadExpectationEngine::from_config(&config);
    let expectations = engine.collect(&model);

    let report = to_report(
        &args.trace.display().to_string(),
        model.max_timestamp(),
        &expectations,
    );

    write_report(&report, &args.output_json).context("Failed to write load report JSON")?;
    info!("✓ Report written to: {}", args.output_json.display());

    if args.print_summary {
        println!("{}", render_summary(&report));
    }

    info!(
        "Analysis completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Load the config file if given, then apply CLI overrides
///
/// **Private** - internal helper for execute_analyze
fn resolve_config(args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if let Some(selection) = args.dcl_selection {
        config.dcl_selection = selection;
    }
    Ok(config)
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.trace.as_os_str().is_empty() {
        anyhow::bail!("Trace path cannot be empty");
    }

    if !args.trace.is_file() {
        anyhow::bail!("Trace file not found: {}", args.trace.display());
    }

    if args.output_json.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if let Some(config) = &args.config {
        if !config.is_file() {
            anyhow::bail!("Config file not found: {}", config.display());
        }
    }

    Ok(())
}
