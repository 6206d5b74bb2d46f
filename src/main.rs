//! Page Load Trace CLI
//!
//! Computes page-load interactivity metrics from browser performance traces.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use page_load_trace::commands::{
    display_schema, display_version, execute_analyze, validate_args, validate_report_file,
    AnalyzeArgs,
};
use page_load_trace::loading::DclSelection;

/// Page Load Trace - interactivity metrics for page loads
#[derive(Parser, Debug)]
#[command(name = "page-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a trace and report load expectations
    Analyze {
        /// Trace JSON file (Chrome Trace Event format)
        #[arg(short, long)]
        trace: PathBuf,

        /// Output path for JSON report (placed in artifacts/ by default)
        #[arg(short, long, default_value = "artifacts/load_report.json")]
        output: PathBuf,

        /// Analysis configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Which DOMContentLoadedEnd wins when a navigation has several
        #[arg(long, value_enum)]
        dcl_selection: Option<DclSelection>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Analyze {
            trace,
            mut output,
            config,
            dcl_selection,
            summary,
        } => {
            // Ensure the report goes to artifacts/ if no directory is specified
            if output.parent().map(|p| p.as_os_str().is_empty()).unwrap_or(true) {
                output = PathBuf::from("artifacts").join(output);
            }

            let args = AnalyzeArgs {
                trace,
                output_json: output,
                config,
                dcl_selection,
                print_summary: summary,
            };

            validate_args(&args)?;
            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
