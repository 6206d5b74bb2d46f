use crate::loading::DclSelection;
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Trace JSON to analyze
    pub trace: PathBuf,

    /// Output path for the JSON report
    pub output_json: PathBuf,

    /// Optional analysis configuration file (TOML)
    pub config: Option<PathBuf>,

    /// Overrides the config file's DCL selection policy
    pub dcl_selection: Option<DclSelection>,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            trace: PathBuf::new(),
            output_json: PathBuf::from("artifacts/load_report.json"),
            config: None,
            dcl_selection: None,
            print_summary: false,
        }
    }
}
