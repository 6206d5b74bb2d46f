//! Configuration and constants for the CLI and the load metric engine.

use crate::loading::{DclSelection, QuietWindowConfig};
use crate::utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Minimum duration of a top-level main-thread task to count as long (ms)
pub const LONG_TASK_THRESHOLD_MS: f64 = 50.0;

/// Navigations to these URLs never produce a load expectation
pub const IGNORED_URLS: &[&str] = &["", "about:blank"];

// Category/name pairs recognized at ingestion
pub const USER_TIMING_CATEGORY: &str = "blink.user_timing";
pub const NAVIGATION_START_NAME: &str = "navigationStart";
pub const DOM_CONTENT_LOADED_END_NAME: &str = "domContentLoadedEventEnd";
pub const LOADING_CATEGORY: &str = "loading";
pub const FMP_CANDIDATE_NAME: &str = "firstMeaningfulPaintCandidate";
pub const SCHEDULER_TASK_CATEGORY: &str = "toplevel";
pub const NETWORK_CATEGORIES: &[&str] = &["netlog", "disabled-by-default-netlog"];

/// Object type name of legacy frame-loader snapshots
pub const FRAME_LOADER_OBJECT_NAME: &str = "FrameLoader";

/// Thread name of a renderer's main thread
pub const RENDERER_MAIN_THREAD_NAME: &str = "CrRendererMain";

/// Process labels marking the tracing tool's own UI renderer
pub const TRACING_UI_LABELS: &[&str] = &["chrome://tracing", "about:tracing"];

/// Slices whose name starts with this prefix wrap tooling-internal work
pub const TOOLING_INTERNAL_PREFIX: &str = "telemetry.internal.";

/// Trace timestamps are microseconds; the model works in milliseconds
pub const MICROS_PER_MILLI: f64 = 1000.0;

/// Tunable analysis settings, loadable from TOML.
///
/// ```toml
/// dcl_selection = "last"
///
/// [interactivity]
/// quiet_window_ms = 5000.0
/// allowed_concurrent_requests = 2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Which DOMContentLoadedEnd event wins when a window holds several
    #[serde(default)]
    pub dcl_selection: DclSelection,

    /// Parameters of the bundled quiet-window evaluator
    #[serde(default)]
    pub interactivity: QuietWindowConfig,
}

impl AnalysisConfig {
    /// Reject parameter combinations the evaluator cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let q = &self.interactivity;
        if q.quiet_window_ms.is_nan() || q.quiet_window_ms <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "interactivity.quiet_window_ms must be positive, got {}",
                q.quiet_window_ms
            )));
        }
        if q.cluster_separation_ms < 0.0 || q.heavy_cluster_ms < 0.0 {
            return Err(ConfigError::Invalid(
                "interactivity cluster parameters must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load analysis configuration from a TOML file
///
/// # Errors
/// * `ConfigError::Io` - If file cannot be read
/// * `ConfigError::Toml` - If TOML is invalid
/// * `ConfigError::Invalid` - If values are out of range
pub fn load_config(path: impl AsRef<Path>) -> Result<AnalysisConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: AnalysisConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.dcl_selection, DclSelection::Last);
        assert_eq!(config.interactivity.quiet_window_ms, 5000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "dcl_selection = \"first\"\n\n[interactivity]\nallowed_concurrent_requests = 0").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.dcl_selection, DclSelection::First);
        assert_eq!(config.interactivity.allowed_concurrent_requests, 0);
        assert_eq!(config.interactivity.heavy_cluster_ms, 250.0);
    }

    #[test]
    fn test_load_config_rejects_bad_window() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[interactivity]\nquiet_window_ms = 0.0").unwrap();

        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_config_bad_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "dcl_selection = ").unwrap();

        assert!(matches!(load_config(file.path()), Err(ConfigError::Toml(_))));
    }
}
