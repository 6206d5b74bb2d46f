//! Output JSON schema definitions for load reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Trace file that was analyzed
    pub trace_file: String,

    /// Upper time bound of the trace (ms)
    pub trace_end: f64,

    /// One record per qualifying navigation
    pub load_expectations: Vec<LoadExpectationRecord>,

    /// Timestamp when report was generated
    pub generated_at: String,
}

/// Serialized form of one load expectation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadExpectationRecord {
    /// Load subtype, currently always "successful"
    pub kind: String,

    /// Renderer process the navigation happened in
    pub renderer_pid: u64,

    pub frame_id: String,

    pub url: String,

    /// Navigation start (ms)
    pub start: f64,

    /// Time to interactive, or to the end of the window when never interactive (ms)
    pub duration: f64,

    pub navigation_start: EventRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_meaningful_paint: Option<EventRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dom_content_loaded_end: Option<EventRef>,

    /// First CPU Idle timestamp (ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_cpu_idle: Option<f64>,

    /// Time To Interactive timestamp (ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<f64>,
}

/// Pointer back into the source trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRef {
    pub pid: u64,
    pub tid: u64,
    pub category: String,
    pub name: String,
    pub start: f64,
}
