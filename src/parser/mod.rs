//! Trace parsing and schema definitions.
//!
//! This module handles:
//! - Parsing Chrome Trace Event JSON into the trace model
//! - Matching begin/end and async event pairs
//! - Defining the output report schema

pub mod chrome_trace;
pub mod schema;

// Re-export main types
pub use chrome_trace::{parse_trace, parse_trace_file, to_report, RawTraceEvent};
pub use schema::{EventRef, LoadExpectationRecord, LoadReport};
