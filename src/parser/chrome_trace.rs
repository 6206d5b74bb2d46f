//! Parser for Chrome Trace Event JSON.
//!
//! Parses a captured trace into the in-memory [`TraceModel`].
//! Handles both the object form (`{"traceEvents": [...]}`) and the bare
//! array form, and converts microsecond timestamps to milliseconds.

use super::schema::LoadReport;
use crate::loading::LoadExpectation;
use crate::model::{EventPhase, TraceEvent, TraceModel, TraceModelBuilder};
use crate::utils::config::{FRAME_LOADER_OBJECT_NAME, MICROS_PER_MILLI, SCHEMA_VERSION};
use crate::utils::error::ParseError;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One raw record from the `traceEvents` array
#[derive(Debug, Clone, Deserialize)]
pub struct RawTraceEvent {
    /// Comma-separated category list
    #[serde(default)]
    pub cat: String,

    #[serde(default)]
    pub name: String,

    /// Phase character (`X`, `B`, `E`, `I`, `b`, `e`, `O`, `M`, ...)
    pub ph: String,

    /// Start timestamp in microseconds
    #[serde(default)]
    pub ts: f64,

    /// Duration in microseconds (complete events only)
    #[serde(default)]
    pub dur: Option<f64>,

    #[serde(default)]
    pub pid: Value,

    #[serde(default)]
    pub tid: Value,

    #[serde(default)]
    pub id: Option<Value>,

    #[serde(default)]
    pub id2: Option<Value>,

    #[serde(default)]
    pub args: Value,
}

impl RawTraceEvent {
    fn start_ms(&self) -> f64 {
        self.ts / MICROS_PER_MILLI
    }

    fn duration_ms(&self) -> f64 {
        self.dur.unwrap_or(0.0) / MICROS_PER_MILLI
    }

    /// Event id from `id`, or the global/local scoped `id2`
    fn event_id(&self) -> Option<String> {
        if let Some(id) = self.id.as_ref().and_then(id_to_string) {
            return Some(id);
        }
        let id2 = self.id2.as_ref()?.as_object()?;
        id2.get("global")
            .or_else(|| id2.get("local"))
            .and_then(id_to_string)
    }

    fn args_object(&self) -> Option<&Map<String, Value>> {
        self.args.as_object()
    }

    fn to_event(&self, pid: u64, tid: u64, phase: EventPhase, duration: f64) -> TraceEvent {
        TraceEvent::new(pid, tid, &self.cat, &self.name, phase, self.start_ms(), duration)
            .with_args(self.args.clone())
    }
}

/// Parse a trace file from disk
///
/// **Public** - main entry point used by the analyze command
///
/// # Errors
/// * `ParseError::ReadFailed` - File cannot be opened
/// * `ParseError::JsonError` - File is not valid JSON
/// * `ParseError::InvalidFormat` - JSON is not a trace
pub fn parse_trace_file(path: impl AsRef<Path>) -> Result<TraceModel, ParseError> {
    let path = path.as_ref();
    info!("Reading trace from: {}", path.display());

    let file = File::open(path)?;
    let raw: Value = serde_json::from_reader(BufReader::new(file))?;
    parse_trace(&raw)
}

/// Parse raw trace JSON into a model
///
/// # Errors
/// * `ParseError::InvalidFormat` - Not an object/array, missing `traceEvents`,
///   or no event could be parsed
pub fn parse_trace(raw_trace: &Value) -> Result<TraceModel, ParseError> {
    let events = extract_trace_events(raw_trace)?;
    debug!("Trace holds {} raw events", events.len());

    let raw_events = parse_events_array(events)?;

    let mut builder = TraceModelBuilder::new();
    let mut ignored = 0usize;
    for raw in &raw_events {
        if !apply_event(&mut builder, raw) {
            ignored += 1;
        }
    }
    if ignored > 0 {
        debug!("Ignored {} events with unsupported phases or ids", ignored);
    }

    let model = builder.build();
    info!(
        "Parsed trace: {} processes, {} events, {:.3}ms..{:.3}ms",
        model.processes().count(),
        model.event_count(),
        model.min_timestamp(),
        model.max_timestamp()
    );
    Ok(model)
}

/// Locate the event array in either trace layout
///
/// **Private** - internal helper for parse_trace
fn extract_trace_events(raw_trace: &Value) -> Result<&[Value], ParseError> {
    match raw_trace {
        Value::Array(events) => Ok(events),
        Value::Object(obj) => match obj.get("traceEvents") {
            Some(Value::Array(events)) => Ok(events),
            Some(_) => Err(ParseError::InvalidFormat(
                "traceEvents must be an array".to_string(),
            )),
            None => Err(ParseError::InvalidFormat(
                "Trace object has no traceEvents field".to_string(),
            )),
        },
        _ => Err(ParseError::InvalidFormat(
            "Trace must be a JSON object or array".to_string(),
        )),
    }
}

/// Parse array of raw events
///
/// **Private** - internal parsing logic
fn parse_events_array(events: &[Value]) -> Result<Vec<RawTraceEvent>, ParseError> {
    let mut parsed = Vec::with_capacity(events.len());

    for (index, value) in events.iter().enumerate() {
        match RawTraceEvent::deserialize(value) {
            Ok(event) => parsed.push(event),
            Err(e) => {
                // Log but don't fail - some events may be malformed
                warn!("Failed to parse trace event {}: {}", index, e);
            }
        }
    }

    if parsed.is_empty() && !events.is_empty() {
        return Err(ParseError::InvalidFormat(
            "All trace events failed to parse".to_string(),
        ));
    }
    if events.is_empty() {
        warn!("Trace contains no events");
    }

    Ok(parsed)
}

/// Route one raw event into the builder. Returns false when it was ignored.
///
/// **Private** - internal helper for parse_trace
fn apply_event(builder: &mut TraceModelBuilder, raw: &RawTraceEvent) -> bool {
    let Some(pid) = parse_id_number(&raw.pid) else {
        warn!("Skipping '{}' event with unreadable pid {}", raw.name, raw.pid);
        return false;
    };
    let tid = parse_id_number(&raw.tid).unwrap_or(0);

    match raw.ph.as_str() {
        "M" => apply_metadata(builder, pid, tid, raw),
        "X" => builder.add_event(raw.to_event(pid, tid, EventPhase::Slice, raw.duration_ms())),
        "B" => builder.begin_slice(raw.to_event(pid, tid, EventPhase::Slice, 0.0)),
        "E" => builder.end_slice(pid, tid, raw.start_ms(), raw.args_object()),
        "I" | "i" | "R" | "n" => {
            builder.add_event(raw.to_event(pid, tid, EventPhase::Instant, 0.0))
        }
        "b" | "S" => {
            let Some(id) = raw.event_id() else {
                return false;
            };
            builder.begin_async(id, raw.to_event(pid, tid, EventPhase::Async, 0.0));
        }
        "e" | "F" => {
            let Some(id) = raw.event_id() else {
                return false;
            };
            builder.end_async(pid, &raw.cat, &id, &raw.name, raw.start_ms());
        }
        "N" | "O" | "D" if raw.name == FRAME_LOADER_OBJECT_NAME => {
            let Some(id) = raw.event_id() else {
                return false;
            };
            apply_frame_loader(builder, pid, &id, raw);
        }
        _ => return false,
    }
    true
}

/// **Private** - `M` events: process and thread names, process labels
fn apply_metadata(builder: &mut TraceModelBuilder, pid: u64, tid: u64, raw: &RawTraceEvent) {
    let args = raw.args_object();
    let text = |key: &str| args.and_then(|a| a.get(key)).and_then(Value::as_str);

    match (raw.name.as_str(), text("name"), text("labels")) {
        ("process_name", Some(name), _) => builder.set_process_name(pid, name),
        ("thread_name", Some(name), _) => builder.set_thread_name(pid, tid, name),
        ("process_labels", _, Some(labels)) => builder.add_process_labels(pid, labels),
        _ => {}
    }
}

/// **Private** - `N`/`O`/`D` events for `FrameLoader` objects
fn apply_frame_loader(builder: &mut TraceModelBuilder, pid: u64, id: &str, raw: &RawTraceEvent) {
    let ts = raw.start_ms();
    match raw.ph.as_str() {
        "N" => builder.create_frame_loader(pid, id, ts),
        "D" => builder.delete_frame_loader(pid, id, ts),
        _ => {
            let snapshot = raw
                .args_object()
                .and_then(|args| args.get("snapshot"))
                .and_then(Value::as_object);
            match snapshot {
                Some(snapshot) => builder.snapshot_frame_loader(pid, id, ts, snapshot),
                None => debug!("FrameLoader {} snapshot without payload at {:.3}ms", id, ts),
            }
        }
    }
}

/// Read a pid/tid given as a number, decimal string or hex string
pub fn parse_id_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => match s.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16).ok(),
            None => s.parse().ok(),
        },
        _ => None,
    }
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Convert engine output to the report format
///
/// **Public** - used by commands to create final output
pub fn to_report(trace_file: &str, trace_end: f64, expectations: &[LoadExpectation<'_>]) -> LoadReport {
    use chrono::Utc;

    LoadReport {
        version: SCHEMA_VERSION.to_string(),
        trace_file: trace_file.to_string(),
        trace_end,
        load_expectations: expectations.iter().map(LoadExpectation::to_record).collect(),
        generated_at: Utc::now().to_rfc3339(),
    }
}
