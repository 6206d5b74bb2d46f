//! Trace events and the kinds the load engine cares about.
//!
//! Category/name strings are mapped to an [`EventKind`] once, when the event
//! enters the model, so later passes compare discriminants instead of strings.

use crate::utils::config::{
    DOM_CONTENT_LOADED_END_NAME, FMP_CANDIDATE_NAME, LOADING_CATEGORY, NAVIGATION_START_NAME,
    NETWORK_CATEGORIES, SCHEDULER_TASK_CATEGORY, USER_TIMING_CATEGORY,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque frame identifier taken from an event's `frame` argument
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(String);

impl FrameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read a frame reference: either a plain string/number or `{"id_ref": ..}`
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            Value::Object(obj) => obj.get("id_ref").and_then(Self::from_value),
            _ => None,
        }
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an event was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    /// Synchronous slice on one thread (`X`, `B`/`E`)
    Slice,
    /// Zero-duration mark (`I`, `i`, `R`, `n`)
    Instant,
    /// Async slice that may outlive the task that started it (`b`/`e`, `S`/`F`)
    Async,
}

/// Discriminant extracted from category and name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NavigationStart,
    DomContentLoadedEnd,
    FirstMeaningfulPaintCandidate,
    SchedulerTask,
    Network,
    Other,
}

impl EventKind {
    pub fn classify(category: &str, name: &str, phase: EventPhase) -> Self {
        let in_category = |wanted: &str| category.split(',').any(|c| c.trim() == wanted);

        if in_category(USER_TIMING_CATEGORY) {
            if name == NAVIGATION_START_NAME {
                return EventKind::NavigationStart;
            }
            if name == DOM_CONTENT_LOADED_END_NAME {
                return EventKind::DomContentLoadedEnd;
            }
        }

        if in_category(LOADING_CATEGORY) && name == FMP_CANDIDATE_NAME {
            return EventKind::FirstMeaningfulPaintCandidate;
        }

        match phase {
            EventPhase::Async if NETWORK_CATEGORIES.iter().any(|c| in_category(c)) => {
                EventKind::Network
            }
            EventPhase::Slice if in_category(SCHEDULER_TASK_CATEGORY) => EventKind::SchedulerTask,
            _ => EventKind::Other,
        }
    }
}

/// One timed event. Times are trace-relative milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    pub pid: u64,
    pub tid: u64,
    pub category: String,
    pub name: String,
    pub start: f64,
    pub duration: f64,
    pub phase: EventPhase,
    pub kind: EventKind,
    pub args: Map<String, Value>,
    /// Async slice begun while an outer slice with the same id was still open
    pub nested: bool,
}

impl TraceEvent {
    /// Create an event, classifying it from its category and name
    pub fn new(
        pid: u64,
        tid: u64,
        category: impl Into<String>,
        name: impl Into<String>,
        phase: EventPhase,
        start: f64,
        duration: f64,
    ) -> Self {
        let category = category.into();
        let name = name.into();
        let kind = EventKind::classify(&category, &name, phase);
        Self {
            pid,
            tid,
            category,
            name,
            start,
            duration: duration.max(0.0),
            phase,
            kind,
            args: Map::new(),
            nested: false,
        }
    }

    /// Replace the argument map; non-object values are ignored
    pub fn with_args(mut self, args: Value) -> Self {
        if let Value::Object(map) = args {
            self.args = map;
        }
        self
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Frame this event belongs to, if it names one
    pub fn frame_id(&self) -> Option<FrameId> {
        self.args.get("frame").and_then(FrameId::from_value)
    }

    /// The nested `args.data` payload, if any
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.args.get("data").and_then(Value::as_object)
    }

    /// True when `[start, end]` and `[lo, hi]` share any instant
    pub fn intersects_inclusive(&self, lo: f64, hi: f64) -> bool {
        self.start <= hi && self.end() >= lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_markers() {
        assert_eq!(
            EventKind::classify("blink.user_timing", "navigationStart", EventPhase::Instant),
            EventKind::NavigationStart
        );
        assert_eq!(
            EventKind::classify("blink.user_timing,rail", "domContentLoadedEventEnd", EventPhase::Instant),
            EventKind::DomContentLoadedEnd
        );
        assert_eq!(
            EventKind::classify("loading", "firstMeaningfulPaintCandidate", EventPhase::Instant),
            EventKind::FirstMeaningfulPaintCandidate
        );
        assert_eq!(
            EventKind::classify("blink", "navigationStart", EventPhase::Instant),
            EventKind::Other
        );
    }

    #[test]
    fn test_classify_depends_on_phase() {
        assert_eq!(
            EventKind::classify("toplevel", "ThreadControllerImpl::RunTask", EventPhase::Slice),
            EventKind::SchedulerTask
        );
        assert_eq!(
            EventKind::classify("toplevel", "ThreadControllerImpl::RunTask", EventPhase::Async),
            EventKind::Other
        );
        assert_eq!(
            EventKind::classify("netlog", "URL_REQUEST", EventPhase::Async),
            EventKind::Network
        );
        assert_eq!(
            EventKind::classify("netlog", "URL_REQUEST", EventPhase::Slice),
            EventKind::Other
        );
    }

    #[test]
    fn test_frame_id_forms() {
        assert_eq!(FrameId::from_value(&json!("0xf1")), Some(FrameId::new("0xf1")));
        assert_eq!(FrameId::from_value(&json!(7)), Some(FrameId::new("7")));
        assert_eq!(
            FrameId::from_value(&json!({"id_ref": "0xf1"})),
            Some(FrameId::new("0xf1"))
        );
        assert_eq!(FrameId::from_value(&json!("")), None);
        assert_eq!(FrameId::from_value(&json!(null)), None);
    }

    #[test]
    fn test_intersects_inclusive_touching() {
        let event = TraceEvent::new(1, 1, "toplevel", "task", EventPhase::Slice, 100.0, 50.0);
        assert!(event.intersects_inclusive(150.0, 200.0));
        assert!(event.intersects_inclusive(0.0, 100.0));
        assert!(!event.intersects_inclusive(150.1, 200.0));
        assert!(!event.intersects_inclusive(0.0, 99.9));
    }
}
