//! FMP/DCL resolution and load expectation assembly.

use super::evidence::RendererEvidence;
use super::interactivity::InteractivityEvaluator;
use super::navigation::NavigationWindow;
use crate::model::{FrameId, TraceEvent};
use crate::parser::schema::{EventRef, LoadExpectationRecord};
use serde::{Deserialize, Serialize};

/// Which DOMContentLoadedEnd wins when a window holds several.
///
/// Several DCL events per navigation do show up in real traces; taking the
/// last one is a heuristic, not a proven rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DclSelection {
    #[default]
    Last,
    First,
}

impl DclSelection {
    /// Pick from start-ordered candidates
    pub fn select<'a>(self, candidates: &[&'a TraceEvent]) -> Option<&'a TraceEvent> {
        match self {
            DclSelection::Last => candidates.last().copied(),
            DclSelection::First => candidates.first().copied(),
        }
    }
}

/// Load subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadExpectationKind {
    Successful,
}

impl LoadExpectationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadExpectationKind::Successful => "successful",
        }
    }
}

/// One navigation's load timeline and derived metrics
#[derive(Debug, Clone, PartialEq)]
pub struct LoadExpectation<'a> {
    pub kind: LoadExpectationKind,
    pub start: f64,
    pub duration: f64,
    pub navigation_start: &'a TraceEvent,
    pub fmp_event: Option<&'a TraceEvent>,
    pub dom_content_loaded_end_event: Option<&'a TraceEvent>,
    pub first_cpu_idle_time: Option<f64>,
    pub interactive_time: Option<f64>,
    pub url: String,
    pub frame_id: FrameId,
}

impl LoadExpectation<'_> {
    pub fn renderer_pid(&self) -> u64 {
        self.navigation_start.pid
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Owned, serializable form
    pub fn to_record(&self) -> LoadExpectationRecord {
        LoadExpectationRecord {
            kind: self.kind.as_str().to_string(),
            renderer_pid: self.renderer_pid(),
            frame_id: self.frame_id.to_string(),
            url: self.url.clone(),
            start: self.start,
            duration: self.duration,
            navigation_start: event_ref(self.navigation_start),
            first_meaningful_paint: self.fmp_event.map(event_ref),
            dom_content_loaded_end: self.dom_content_loaded_end_event.map(event_ref),
            first_cpu_idle: self.first_cpu_idle_time,
            interactive: self.interactive_time,
        }
    }
}

fn event_ref(event: &TraceEvent) -> EventRef {
    EventRef {
        pid: event.pid,
        tid: event.tid,
        category: event.category.clone(),
        name: event.name.clone(),
        start: event.start,
    }
}

/// Latest candidate at or before the window end, unless it predates the
/// navigation (a leftover from the previous load).
pub fn resolve_fmp<'a>(candidates: &[&'a TraceEvent], window: &NavigationWindow<'_>) -> Option<&'a TraceEvent> {
    let latest = candidates
        .iter()
        .copied()
        .filter(|candidate| candidate.start <= window.window_end)
        .max_by(|a, b| a.start.total_cmp(&b.start))?;

    (latest.start >= window.start()).then_some(latest)
}

/// DCL events inside `[navigation start, window end]`, narrowed by `selection`
pub fn resolve_dcl<'a>(
    dcl_events: &[&'a TraceEvent],
    window: &NavigationWindow<'_>,
    selection: DclSelection,
) -> Option<&'a TraceEvent> {
    let mut in_window: Vec<&'a TraceEvent> = dcl_events
        .iter()
        .copied()
        .filter(|event| event.start >= window.start() && event.start <= window.window_end)
        .collect();
    in_window.sort_by(|a, b| a.start.total_cmp(&b.start));
    selection.select(&in_window)
}

/// Combine a window, its markers and the evaluator's answers into one record
pub fn assemble_load_expectation<'a>(
    window: NavigationWindow<'a>,
    fmp_event: Option<&'a TraceEvent>,
    dom_content_loaded_end_event: Option<&'a TraceEvent>,
    evidence: &RendererEvidence<'a>,
    evaluator: &dyn InteractivityEvaluator,
) -> LoadExpectation<'a> {
    let start = window.start();
    let window_end = window.window_end;

    let (first_cpu_idle_time, interactive_time) = match (fmp_event, dom_content_loaded_end_event) {
        (Some(fmp), Some(dcl)) => {
            let long_tasks = evidence.long_tasks_between(fmp.start, window_end);
            let first_cpu_idle = evaluator.first_cpu_idle(fmp.start, window_end, dcl.start, &long_tasks);
            let network_events = evidence.network_events_between(start, window_end);
            let interactive = evaluator.interactive_time(
                fmp.start,
                window_end,
                dcl.start,
                &long_tasks,
                &network_events,
            );
            (first_cpu_idle, interactive)
        }
        _ => (None, None),
    };

    let duration = interactive_time.unwrap_or(window_end) - start;

    LoadExpectation {
        kind: LoadExpectationKind::Successful,
        start,
        duration,
        navigation_start: window.navigation_start,
        fmp_event,
        dom_content_loaded_end_event,
        first_cpu_idle_time,
        interactive_time,
        url: window.url,
        frame_id: window.frame_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventPhase;

    fn instant(name: &str, start: f64) -> TraceEvent {
        TraceEvent::new(1, 1, "loading", name, EventPhase::Instant, start, 0.0)
    }

    fn window(navigation_start: &TraceEvent, window_end: f64) -> NavigationWindow<'_> {
        NavigationWindow {
            frame_id: FrameId::new("F"),
            navigation_start,
            url: "https://example.com/".to_string(),
            window_end,
        }
    }

    #[test]
    fn test_fmp_picks_latest_before_end() {
        let nav = instant("navigationStart", 0.0);
        let candidates = [instant("fmp", 200.0), instant("fmp", 750.0), instant("fmp", 3500.0)];
        let refs: Vec<&TraceEvent> = candidates.iter().collect();

        let fmp = resolve_fmp(&refs, &window(&nav, 3000.0)).unwrap();
        assert_eq!(fmp.start, 750.0);
    }

    #[test]
    fn test_fmp_inclusive_at_window_end() {
        let nav = instant("navigationStart", 0.0);
        let at_end = instant("fmp", 3000.0);
        assert_eq!(resolve_fmp(&[&at_end], &window(&nav, 3000.0)).unwrap().start, 3000.0);
    }

    #[test]
    fn test_stale_fmp_rejected() {
        let nav = instant("navigationStart", 3000.0);
        let stale = instant("fmp", 2900.0);
        assert!(resolve_fmp(&[&stale], &window(&nav, 6000.0)).is_none());
    }

    #[test]
    fn test_dcl_selection_policies() {
        let nav = instant("navigationStart", 0.0);
        let dcls = [instant("dcl", 900.0), instant("dcl", 500.0), instant("dcl", 9000.0)];
        let refs: Vec<&TraceEvent> = dcls.iter().collect();
        let w = window(&nav, 5000.0);

        assert_eq!(resolve_dcl(&refs, &w, DclSelection::Last).unwrap().start, 900.0);
        assert_eq!(resolve_dcl(&refs, &w, DclSelection::First).unwrap().start, 500.0);
    }

    #[test]
    fn test_dcl_before_navigation_ignored() {
        let nav = instant("navigationStart", 1000.0);
        let early = instant("dcl", 999.0);
        assert!(resolve_dcl(&[&early], &window(&nav, 5000.0), DclSelection::Last).is_none());
    }
}
