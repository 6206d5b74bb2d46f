//! Split a renderer's main-thread markers by frame.
//!
//! Nothing is windowed here: every navigation start, DOMContentLoadedEnd
//! and meaningful-paint candidate that names a frame is kept, and later
//! stages decide which window it belongs to.

use crate::model::{EventKind, FrameId, Process, TraceEvent};
use log::debug;
use std::collections::BTreeMap;

/// Frame-keyed marker events of one renderer
#[derive(Debug, Clone, Default)]
pub struct FrameEvents<'a> {
    /// Ascending by start
    pub navigation_starts: BTreeMap<FrameId, Vec<&'a TraceEvent>>,

    /// Ascending by start
    pub dom_content_loaded_ends: BTreeMap<FrameId, Vec<&'a TraceEvent>>,

    /// Meaningful-paint candidates minus tooling-internal noise
    pub fmp_candidates: BTreeMap<FrameId, Vec<&'a TraceEvent>>,
}

impl<'a> FrameEvents<'a> {
    pub fn dom_content_loaded_ends_for(&self, frame: &FrameId) -> &[&'a TraceEvent] {
        self.dom_content_loaded_ends
            .get(frame)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn fmp_candidates_for(&self, frame: &FrameId) -> &[&'a TraceEvent] {
        self.fmp_candidates.get(frame).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Partition a renderer's navigation, DCL and FMP-candidate events by frame
pub fn partition_frame_events(renderer: &Process) -> FrameEvents<'_> {
    let navigation_starts = renderer.main_thread_events_by_frame(EventKind::NavigationStart);
    let dom_content_loaded_ends = renderer.main_thread_events_by_frame(EventKind::DomContentLoadedEnd);
    let fmp_candidates = collect_fmp_candidates(renderer);

    debug!(
        "Renderer {}: {} frames with navigations, {} with DCL, {} with FMP candidates",
        renderer.pid,
        navigation_starts.len(),
        dom_content_loaded_ends.len(),
        fmp_candidates.len()
    );

    FrameEvents {
        navigation_starts,
        dom_content_loaded_ends,
        fmp_candidates,
    }
}

fn collect_fmp_candidates(renderer: &Process) -> BTreeMap<FrameId, Vec<&TraceEvent>> {
    let Some(main_thread) = renderer.main_thread() else {
        return BTreeMap::new();
    };

    let mut candidates = renderer.main_thread_events_by_frame(EventKind::FirstMeaningfulPaintCandidate);
    for events in candidates.values_mut() {
        events.retain(|event| !main_thread.is_tooling_internal(event));
    }
    candidates.retain(|_, events| !events.is_empty());
    candidates
}
