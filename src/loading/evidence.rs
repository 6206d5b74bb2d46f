//! Long-task and network evidence for interactivity evaluation.
//!
//! Both lists are gathered once per renderer and then sliced per window.
//! All range tests are inclusive on both ends: an event that merely
//! touches a boundary still counts.

use crate::model::{EventKind, Process, TraceEvent};
use crate::utils::config::LONG_TASK_THRESHOLD_MS;
use log::debug;

/// Per-renderer evidence pools
#[derive(Debug, Clone, Default)]
pub struct RendererEvidence<'a> {
    long_tasks: Vec<&'a TraceEvent>,
    network_events: Vec<&'a TraceEvent>,
}

impl<'a> RendererEvidence<'a> {
    /// Gather top-level long tasks from the main thread and network events
    /// from every thread of the renderer
    pub fn collect(renderer: &'a Process) -> Self {
        let long_tasks = collect_long_tasks(renderer);
        let network_events = collect_network_events(renderer);
        debug!(
            "Renderer {}: {} long tasks, {} network events",
            renderer.pid,
            long_tasks.len(),
            network_events.len()
        );
        Self {
            long_tasks,
            network_events,
        }
    }

    /// Long tasks intersecting `[lo, hi]`
    pub fn long_tasks_between(&self, lo: f64, hi: f64) -> Vec<&'a TraceEvent> {
        select_intersecting(&self.long_tasks, lo, hi)
    }

    /// Network events intersecting `[lo, hi]`, in no particular order
    pub fn network_events_between(&self, lo: f64, hi: f64) -> Vec<&'a TraceEvent> {
        select_intersecting(&self.network_events, lo, hi)
    }
}

/// Top-level main-thread scheduler tasks at least as long as the threshold
pub fn collect_long_tasks(renderer: &Process) -> Vec<&TraceEvent> {
    renderer
        .main_thread()
        .map(|thread| {
            thread
                .top_level_tasks()
                .into_iter()
                .filter(|task| task.duration >= LONG_TASK_THRESHOLD_MS)
                .collect()
        })
        .unwrap_or_default()
}

/// Network request lifetimes on any thread of the renderer.
///
/// Netlog sub-steps share their request's id; only the outermost slice
/// stands for the request.
pub fn collect_network_events(renderer: &Process) -> Vec<&TraceEvent> {
    renderer
        .threads()
        .flat_map(|thread| thread.events_of_kind(EventKind::Network))
        .filter(|event| !event.nested)
        .collect()
}

fn select_intersecting<'a>(events: &[&'a TraceEvent], lo: f64, hi: f64) -> Vec<&'a TraceEvent> {
    events
        .iter()
        .copied()
        .filter(|event| event.intersects_inclusive(lo, hi))
        .collect()
}
