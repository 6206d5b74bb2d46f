//! In-memory trace model.
//!
//! This module handles:
//! - Storing events per process and thread
//! - Answering the read-only queries the load engine needs
//!   (main thread, frame-keyed lookups, frame-loader snapshots, bounds)
//!
//! The model is immutable once built; everything downstream borrows from it.

pub mod builder;
pub mod event;
pub mod frame_loader;

pub use builder::TraceModelBuilder;
pub use event::{EventKind, EventPhase, FrameId, TraceEvent};
pub use frame_loader::{FrameLoaderInstance, FrameLoaderSnapshot};

use crate::utils::config::{RENDERER_MAIN_THREAD_NAME, TRACING_UI_LABELS};
use std::collections::BTreeMap;

/// A fully ingested trace
#[derive(Debug, Clone, Default)]
pub struct TraceModel {
    pub(crate) processes: BTreeMap<u64, Process>,
    pub(crate) bounds: Option<(f64, f64)>,
}

impl TraceModel {
    /// All processes, ascending by pid
    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.processes.values()
    }

    pub fn process(&self, pid: u64) -> Option<&Process> {
        self.processes.get(&pid)
    }

    /// Processes that own a renderer main thread, ascending by pid
    pub fn renderers(&self) -> impl Iterator<Item = &Process> {
        self.processes().filter(|process| process.is_renderer())
    }

    /// Earliest event start, or 0 for an empty trace
    pub fn min_timestamp(&self) -> f64 {
        self.bounds.map_or(0.0, |(min, _)| min)
    }

    /// Latest event end across the whole model, or 0 for an empty trace
    pub fn max_timestamp(&self) -> f64 {
        self.bounds.map_or(0.0, |(_, max)| max)
    }

    pub fn event_count(&self) -> usize {
        self.processes()
            .flat_map(Process::threads)
            .map(|thread| thread.events.len())
            .sum()
    }
}

/// One process and its threads
#[derive(Debug, Clone, Default)]
pub struct Process {
    pub pid: u64,
    pub name: Option<String>,
    pub labels: Vec<String>,
    pub(crate) threads: BTreeMap<u64, Thread>,
    pub(crate) frame_loaders: Vec<FrameLoaderInstance>,
}

impl Process {
    pub(crate) fn new(pid: u64) -> Self {
        Self {
            pid,
            ..Self::default()
        }
    }

    /// Threads ascending by tid
    pub fn threads(&self) -> impl Iterator<Item = &Thread> {
        self.threads.values()
    }

    pub fn thread(&self, tid: u64) -> Option<&Thread> {
        self.threads.get(&tid)
    }

    /// The renderer main thread, if this process has one
    pub fn main_thread(&self) -> Option<&Thread> {
        self.threads()
            .find(|thread| thread.name.as_deref() == Some(RENDERER_MAIN_THREAD_NAME))
    }

    pub fn is_renderer(&self) -> bool {
        self.main_thread().is_some()
    }

    /// True for the renderer hosting the tracing tool's own UI
    pub fn is_tracing_ui(&self) -> bool {
        self.labels
            .iter()
            .any(|label| TRACING_UI_LABELS.contains(&label.as_str()))
    }

    /// Main-thread events of one kind grouped by frame, each group ascending by start.
    ///
    /// Events without a frame reference are left out.
    pub fn main_thread_events_by_frame(&self, kind: EventKind) -> BTreeMap<FrameId, Vec<&TraceEvent>> {
        let mut by_frame: BTreeMap<FrameId, Vec<&TraceEvent>> = BTreeMap::new();
        let Some(main_thread) = self.main_thread() else {
            return by_frame;
        };

        for event in main_thread.events_of_kind(kind) {
            if let Some(frame) = event.frame_id() {
                by_frame.entry(frame).or_default().push(event);
            }
        }

        // Thread events are already start-ordered; keep the sort for stability
        for events in by_frame.values_mut() {
            events.sort_by(|a, b| a.start.total_cmp(&b.start));
        }
        by_frame
    }

    /// Frame-loader snapshot describing `frame` at `ts`
    pub fn frame_loader_snapshot_at(&self, frame: &FrameId, ts: f64) -> Option<&FrameLoaderSnapshot> {
        frame_loader::find_snapshot_at(&self.frame_loaders, frame, ts)
    }
}

/// One thread's events, ascending by start (longer first on ties)
#[derive(Debug, Clone, Default)]
pub struct Thread {
    pub tid: u64,
    pub name: Option<String>,
    pub(crate) events: Vec<TraceEvent>,
    pub(crate) internal_spans: Vec<(f64, f64)>,
}

impl Thread {
    pub(crate) fn new(tid: u64) -> Self {
        Self {
            tid,
            ..Self::default()
        }
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn events_of_kind(&self, kind: EventKind) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |event| event.kind == kind)
    }

    /// Scheduler tasks not nested inside another scheduler task
    pub fn top_level_tasks(&self) -> Vec<&TraceEvent> {
        let mut top_level = Vec::new();
        let mut outer_end = f64::NEG_INFINITY;

        for task in self.events_of_kind(EventKind::SchedulerTask) {
            if task.end() <= outer_end {
                continue;
            }
            outer_end = task.end();
            top_level.push(task);
        }
        top_level
    }

    /// True when `event` runs inside a tooling-internal slice on this thread
    pub fn is_tooling_internal(&self, event: &TraceEvent) -> bool {
        self.internal_spans
            .iter()
            .any(|&(start, end)| start <= event.start && event.end() <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(start: f64, duration: f64) -> TraceEvent {
        TraceEvent::new(1, 1, "toplevel", "RunTask", EventPhase::Slice, start, duration)
    }

    fn renderer_with(events: Vec<TraceEvent>) -> TraceModel {
        let mut builder = TraceModelBuilder::new();
        builder.set_thread_name(1, 1, RENDERER_MAIN_THREAD_NAME);
        for event in events {
            builder.add_event(event);
        }
        builder.build()
    }

    #[test]
    fn test_top_level_tasks_skip_nested() {
        let model = renderer_with(vec![
            task(0.0, 100.0),
            task(10.0, 20.0),
            task(100.0, 60.0),
            task(200.0, 10.0),
        ]);
        let main = model.process(1).unwrap().main_thread().unwrap();

        let starts: Vec<f64> = main.top_level_tasks().iter().map(|t| t.start).collect();
        assert_eq!(starts, vec![0.0, 100.0, 200.0]);
    }

    #[test]
    fn test_tracing_ui_label() {
        let mut builder = TraceModelBuilder::new();
        builder.set_thread_name(3, 1, RENDERER_MAIN_THREAD_NAME);
        builder.add_process_labels(3, "chrome://tracing");
        let model = builder.build();

        let process = model.process(3).unwrap();
        assert!(process.is_renderer());
        assert!(process.is_tracing_ui());
    }

    #[test]
    fn test_empty_model_bounds() {
        let model = TraceModel::default();
        assert_eq!(model.max_timestamp(), 0.0);
        assert_eq!(model.renderers().count(), 0);
    }
}
