//! Incremental construction of a [`TraceModel`].
//!
//! The parser feeds events in file order; begin/end pairs and object
//! lifetimes are matched here. `build` closes anything left open at the
//! trace's upper bound and sorts every thread.

use super::event::{EventPhase, TraceEvent};
use super::frame_loader::{FrameLoaderInstance, FrameLoaderSnapshot};
use super::{Process, Thread, TraceModel};
use crate::utils::config::TOOLING_INTERNAL_PREFIX;
use log::debug;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

type AsyncKey = (u64, String, String);

#[derive(Debug, Default)]
pub struct TraceModelBuilder {
    processes: BTreeMap<u64, Process>,
    open_slices: HashMap<(u64, u64), Vec<TraceEvent>>,
    open_async: HashMap<AsyncKey, Vec<TraceEvent>>,
    frame_loaders: BTreeMap<(u64, String), FrameLoaderInstance>,
}

impl TraceModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn process_mut(&mut self, pid: u64) -> &mut Process {
        self.processes.entry(pid).or_insert_with(|| Process::new(pid))
    }

    fn thread_mut(&mut self, pid: u64, tid: u64) -> &mut Thread {
        self.process_mut(pid)
            .threads
            .entry(tid)
            .or_insert_with(|| Thread::new(tid))
    }

    pub fn set_process_name(&mut self, pid: u64, name: impl Into<String>) {
        self.process_mut(pid).name = Some(name.into());
    }

    /// Add comma-separated process labels
    pub fn add_process_labels(&mut self, pid: u64, labels: &str) {
        let process = self.process_mut(pid);
        for label in labels.split(',').map(str::trim).filter(|l| !l.is_empty()) {
            if !process.labels.iter().any(|existing| existing == label) {
                process.labels.push(label.to_string());
            }
        }
    }

    pub fn set_thread_name(&mut self, pid: u64, tid: u64, name: impl Into<String>) {
        self.thread_mut(pid, tid).name = Some(name.into());
    }

    /// Add a finished event to its thread
    pub fn add_event(&mut self, event: TraceEvent) {
        self.thread_mut(event.pid, event.tid).events.push(event);
    }

    /// Open a `B` slice
    pub fn begin_slice(&mut self, event: TraceEvent) {
        self.thread_mut(event.pid, event.tid);
        self.open_slices
            .entry((event.pid, event.tid))
            .or_default()
            .push(event);
    }

    /// Close the innermost open slice on the thread; `E` args are merged in
    pub fn end_slice(&mut self, pid: u64, tid: u64, ts: f64, args: Option<&Map<String, Value>>) {
        let Some(mut event) = self
            .open_slices
            .get_mut(&(pid, tid))
            .and_then(Vec::pop)
        else {
            debug!("Unmatched end event on pid {} tid {} at {:.3}ms", pid, tid, ts);
            return;
        };

        event.duration = (ts - event.start).max(0.0);
        if let Some(args) = args {
            for (key, value) in args {
                event.args.insert(key.clone(), value.clone());
            }
        }
        self.add_event(event);
    }

    /// Open an async slice keyed by process, category and id.
    ///
    /// A slice opened under another one with the same key is a sub-step of
    /// that outer slice and gets marked nested.
    pub fn begin_async(&mut self, id: impl Into<String>, mut event: TraceEvent) {
        self.thread_mut(event.pid, event.tid);
        let key = (event.pid, event.category.clone(), id.into());
        let open = self.open_async.entry(key).or_default();
        event.nested = !open.is_empty();
        open.push(event);
    }

    /// Close the latest open async slice with this key (and name, when given)
    pub fn end_async(&mut self, pid: u64, category: &str, id: &str, name: &str, ts: f64) {
        let key = (pid, category.to_string(), id.to_string());
        let Some(open) = self.open_async.get_mut(&key) else {
            debug!("Unmatched async end '{}' (id {}) at {:.3}ms", name, id, ts);
            return;
        };

        let position = if name.is_empty() {
            open.len().checked_sub(1)
        } else {
            open.iter().rposition(|event| event.name == name)
        };
        let Some(position) = position else {
            debug!("Unmatched async end '{}' (id {}) at {:.3}ms", name, id, ts);
            return;
        };

        let mut event = open.remove(position);
        if open.is_empty() {
            self.open_async.remove(&key);
        }
        event.duration = (ts - event.start).max(0.0);
        self.add_event(event);
    }

    /// Record creation of a frame-loader object (`N`)
    pub fn create_frame_loader(&mut self, pid: u64, id: impl Into<String>, ts: f64) {
        let id = id.into();
        self.process_mut(pid);
        self.frame_loaders
            .entry((pid, id.clone()))
            .or_insert_with(|| FrameLoaderInstance::new(id, ts));
    }

    /// Record a frame-loader snapshot (`O`), creating the instance if unseen
    pub fn snapshot_frame_loader(&mut self, pid: u64, id: impl Into<String>, ts: f64, snapshot: &Map<String, Value>) {
        let id = id.into();
        self.create_frame_loader(pid, id.clone(), ts);
        if let Some(instance) = self.frame_loaders.get_mut(&(pid, id)) {
            instance.push_snapshot(FrameLoaderSnapshot::from_args(ts, snapshot));
        }
    }

    /// Record deletion of a frame-loader object (`D`)
    pub fn delete_frame_loader(&mut self, pid: u64, id: &str, ts: f64) {
        match self.frame_loaders.get_mut(&(pid, id.to_string())) {
            Some(instance) => instance.deleted = Some(ts),
            None => debug!("Delete of unknown frame loader {} in pid {}", id, pid),
        }
    }

    /// Finish the model: close open slices, sort threads, compute bounds
    pub fn build(mut self) -> TraceModel {
        let mut bounds = compute_bounds(&self.processes);
        for event in self.open_slices.values().chain(self.open_async.values()).flatten() {
            bounds = widen(bounds, event.start, event.start);
        }

        let trace_end = bounds.map_or(0.0, |(_, max)| max);
        let leftovers: Vec<TraceEvent> = self
            .open_slices
            .drain()
            .flat_map(|(_, events)| events)
            .chain(self.open_async.drain().flat_map(|(_, events)| events))
            .collect();
        if !leftovers.is_empty() {
            debug!("Closing {} unfinished events at trace end", leftovers.len());
        }
        for mut event in leftovers {
            event.duration = (trace_end - event.start).max(0.0);
            self.add_event(event);
        }

        for ((pid, _), instance) in std::mem::take(&mut self.frame_loaders) {
            self.process_mut(pid).frame_loaders.push(instance);
        }

        for process in self.processes.values_mut() {
            for thread in process.threads.values_mut() {
                finalize_thread(thread);
            }
        }

        TraceModel {
            processes: self.processes,
            bounds,
        }
    }
}

fn widen(bounds: Option<(f64, f64)>, start: f64, end: f64) -> Option<(f64, f64)> {
    Some(match bounds {
        Some((min, max)) => (min.min(start), max.max(end)),
        None => (start, end),
    })
}

fn compute_bounds(processes: &BTreeMap<u64, Process>) -> Option<(f64, f64)> {
    processes
        .values()
        .flat_map(|process| process.threads.values())
        .flat_map(|thread| thread.events.iter())
        .fold(None, |bounds, event| widen(bounds, event.start, event.end()))
}

fn finalize_thread(thread: &mut Thread) {
    thread.events.sort_by(|a, b| {
        a.start
            .total_cmp(&b.start)
            .then_with(|| b.duration.total_cmp(&a.duration))
    });
    thread.internal_spans = thread
        .events
        .iter()
        .filter(|event| event.phase == EventPhase::Slice && event.name.starts_with(TOOLING_INTERNAL_PREFIX))
        .map(|event| (event.start, event.end()))
        .collect();
}
