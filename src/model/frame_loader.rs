//! Legacy frame-loader object snapshots.
//!
//! Older traces do not carry the URL and main-frame flag inline on
//! `navigationStart`; instead the renderer periodically snapshots its
//! `FrameLoader` objects. These snapshots are the fallback source for
//! navigation metadata.

use super::event::FrameId;
use serde_json::{Map, Value};

/// One snapshot of a frame loader's state
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLoaderSnapshot {
    pub ts: f64,
    pub frame: Option<FrameId>,
    pub is_loading_main_frame: Option<bool>,
    pub document_loader_url: Option<String>,
}

impl FrameLoaderSnapshot {
    /// Build a snapshot from the `args.snapshot` payload of an `O` event
    pub fn from_args(ts: f64, snapshot: &Map<String, Value>) -> Self {
        Self {
            ts,
            frame: snapshot.get("frame").and_then(FrameId::from_value),
            is_loading_main_frame: snapshot.get("isLoadingMainFrame").and_then(Value::as_bool),
            document_loader_url: snapshot
                .get("documentLoaderURL")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// A frame-loader object over its lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLoaderInstance {
    pub id: String,
    pub created: f64,
    pub deleted: Option<f64>,
    /// Ascending by `ts`
    pub snapshots: Vec<FrameLoaderSnapshot>,
}

impl FrameLoaderInstance {
    pub fn new(id: impl Into<String>, created: f64) -> Self {
        Self {
            id: id.into(),
            created,
            deleted: None,
            snapshots: Vec::new(),
        }
    }

    pub fn is_alive_at(&self, ts: f64) -> bool {
        self.created <= ts && self.deleted.map_or(true, |deleted| ts < deleted)
    }

    /// Latest snapshot taken at or before `ts`
    pub fn snapshot_at(&self, ts: f64) -> Option<&FrameLoaderSnapshot> {
        self.snapshots.iter().rev().find(|snapshot| snapshot.ts <= ts)
    }

    pub(crate) fn push_snapshot(&mut self, snapshot: FrameLoaderSnapshot) {
        if snapshot.ts < self.created {
            self.created = snapshot.ts;
        }
        let position = self
            .snapshots
            .partition_point(|existing| existing.ts <= snapshot.ts);
        self.snapshots.insert(position, snapshot);
    }
}

/// Most recently updated snapshot for `frame` among instances alive at `ts`
pub fn find_snapshot_at<'a>(
    instances: &'a [FrameLoaderInstance],
    frame: &FrameId,
    ts: f64,
) -> Option<&'a FrameLoaderSnapshot> {
    instances
        .iter()
        .filter(|instance| instance.is_alive_at(ts))
        .filter_map(|instance| instance.snapshot_at(ts))
        .filter(|snapshot| snapshot.frame.as_ref() == Some(frame))
        .fold(None, |best: Option<&FrameLoaderSnapshot>, snapshot| match best {
            Some(current) if current.ts > snapshot.ts => Some(current),
            _ => Some(snapshot),
        })
}
