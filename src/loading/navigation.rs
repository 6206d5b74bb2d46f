//! Build one analysis window per qualifying main-frame navigation.
//!
//! A window runs from its navigation start to the start of the next
//! qualifying navigation in the same frame, or to the trace end. Consecutive
//! windows of a frame therefore tile its timeline without gaps.

use crate::model::{FrameId, Process, TraceEvent};
use crate::utils::config::IGNORED_URLS;
use log::debug;
use serde_json::Value;

/// The time range attributed to one navigation
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationWindow<'a> {
    pub frame_id: FrameId,
    pub navigation_start: &'a TraceEvent,
    pub url: String,
    pub window_end: f64,
}

impl NavigationWindow<'_> {
    pub fn start(&self) -> f64 {
        self.navigation_start.start
    }
}

/// URL and main-frame flag of a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationMetadata {
    pub url: Option<String>,
    pub is_loading_main_frame: bool,
}

impl NavigationMetadata {
    /// URL of a navigation that should be analyzed, if it qualifies
    pub fn qualifying_url(self) -> Option<String> {
        if !self.is_loading_main_frame {
            return None;
        }
        self.url.filter(|url| !IGNORED_URLS.contains(&url.as_str()))
    }
}

/// Read navigation metadata from the event itself, falling back to the
/// frame-loader snapshot alive at the navigation's timestamp.
pub fn resolve_navigation(
    renderer: &Process,
    frame: &FrameId,
    navigation_start: &TraceEvent,
) -> Option<NavigationMetadata> {
    if let Some(data) = navigation_start.data() {
        return Some(NavigationMetadata {
            url: data
                .get("documentLoaderURL")
                .and_then(Value::as_str)
                .map(str::to_string),
            is_loading_main_frame: data
                .get("isLoadingMainFrame")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        });
    }

    let snapshot = renderer.frame_loader_snapshot_at(frame, navigation_start.start)?;
    Some(NavigationMetadata {
        url: snapshot.document_loader_url.clone(),
        is_loading_main_frame: snapshot.is_loading_main_frame.unwrap_or(false),
    })
}

/// Build the windows for one frame from its start-ordered navigation starts.
///
/// Non-qualifying navigations neither open nor close a window.
pub fn build_navigation_windows<'a>(
    renderer: &'a Process,
    frame: &FrameId,
    navigation_starts: &[&'a TraceEvent],
    trace_end: f64,
) -> Vec<NavigationWindow<'a>> {
    let mut windows = Vec::new();

    let qualifying = navigation_starts.iter().filter_map(|&navigation_start| {
        let url = resolve_navigation(renderer, frame, navigation_start)
            .and_then(NavigationMetadata::qualifying_url);
        if url.is_none() {
            debug!(
                "Skipping navigation at {:.3}ms in frame {}: not a main-frame load of a real URL",
                navigation_start.start, frame
            );
        }
        url.map(|url| (navigation_start, url))
    });

    let pending = qualifying.fold(None, |pending, next: (&'a TraceEvent, String)| {
        if let Some((navigation_start, url)) = pending {
            windows.push(close_window(frame, navigation_start, url, next.0.start));
        }
        Some(next)
    });

    if let Some((navigation_start, url)) = pending {
        windows.push(close_window(frame, navigation_start, url, trace_end));
    }

    debug!("Built {} navigation windows for frame {}", windows.len(), frame);
    windows
}

fn close_window<'a>(
    frame: &FrameId,
    navigation_start: &'a TraceEvent,
    url: String,
    window_end: f64,
) -> NavigationWindow<'a> {
    NavigationWindow {
        frame_id: frame.clone(),
        navigation_start,
        url,
        window_end: window_end.max(navigation_start.start),
    }
}
