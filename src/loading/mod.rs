//! Page-load metrics from a trace model.
//!
//! This module turns a renderer's events into load expectations:
//! - Partitioning navigation, DCL and meaningful-paint markers by frame
//! - Building one window per qualifying navigation
//! - Collecting long-task and network evidence per window
//! - Evaluating First CPU Idle and Time To Interactive
//! - Assembling the per-navigation record

pub mod driver;
pub mod evidence;
pub mod expectation;
pub mod interactivity;
pub mod navigation;
pub mod partition;

// Re-export main types and functions
pub use driver::LoadExpectationEngine;
pub use evidence::{collect_long_tasks, collect_network_events, RendererEvidence};
pub use expectation::{
    assemble_load_expectation, resolve_dcl, resolve_fmp, DclSelection, LoadExpectation,
    LoadExpectationKind,
};
pub use interactivity::{InteractivityEvaluator, QuietWindowConfig, QuietWindowEvaluator};
pub use navigation::{build_navigation_windows, resolve_navigation, NavigationMetadata, NavigationWindow};
pub use partition::{partition_frame_events, FrameEvents};
