//! Run the load pipeline over every renderer of a trace.

use super::evidence::RendererEvidence;
use super::expectation::{
    assemble_load_expectation, resolve_dcl, resolve_fmp, DclSelection, LoadExpectation,
};
use super::interactivity::{InteractivityEvaluator, QuietWindowEvaluator};
use super::navigation::build_navigation_windows;
use super::partition::partition_frame_events;
use crate::model::{Process, TraceModel};
use crate::utils::config::AnalysisConfig;
use log::{debug, info};

/// Computes load expectations with an injected interactivity evaluator
#[derive(Debug, Clone)]
pub struct LoadExpectationEngine<E> {
    evaluator: E,
    dcl_selection: DclSelection,
}

impl LoadExpectationEngine<QuietWindowEvaluator> {
    /// Engine with the bundled quiet-window evaluator
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(QuietWindowEvaluator::new(config.interactivity.clone()))
            .with_dcl_selection(config.dcl_selection)
    }
}

impl<E: InteractivityEvaluator> LoadExpectationEngine<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            dcl_selection: DclSelection::default(),
        }
    }

    pub fn with_dcl_selection(mut self, dcl_selection: DclSelection) -> Self {
        self.dcl_selection = dcl_selection;
        self
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Load expectations of every renderer except the tracing tool's own UI,
    /// concatenated in ascending pid order
    pub fn collect<'a>(&self, model: &'a TraceModel) -> Vec<LoadExpectation<'a>> {
        let trace_end = model.max_timestamp();
        let mut expectations = Vec::new();

        for renderer in model.renderers() {
            if renderer.is_tracing_ui() {
                debug!("Skipping tracing UI renderer {}", renderer.pid);
                continue;
            }
            expectations.extend(self.collect_for_renderer(renderer, trace_end));
        }

        info!(
            "Found {} load expectations in {} renderers",
            expectations.len(),
            model.renderers().count()
        );
        expectations
    }

    /// Load expectations of one renderer, frame by frame, each frame in
    /// navigation order
    pub fn collect_for_renderer<'a>(&self, renderer: &'a Process, trace_end: f64) -> Vec<LoadExpectation<'a>> {
        let frame_events = partition_frame_events(renderer);
        let evidence = RendererEvidence::collect(renderer);
        let mut expectations = Vec::new();

        for (frame, navigation_starts) in &frame_events.navigation_starts {
            let fmp_candidates = frame_events.fmp_candidates_for(frame);
            let dcl_events = frame_events.dom_content_loaded_ends_for(frame);

            for window in build_navigation_windows(renderer, frame, navigation_starts, trace_end) {
                let fmp = resolve_fmp(fmp_candidates, &window);
                let dcl = resolve_dcl(dcl_events, &window, self.dcl_selection);
                debug!(
                    "Window {:.3}..{:.3}ms in frame {}: fmp={:?} dcl={:?}",
                    window.start(),
                    window.window_end,
                    frame,
                    fmp.map(|e| e.start),
                    dcl.map(|e| e.start)
                );
                expectations.push(assemble_load_expectation(window, fmp, dcl, &evidence, &self.evaluator));
            }
        }
        expectations
    }
}
