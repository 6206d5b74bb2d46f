//! First CPU Idle and Time To Interactive evaluation.
//!
//! The engine only hands correctly windowed evidence across the
//! [`InteractivityEvaluator`] boundary and treats both answers as opaque
//! optional timestamps. [`QuietWindowEvaluator`] is the bundled
//! implementation used by the CLI.

use crate::model::TraceEvent;
use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;

/// Pure functions from windowed evidence to interactivity instants
pub trait InteractivityEvaluator {
    /// Earliest instant at/after FMP when the main thread is judged quiescent
    fn first_cpu_idle(
        &self,
        fmp: f64,
        window_end: f64,
        dom_content_loaded_end: f64,
        long_tasks: &[&TraceEvent],
    ) -> Option<f64>;

    /// Earliest instant when CPU and network stay quiet for the look-ahead window
    fn interactive_time(
        &self,
        fmp: f64,
        window_end: f64,
        dom_content_loaded_end: f64,
        long_tasks: &[&TraceEvent],
        network_events: &[&TraceEvent],
    ) -> Option<f64>;
}

/// Parameters of the quiet-window heuristics
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QuietWindowConfig {
    /// Look-ahead that must stay quiet for Time To Interactive (ms)
    pub quiet_window_ms: f64,

    /// Requests that may be in flight while the network still counts as quiet
    pub allowed_concurrent_requests: usize,

    /// Long tasks closer than this belong to the same cluster (ms)
    pub cluster_separation_ms: f64,

    /// Clusters spanning at least this long block First CPU Idle (ms)
    pub heavy_cluster_ms: f64,
}

impl Default for QuietWindowConfig {
    fn default() -> Self {
        Self {
            quiet_window_ms: 5000.0,
            allowed_concurrent_requests: 2,
            cluster_separation_ms: 1000.0,
            heavy_cluster_ms: 250.0,
        }
    }
}

/// Half-life of the First CPU Idle quiet-window requirement (s)
const FCI_WINDOW_HALF_LIFE_S: f64 = 15.0;

/// Default evaluator built on quiet windows
#[derive(Debug, Clone, Default)]
pub struct QuietWindowEvaluator {
    config: QuietWindowConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TaskCluster {
    start: f64,
    end: f64,
}

impl QuietWindowEvaluator {
    pub fn new(config: QuietWindowConfig) -> Self {
        Self { config }
    }

    /// Quiet time required after a First CPU Idle candidate.
    ///
    /// Decays from 5s right at FMP towards 1s with a 15s half-life.
    pub fn required_idle_window_ms(&self, since_fmp_ms: f64) -> f64 {
        let since_fmp_s = since_fmp_ms.max(0.0) / 1000.0;
        let window_s = 4.0 * (-(LN_2 / FCI_WINDOW_HALF_LIFE_S) * since_fmp_s).exp() + 1.0;
        window_s * 1000.0
    }

    fn heavy_clusters(&self, long_tasks: &[&TraceEvent]) -> Vec<TaskCluster> {
        let mut tasks: Vec<&TraceEvent> = long_tasks.to_vec();
        tasks.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut clusters: Vec<TaskCluster> = Vec::new();
        for task in tasks {
            match clusters.last_mut() {
                Some(cluster) if task.start - cluster.end < self.config.cluster_separation_ms => {
                    cluster.end = cluster.end.max(task.end());
                }
                _ => clusters.push(TaskCluster {
                    start: task.start,
                    end: task.end(),
                }),
            }
        }

        clusters.retain(|cluster| cluster.end - cluster.start >= self.config.heavy_cluster_ms);
        clusters
    }

    /// Most requests in flight at any instant of `[lo, hi]`
    fn peak_in_flight(network_events: &[&TraceEvent], lo: f64, hi: f64) -> usize {
        let mut edges: Vec<(f64, i32)> = network_events
            .iter()
            .filter(|request| request.start < hi && request.end() > lo)
            .flat_map(|request| [(request.start.max(lo), 1), (request.end(), -1)])
            .collect();
        // Ends sort before starts at the same instant
        edges.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut in_flight = 0i32;
        let mut peak = 0i32;
        for (_, delta) in edges {
            in_flight += delta;
            peak = peak.max(in_flight);
        }
        peak.max(0) as usize
    }
}

impl InteractivityEvaluator for QuietWindowEvaluator {
    fn first_cpu_idle(
        &self,
        fmp: f64,
        window_end: f64,
        dom_content_loaded_end: f64,
        long_tasks: &[&TraceEvent],
    ) -> Option<f64> {
        let mut candidate = fmp;

        for cluster in self.heavy_clusters(long_tasks) {
            if cluster.end <= candidate {
                continue;
            }
            if cluster.start > candidate
                && cluster.start - candidate >= self.required_idle_window_ms(candidate - fmp)
            {
                return Some(candidate.max(dom_content_loaded_end));
            }
            candidate = cluster.end;
        }

        (window_end - candidate >= self.required_idle_window_ms(candidate - fmp))
            .then(|| candidate.max(dom_content_loaded_end))
    }

    fn interactive_time(
        &self,
        fmp: f64,
        window_end: f64,
        dom_content_loaded_end: f64,
        long_tasks: &[&TraceEvent],
        network_events: &[&TraceEvent],
    ) -> Option<f64> {
        let mut candidates: Vec<f64> = std::iter::once(fmp)
            .chain(long_tasks.iter().map(|task| task.end()).filter(|&end| end > fmp))
            .collect();
        candidates.sort_by(f64::total_cmp);

        for candidate in candidates {
            let quiet_until = candidate + self.config.quiet_window_ms;
            if quiet_until > window_end {
                return None;
            }

            let cpu_busy = long_tasks
                .iter()
                .any(|task| task.start < quiet_until && task.end() > candidate);
            if cpu_busy {
                continue;
            }

            if Self::peak_in_flight(network_events, candidate, quiet_until)
                > self.config.allowed_concurrent_requests
            {
                continue;
            }

            return Some(candidate.max(dom_content_loaded_end));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventPhase;

    fn task(start: f64, duration: f64) -> TraceEvent {
        TraceEvent::new(1, 1, "toplevel", "RunTask", EventPhase::Slice, start, duration)
    }

    fn request(start: f64, duration: f64) -> TraceEvent {
        TraceEvent::new(1, 2, "netlog", "URL_REQUEST", EventPhase::Async, start, duration)
    }

    #[test]
    fn test_required_window_decays() {
        let evaluator = QuietWindowEvaluator::default();
        assert!((evaluator.required_idle_window_ms(0.0) - 5000.0).abs() < 1e-9);
        assert!((evaluator.required_idle_window_ms(15_000.0) - 3000.0).abs() < 1e-9);
        assert!(evaluator.required_idle_window_ms(600_000.0) < 1001.0);
    }

    #[test]
    fn test_fci_without_tasks_needs_room() {
        let evaluator = QuietWindowEvaluator::default();
        assert_eq!(evaluator.first_cpu_idle(1000.0, 7000.0, 1200.0, &[]), Some(1200.0));
        assert_eq!(evaluator.first_cpu_idle(750.0, 5000.0, 800.0, &[]), None);
    }

    #[test]
    fn test_fci_light_cluster_does_not_block() {
        let evaluator = QuietWindowEvaluator::default();
        let light = task(2000.0, 100.0);
        assert_eq!(
            evaluator.first_cpu_idle(1000.0, 10_000.0, 0.0, &[&light]),
            Some(1000.0)
        );
    }

    #[test]
    fn test_fci_moves_past_heavy_cluster() {
        let evaluator = QuietWindowEvaluator::default();
        // Two tasks 500ms apart form one 700ms heavy cluster [1500, 2200]
        let a = task(1500.0, 100.0);
        let b = task(2100.0, 100.0);
        assert_eq!(
            evaluator.first_cpu_idle(1000.0, 20_000.0, 0.0, &[&b, &a]),
            Some(2200.0)
        );
    }

    #[test]
    fn test_tti_waits_for_network_quiet() {
        let evaluator = QuietWindowEvaluator::default();
        let busy = [request(0.0, 4000.0), request(0.0, 4000.0), request(500.0, 3000.0)];
        let busy_refs: Vec<&TraceEvent> = busy.iter().collect();
        let long_task = task(3800.0, 200.0);

        // Three requests in flight until 3500; the long task ends at 4000
        assert_eq!(
            evaluator.interactive_time(1000.0, 20_000.0, 900.0, &[&long_task], &busy_refs),
            Some(4000.0)
        );
    }

    #[test]
    fn test_tti_undefined_without_room() {
        let evaluator = QuietWindowEvaluator::default();
        assert_eq!(evaluator.interactive_time(750.0, 5000.0, 800.0, &[], &[]), None);
        assert_eq!(evaluator.interactive_time(0.0, 5000.0, 800.0, &[], &[]), Some(800.0));
    }

    #[test]
    fn test_peak_in_flight_back_to_back() {
        let a = request(0.0, 100.0);
        let b = request(100.0, 100.0);
        assert_eq!(QuietWindowEvaluator::peak_in_flight(&[&a, &b], 0.0, 500.0), 1);
    }
}
