// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Execution profiling metrics.
//!
//! [`ExecutionMetrics`] collects per-step and aggregate timing data for
//! one plan run, including how often the software fallback had to step
//! in for a failing accelerator.

use std::time::Duration;

/// Metrics for a single step's execution.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StepMetrics {
    /// Step position in the plan; `None` for a whole-graph run.
    pub step_index: Option<usize>,
    /// Name of the target the step ultimately ran on.
    pub target: String,
    /// Whether this step ran on the software fallback after a device
    /// failure.
    pub fell_back: bool,
    /// Wall-clock time for the step, gather to scatter.
    pub duration: Duration,
}

/// Aggregate metrics for a complete plan run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExecutionMetrics {
    /// Total wall-clock time for the run.
    pub total_duration: Duration,
    /// Per-step metrics, in execution order.
    pub step_metrics: Vec<StepMetrics>,
    /// Number of steps in the plan (0 for simple plans).
    pub num_steps: usize,
    /// Number of device failures recovered in software.
    pub fallbacks: usize,
}

impl ExecutionMetrics {
    /// Creates an empty metrics container.
    pub fn new(num_steps: usize) -> Self {
        Self {
            total_duration: Duration::ZERO,
            step_metrics: Vec::new(),
            num_steps,
            fallbacks: 0,
        }
    }

    /// Records one executed step.
    pub fn record_step(
        &mut self,
        step_index: Option<usize>,
        target: String,
        fell_back: bool,
        duration: Duration,
    ) {
        if fell_back {
            self.fallbacks += 1;
        }
        self.step_metrics.push(StepMetrics {
            step_index,
            target,
            fell_back,
            duration,
        });
    }

    /// Finalises metrics with the total wall-clock time.
    pub fn finalise(&mut self, total: Duration) {
        self.total_duration = total;
    }

    /// Returns a human-readable summary suitable for log output.
    pub fn summary(&self) -> String {
        format!(
            "Execution: {:.2}ms total, {} steps run ({} planned), {} fallback(s)",
            self.total_duration.as_secs_f64() * 1000.0,
            self.step_metrics.len(),
            self.num_steps,
            self.fallbacks,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let m = ExecutionMetrics::new(3);
        assert_eq!(m.num_steps, 3);
        assert_eq!(m.fallbacks, 0);
        assert!(m.step_metrics.is_empty());
    }

    #[test]
    fn test_record_and_finalise() {
        let mut m = ExecutionMetrics::new(2);
        m.record_step(Some(0), "npu".into(), false, Duration::from_millis(5));
        m.record_step(Some(1), "software".into(), true, Duration::from_millis(8));
        m.finalise(Duration::from_millis(20));

        assert_eq!(m.step_metrics.len(), 2);
        assert_eq!(m.fallbacks, 1);
        assert_eq!(m.total_duration, Duration::from_millis(20));
    }

    #[test]
    fn test_summary_format() {
        let mut m = ExecutionMetrics::new(2);
        m.record_step(Some(0), "npu".into(), false, Duration::from_millis(5));
        m.finalise(Duration::from_millis(10));

        let s = m.summary();
        assert!(s.contains("Execution:"));
        assert!(s.contains("1 steps run"));
        assert!(s.contains("0 fallback(s)"));
    }
}
