use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use crate::pipeline::pipeline_error::PipelineError;

/// Cross-cutting logger and error reporter for the capture pipeline.
///
/// Front ends observe the controller through this instead of the state
/// machine writing to any one output directly.
pub trait PipelineLogger: Send {
    /// A cycle finished and its result was published.
    fn cycle_published(&mut self, face_count: usize);

    /// Record how long a named stage took for one cycle.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. dropped ticks).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Report a locally recovered failure.
    fn error(&mut self, error: &PipelineError);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn cycle_published(&mut self, _face_count: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
    fn error(&mut self, _error: &PipelineError) {}
}

/// Forwards to the `log` crate and keeps per-stage timings, metrics and
/// error counts for a summary at shutdown.
///
/// Progress output is throttled to every `throttle_cycles` published cycles.
pub struct SummaryPipelineLogger {
    throttle_cycles: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    errors: BTreeMap<&'static str, usize>,
    start_time: Instant,
    cycles: usize,
    faces: usize,
}

impl SummaryPipelineLogger {
    pub fn new(throttle_cycles: usize) -> Self {
        Self {
            throttle_cycles: throttle_cycles.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            errors: BTreeMap::new(),
            start_time: Instant::now(),
            cycles: 0,
            faces: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing happened.
    pub fn summary_string(&self) -> Option<String> {
        if self.cycles == 0 && self.errors.is_empty() && self.timings.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Pipeline summary ({} cycles, {} faces, {elapsed_s:.1}s total):",
            self.cycles, self.faces
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({} runs)",
                durations.len()
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            let values = &self.metrics[name];
            let total: f64 = values.iter().sum();
            let avg = total / values.len().max(1) as f64;
            lines.push(format!("  {name}: avg {avg:.1}  total {total:.0}"));
        }

        for (kind, count) in &self.errors {
            lines.push(format!("  error {kind}: {count}"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    pub fn error_count(&self, kind: &str) -> usize {
        self.errors.get(kind).copied().unwrap_or(0)
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }
}

impl Default for SummaryPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for SummaryPipelineLogger {
    fn cycle_published(&mut self, face_count: usize) {
        self.cycles += 1;
        self.faces += face_count;
        if self.cycles % self.throttle_cycles == 0 {
            log::info!("Published {} cycles ({} faces)", self.cycles, self.faces);
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn error(&mut self, error: &PipelineError) {
        *self.errors.entry(error.kind()).or_default() += 1;
        match error {
            PipelineError::PermissionDenied { .. } | PipelineError::DeviceOpenFailed { .. } => {
                log::error!("{error}")
            }
            _ => log::warn!("{error}; cycle skipped"),
        }
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
