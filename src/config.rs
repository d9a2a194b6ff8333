//! Harness configuration.

use std::time::Duration;

/// Settings for one harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Print a line for passing comparisons, not only failures
    pub show_passes: bool,
    /// How long each completion poll waits
    pub poll_interval: Duration,
    /// Polls before a worker is abandoned
    pub max_polls: u32,
    /// Maximum frames kept in a fault trace
    pub trace_depth: usize,
    /// Capture a backtrace when tested code panics
    pub capture_traces: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            show_passes: true,
            poll_interval: Duration::from_millis(1),
            max_polls: 10,
            trace_depth: 8,
            capture_traces: true,
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_show_passes(mut self, show: bool) -> Self {
        self.show_passes = show;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_polls(mut self, polls: u32) -> Self {
        self.max_polls = polls;
        self
    }

    pub fn with_trace_depth(mut self, depth: usize) -> Self {
        self.trace_depth = depth;
        self
    }

    pub fn with_capture_traces(mut self, capture: bool) -> Self {
        self.capture_traces = capture;
        self
    }

    /// Upper bound on how long one invocation can block the caller.
    pub fn budget(&self) -> Duration {
        self.poll_interval.saturating_mul(self.max_polls)
    }
}
