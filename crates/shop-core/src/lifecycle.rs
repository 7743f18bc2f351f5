//! Operation lifecycle tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Lifecycle phases of a store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Operation started, request not yet sent.
    Start,
    /// Request handed to the transport.
    RequestSent,
    /// Response received from the backend.
    ResponseReceived(u16),
    /// Local state replaced with the server response.
    StateReplaced,
    /// Response discarded because its session was torn down.
    Discarded,
    /// Operation failed.
    Error(String),
}

/// Timing context for observability.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<String, Instant>,
}

impl TimingContext {
    /// Create a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
        }
    }

    /// Record a timing mark.
    pub fn mark(&mut self, name: &str) {
        self.marks.insert(name.to_string(), Instant::now());
    }

    /// Record the mark for a lifecycle phase.
    pub fn mark_phase(&mut self, phase: &LifecyclePhase) {
        let name = match phase {
            LifecyclePhase::Start => "start",
            LifecyclePhase::RequestSent => "request_sent",
            LifecyclePhase::ResponseReceived(_) => "response_received",
            LifecyclePhase::StateReplaced => "state_replaced",
            LifecyclePhase::Discarded => "discarded",
            LifecyclePhase::Error(_) => "error",
        };
        self.mark(name);
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get the offset of a named mark from the start.
    pub fn mark_offset(&self, name: &str) -> Option<Duration> {
        self.marks.get(name).map(|t| t.duration_since(self.start))
    }

    /// Time spent waiting on the backend, if both marks were recorded.
    pub fn round_trip(&self) -> Option<Duration> {
        let sent = self.marks.get("request_sent")?;
        let received = self.marks.get("response_received")?;
        Some(received.saturating_duration_since(*sent))
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_requires_both_marks() {
        let mut timing = TimingContext::new();
        assert!(timing.round_trip().is_none());

        timing.mark_phase(&LifecyclePhase::RequestSent);
        assert!(timing.round_trip().is_none());

        timing.mark_phase(&LifecyclePhase::ResponseReceived(200));
        assert!(timing.round_trip().is_some());
    }

    #[test]
    fn test_mark_offset() {
        let mut timing = TimingContext::new();
        timing.mark("custom");
        assert!(timing.mark_offset("custom").is_some());
        assert!(timing.mark_offset("missing").is_none());
    }
}
