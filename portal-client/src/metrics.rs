use anyhow::Result;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct SessionMetrics {
    registry: Registry,
    transitions: IntCounterVec,
    decode_failures: IntCounter,
}

impl SessionMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let transitions = IntCounterVec::new(
            Opts::new(
                "portal_session_transitions_total",
                "Count of session transitions grouped by event",
            ),
            &["event"],
        )?;
        registry.register(Box::new(transitions.clone()))?;

        let decode_failures = IntCounter::new(
            "portal_session_decode_failures_total",
            "Session tokens discarded because they could not be decoded",
        )?;
        registry.register(Box::new(decode_failures.clone()))?;

        Ok(Self {
            registry,
            transitions,
            decode_failures,
        })
    }

    pub fn transition(&self, event: &str) {
        self.transitions.with_label_values(&[event]).inc();
    }

    pub fn transition_count(&self, event: &str) -> u64 {
        self.transitions.with_label_values(&[event]).get()
    }

    pub fn decode_failure(&self) {
        self.decode_failures.inc();
    }

    pub fn decode_failure_count(&self) -> u64 {
        self.decode_failures.get()
    }

    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
