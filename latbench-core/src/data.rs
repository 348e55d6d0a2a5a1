use crate::{summarize, StatsError, Summary};
use std::time::Duration;

/// Append-only sequence of latency samples, in nanoseconds, in the order they were taken.
///
/// A collector belongs to exactly one scenario run. It is filled one sample per successful
/// iteration and then handed to [`summarize`].
#[derive(Debug, Clone, Default)]
pub struct SampleCollector {
    samples: Vec<f64>,
}

impl SampleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, nanos: f64) {
        self.samples.push(nanos);
    }

    pub fn push_elapsed(&mut self, elapsed: Duration) {
        self.push(elapsed.as_nanos() as f64);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    pub fn summarize(&self) -> Result<Summary, StatsError> {
        summarize(&self.samples)
    }
}
