//! Call timing
//!
//! Sample-collecting stopwatch used by the benchmark harness.
//!
//! Only synchronous calls can be measured; there is no async variant of
//! [`Timer::measure`].

use std::time::{Duration, Instant};

/// Labelled stopwatch that averages its samples
#[derive(Debug, Clone)]
pub struct Timer {
    label: String,
    samples: Vec<Duration>,
    started: Instant,
}

impl Timer {
    /// Create a timer; it starts running immediately
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            samples: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Restart the stopwatch
    pub fn start(&mut self) {
        self.started = Instant::now();
    }

    /// Record the time since the last `start` as a sample
    pub fn end(&mut self) -> Duration {
        let elapsed = self.started.elapsed();
        self.samples.push(elapsed);
        elapsed
    }

    /// Run `f`, recording how long it took
    pub fn measure<T, F: FnOnce() -> T>(&mut self, f: F) -> T {
        self.start();
        let out = f();
        self.end();
        out
    }

    /// Mean of all samples, zero if there are none
    pub fn avg(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    /// Mean in milliseconds with three decimals, e.g. `"0.012"`
    pub fn avg_millis(&self) -> String {
        format!("{:.3}", self.avg().as_secs_f64() * 1000.0)
    }

    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }
}
