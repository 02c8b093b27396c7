//! Wall-clock timing for a run.

use std::time::{Duration, Instant};

/// A started stopwatch.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Formats a duration as the report line printed at the end of a run.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("Query execution time: {:.4} seconds", elapsed.as_secs_f64())
}
