#![allow(dead_code)]

use std::time::{Duration, Instant};

pub use signalwatch_test_utils::builders::{ConfigFileBuilder, GroupBuilder, SignalBuilder};
pub use signalwatch_test_utils::recording_emitter::RecordingEmitter;
pub use signalwatch_test_utils::{batch, init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Fixed starting point so tests can talk about "t = 1.5s".
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn at(&self, secs: f64) -> Instant {
        self.start + Duration::from_secs_f64(secs)
    }
}
