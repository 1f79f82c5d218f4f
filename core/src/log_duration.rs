use std::time::{Duration, Instant};

/// Scope guard that logs how long it lived.
///
/// On drop it emits a `tracing` info event carrying `operation` and
/// `elapsed_ms`. Usually created through [`log_duration!`](crate::log_duration!).
#[derive(Debug)]
pub struct LogDuration {
    operation: String,
    start: Instant,
}

impl LogDuration {
    pub fn new<S: Into<String>>(operation: S) -> Self {
        Self { operation: operation.into(), start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for LogDuration {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        tracing::info!(
            operation = %self.operation,
            elapsed_ms = elapsed.as_millis() as u64,
            "operation finished"
        );
    }
}

/// Time the rest of the enclosing scope.
#[macro_export]
macro_rules! log_duration {
    ($operation:expr) => {
        let _log_duration_guard = $crate::log_duration::LogDuration::new($operation);
    };
}
