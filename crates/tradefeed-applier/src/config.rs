use std::time::Duration;

/// Batch release thresholds .
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    /// Release the batch once it reaches this many messages.
    pub batch_size: usize,
    /// Release the batch once this much time has elapsed since the
    /// last release, even if it hasn't reached `batch_size`.
    pub batch_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1_000,
            batch_timeout: Duration::from_millis(100),
        }
    }
}
