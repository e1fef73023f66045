use thiserror::Error;

/// Metrics-pipeline errors. These are always best-effort at the call
/// site (spec §7: "IOError (metrics/logs) — best-effort; swallowed to
/// protect the hot path") — callers log and move on rather than
/// propagate.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metrics sink I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv encoding error: {0}")]
    Csv(#[from] csv::Error),
}
