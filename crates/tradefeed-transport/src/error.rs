use thiserror::Error;

/// A connection-level failure . Listeners log this and keep accepting; it never
/// propagates past a single handler task.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ingest channel closed")]
    ChannelClosed,
}
