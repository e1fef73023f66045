use thiserror::Error;

/// Public API errors .
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
    /// Insert attempted at or beyond the 2,000,000-slot cap .
    #[error("capacity exceeded: table already holds {capacity} slots")]
    CapacityExceeded { capacity: usize },
}
