//! Codec error taxonomy and the shared parse-error counter .

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("frame has fewer than 4 comma-separated parts: {0:?}")]
    MalformedFrame(String),
    #[error("unparseable send timestamp: {0:?}")]
    BadSendTimestamp(String),
    #[error("row payload has wrong field count (expected 50): {0}")]
    WrongFieldCount(usize),
}

/// Process-wide counter every transport handler and the applier
/// increment on a parse failure, satisfying "every failed parse is
/// counted" across all producers .
#[derive(Debug, Clone, Default)]
pub struct ParseErrorCounter(Arc<AtomicU64>);

impl ParseErrorCounter {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU64::new(0)))
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}
