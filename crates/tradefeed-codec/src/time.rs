use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, used for every `*_ts_ms` stamp
/// (`send`, `receive`, `queue`, `apply`) threaded through a `DataMessage`.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_millis() as i64
}
