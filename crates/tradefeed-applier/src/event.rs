/// Emitted once per applied batch . The GUI, if present,
/// subscribes to this and otherwise reads through the tables' own
/// synchronous lookup API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchApplied {
    pub order_inserted: usize,
    pub order_updated: usize,
    pub order_deleted: usize,
    pub trade_inserted: usize,
    pub trade_updated: usize,
    pub trade_deleted: usize,
    /// Messages carried by the batch, including any upserts rejected
    /// for table capacity.
    pub total: usize,
    /// `apply_ts[last] - queue_ts[first]` .
    pub batch_latency_ms: i64,
}
