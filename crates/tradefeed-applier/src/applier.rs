//! Batch dispatch from the ingest channel to the order/trade tables
//! .
//!
//! Grounded on `span_collector::batch_processor::BatchProcessor`'s
//! size-or-timeout release rule, retargeted from span batches to wire
//! messages, and on `tradefeed-ring-stream`'s `RingReceiver::shutdown`
//! for draining the channel on the way out.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use tradefeed_codec::{now_ms, DataMessage, Op, ParseErrorCounter, Payload, Row, TableId};
use tradefeed_metrics::{MetricsPipeline, PerMessageRecord};
use tradefeed_ring_stream::{RingReceiver, StreamExt};
use tradefeed_table::Table;

use crate::config::BatchConfig;
use crate::event::BatchApplied;

/// Owns the two tables and dispatches applied batches to metrics and
/// to `BatchApplied` subscribers.
pub struct Applier {
    order_table: Arc<Table>,
    trade_table: Arc<Table>,
    config: BatchConfig,
    metrics: Option<MetricsPipeline>,
    events: tokio::sync::broadcast::Sender<BatchApplied>,
    errors: ParseErrorCounter,
}

impl Applier {
    pub fn new(
        order_table: Arc<Table>,
        trade_table: Arc<Table>,
        config: BatchConfig,
        metrics: Option<MetricsPipeline>,
        errors: ParseErrorCounter,
    ) -> Self {
        let (events, _) = tokio::sync::broadcast::channel(256);
        Self {
            order_table,
            trade_table,
            config,
            metrics,
            events,
            errors,
        }
    }

    /// Subscribes to `BatchApplied` notifications .
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<BatchApplied> {
        self.events.subscribe()
    }

    pub fn order_table(&self) -> &Arc<Table> {
        &self.order_table
    }

    pub fn trade_table(&self) -> &Arc<Table> {
        &self.trade_table
    }

    /// Consumes `receiver` until `cancel` fires, coalescing messages
    /// into batches released by size or timeout , then
    /// drains and applies one final batch on shutdown .
    pub async fn run(&self, mut receiver: RingReceiver<DataMessage>, cancel: CancellationToken) {
        let mut batch: Vec<DataMessage> = Vec::with_capacity(self.config.batch_size);
        let mut deadline = tokio::time::Instant::now() + self.config.batch_timeout;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    receiver.shutdown();
                    while let Some(msg) = receiver.next().await {
                        batch.push(msg);
                    }
                    if !batch.is_empty() {
                        self.apply_batch(std::mem::take(&mut batch));
                    }
                    return;
                }
                result = tokio::time::timeout_at(deadline, receiver.next()) => {
                    match result {
                        Ok(Some(msg)) => {
                            batch.push(msg);
                            if batch.len() >= self.config.batch_size {
                                self.apply_batch(std::mem::take(&mut batch));
                                deadline = tokio::time::Instant::now() + self.config.batch_timeout;
                            }
                        }
                        Ok(None) => {
                            if !batch.is_empty() {
                                self.apply_batch(std::mem::take(&mut batch));
                            }
                            return;
                        }
                        Err(_elapsed) => {
                            if !batch.is_empty() {
                                self.apply_batch(std::mem::take(&mut batch));
                            }
                            deadline = tokio::time::Instant::now() + self.config.batch_timeout;
                        }
                    }
                }
            }
        }
    }

    /// The critical section described in spec §4.5: per-message
    /// routing and staging, then one `batch_upsert` per table.
    ///
    /// Staging preserves arrival order and never pre-deduplicates by
    /// key: every Insert/Update message is passed through to
    /// `batch_upsert` (which already applies duplicates in order
    /// under one lock, so the later one wins), keeping each message
    /// attributed to its own inserted/updated counter. A `Delete`
    /// applies immediately and also strips any not-yet-applied staged
    /// row for the same key, so a later Delete in the batch correctly
    /// overrides an earlier staged Insert/Update for that key rather
    /// than being resurrected by the trailing `batch_upsert`.
    fn apply_batch(&self, mut batch: Vec<DataMessage>) {
        let total = batch.len();
        let first_queue_ts = batch.first().and_then(|m| m.queue_ts_ms).unwrap_or(0);

        let mut order_staging: Vec<Row> = Vec::new();
        let mut trade_staging: Vec<Row> = Vec::new();
        let mut order_deleted = 0usize;
        let mut trade_deleted = 0usize;

        let mut last_apply_ts = first_queue_ts;
        for message in &mut batch {
            let apply_ts = now_ms();
            message.apply_ts_ms = Some(apply_ts);
            last_apply_ts = apply_ts;

            match (&message.op, &message.payload) {
                (Op::Delete, Payload::Key(key)) => {
                    let deleted = match message.table {
                        TableId::OrderBook => self.order_table.delete(key),
                        TableId::TradeBook => self.trade_table.delete(key),
                    };
                    if deleted {
                        match message.table {
                            TableId::OrderBook => order_deleted += 1,
                            TableId::TradeBook => trade_deleted += 1,
                        }
                    }
                    match message.table {
                        TableId::OrderBook => order_staging.retain(|row| row[0].to_string() != *key),
                        TableId::TradeBook => trade_staging.retain(|row| row[0].to_string() != *key),
                    }
                }
                (Op::Insert | Op::Update, Payload::Row(payload)) => {
                    match tradefeed_codec::parse_row(message.table, payload) {
                        Some(row) => match message.table {
                            TableId::OrderBook => order_staging.push(row),
                            TableId::TradeBook => trade_staging.push(row),
                        },
                        None => self.errors.increment(),
                    }
                }
                _ => self.errors.increment(),
            }
        }

        let order_outcome = self.order_table.batch_upsert(order_staging);
        let trade_outcome = self.trade_table.batch_upsert(trade_staging);

        if order_outcome.rejected > 0 || trade_outcome.rejected > 0 {
            warn!(
                order_rejected = order_outcome.rejected,
                trade_rejected = trade_outcome.rejected,
                "batch_upsert rejected rows at table capacity"
            );
        }

        let event = BatchApplied {
            order_inserted: order_outcome.inserted,
            order_updated: order_outcome.updated,
            order_deleted,
            trade_inserted: trade_outcome.inserted,
            trade_updated: trade_outcome.updated,
            trade_deleted,
            total,
            batch_latency_ms: last_apply_ts - first_queue_ts,
        };
        let _ = self.events.send(event);

        if let Some(metrics) = &self.metrics {
            for message in &batch {
                if message.op == Op::Delete {
                    continue;
                }
                metrics.submit(record_for(message));
            }
        }
    }
}

fn record_for(message: &DataMessage) -> PerMessageRecord {
    let message_type = format!("{}.{}", message.table.as_str(), message.op.as_str());
    PerMessageRecord {
        timestamp_ms: message.apply_ts_ms.unwrap_or_else(now_ms),
        message_type,
        send_ts_ms: message.send_ts_ms,
        receive_ts_ms: message.receive_ts_ms.unwrap_or(0),
        queue_ts_ms: message.queue_ts_ms.unwrap_or(0),
        apply_ts_ms: message.apply_ts_ms.unwrap_or(0),
        render_start_ts_ms: None,
        render_end_ts_ms: None,
        queue_depth: 0,
        ui_render_queue_depth: 0,
        cpu_usage_percent: 0.0,
        memory_usage_bytes: 0,
        gen0_collections: 0,
        gen1_collections: 0,
        gen2_collections: 0,
    }
}
