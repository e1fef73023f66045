//! The metrics pipeline: per-message reservoirs, periodic CSV flush,
//! periodic summary line, and the `Stopped -> Running -> Stopped`
//! lifecycle .
//!
//! Grounded on `span_collector::async_bridge::AsyncSpanCollector`'s
//! `tokio::time::interval` consumer loop: the 1 s/10 s timers here
//! play the same role as that crate's export-consumer task, retargeted
//! from "spans -> exporter" to "latency records -> CSV sink". The
//! pending-record queue reuses `tradefeed_ring::Channel` directly
//! (lock-free, single consumer) rather than re-implementing one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use tradefeed_ring::{Channel, Config, Producer};

use crate::host::HostStats;
use crate::record::PerMessageRecord;
use crate::reservoir::LatencyReservoir;
use crate::sink::MetricsSink;

const FLUSH_INTERVAL: Duration = Duration::from_secs(1);
const SUMMARY_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Default)]
struct SummaryCounters {
    records_flushed: AtomicU64,
    flush_errors: AtomicU64,
}

struct Inner {
    channel: Channel<PerMessageRecord>,
    producer: Producer<PerMessageRecord>,
    end_to_end: LatencyReservoir,
    processing: LatencyReservoir,
    render: LatencyReservoir,
    latest_render: Mutex<Option<(i64, i64)>>,
    sink: Arc<dyn MetricsSink>,
    host: HostStats,
    counters: SummaryCounters,
}

/// Thread-safe handle to the metrics pipeline; cheap to clone and
/// share across the transport, applier, and server shutdown path.
#[derive(Clone)]
pub struct MetricsPipeline {
    inner: Arc<Inner>,
    cancel: CancellationToken,
    running: Arc<AtomicBool>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl MetricsPipeline {
    pub fn new(sink: Arc<dyn MetricsSink>) -> Self {
        // A single dedicated producer is enough: the applier is the
        // only submitter. A smaller ring than the default keeps this
        // bookkeeping queue from allocating 16 unused 64K rings.
        let channel = Channel::new(Config::new(14, 1, false));
        let producer = channel
            .register()
            .expect("metrics pipeline is the only registrant and cannot exceed max_producers");
        Self {
            inner: Arc::new(Inner {
                channel,
                producer,
                end_to_end: LatencyReservoir::new(),
                processing: LatencyReservoir::new(),
                render: LatencyReservoir::new(),
                latest_render: Mutex::new(None),
                sink,
                host: HostStats::new(),
                counters: SummaryCounters::default(),
            }),
            cancel: CancellationToken::new(),
            running: Arc::new(AtomicBool::new(false)),
            tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Enqueues a record for the next flush . Best-effort: a
    /// full queue silently drops the record rather than blocking the
    /// applier .
    pub fn submit(&self, mut record: PerMessageRecord) {
        if record.render_start_ts_ms.is_none() {
            if let Some((start, end)) = *self.inner.latest_render.lock() {
                record.render_start_ts_ms = Some(start);
                record.render_end_ts_ms = Some(end);
            }
        }
        if !self.inner.producer.push(record) {
            warn!("metrics pipeline queue full, dropping record");
        }
    }

    /// Called by the external (GUI) consumer to report the render
    /// window for messages rendered since the previous call (spec
    /// §4.8: "Render timestamps are supplied by the external consumer
    /// via `update_render_timing(start, end)`").
    pub fn update_render_timing(&self, render_start_ms: i64, render_end_ms: i64) {
        *self.inner.latest_render.lock() = Some((render_start_ms, render_end_ms));
    }

    pub fn percentiles(&self) -> LatencyPercentiles {
        LatencyPercentiles {
            end_to_end_p50: self.inner.end_to_end.p50(),
            end_to_end_p95: self.inner.end_to_end.p95(),
            end_to_end_p99: self.inner.end_to_end.p99(),
            processing_p50: self.inner.processing.p50(),
            processing_p95: self.inner.processing.p95(),
            processing_p99: self.inner.processing.p99(),
            render_p50: self.inner.render.p50(),
            render_p95: self.inner.render.p95(),
            render_p99: self.inner.render.p99(),
        }
    }

    /// `Stopped -> Running`: spawns the 1 s flush and 10 s summary
    /// timer tasks.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        let flush_handle = tokio::spawn(Self::flush_loop(self.clone()));
        let summary_handle = tokio::spawn(Self::summary_loop(self.clone()));
        *self.tasks.lock() = vec![flush_handle, summary_handle];
    }

    /// `Running -> Stopped`: cancels the timers and performs one final
    /// flush .
    pub async fn dispose(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        self.cancel.cancel();
        let handles: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
        self.flush_once();
        self.summary_once();
    }

    async fn flush_loop(self_: MetricsPipeline) {
        let mut ticker = tokio::time::interval(FLUSH_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => self_.flush_once(),
                _ = self_.cancel.cancelled() => break,
            }
        }
    }

    async fn summary_loop(self_: MetricsPipeline) {
        let mut ticker = tokio::time::interval(SUMMARY_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => self_.summary_once(),
                _ = self_.cancel.cancelled() => break,
            }
        }
    }

    fn flush_once(&self) {
        self.inner.host.refresh();
        let snapshot = self.inner.host.snapshot();
        let (gen0, gen1, gen2) = HostStats::gc_generations();

        self.inner.channel.consume_all_owned(|mut record| {
            record.cpu_usage_percent = snapshot.cpu_usage_percent;
            record.memory_usage_bytes = snapshot.memory_usage_bytes;
            record.gen0_collections = gen0;
            record.gen1_collections = gen1;
            record.gen2_collections = gen2;

            self.inner.processing.record(record.processing_latency_ms());
            if let Some(e2e) = record.end_to_end_latency_ms() {
                self.inner.end_to_end.record(e2e);
            }
            if let Some(r) = record.render_latency_ms() {
                self.inner.render.record(r);
            }

            match self.inner.sink.write_record(&record) {
                Ok(()) => {
                    self.inner.counters.records_flushed.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    self.inner.counters.flush_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %err, "metrics flush failed");
                }
            }
        });
    }

    fn summary_once(&self) {
        let p = self.percentiles();
        let flushed = self.inner.counters.records_flushed.load(Ordering::Relaxed);
        let errors = self.inner.counters.flush_errors.load(Ordering::Relaxed);
        let line = format!(
            "records={flushed} errors={errors} e2e_p50={:.1} e2e_p95={:.1} e2e_p99={:.1} \
             proc_p50={:.1} proc_p95={:.1} proc_p99={:.1} render_p50={:.1} render_p95={:.1} render_p99={:.1}",
            p.end_to_end_p50,
            p.end_to_end_p95,
            p.end_to_end_p99,
            p.processing_p50,
            p.processing_p95,
            p.processing_p99,
            p.render_p50,
            p.render_p95,
            p.render_p99,
        );
        if let Err(err) = self.inner.sink.write_summary(&line) {
            warn!(error = %err, "metrics summary write failed");
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencyPercentiles {
    pub end_to_end_p50: f64,
    pub end_to_end_p95: f64,
    pub end_to_end_p99: f64,
    pub processing_p50: f64,
    pub processing_p95: f64,
    pub processing_p99: f64,
    pub render_p50: f64,
    pub render_p95: f64,
    pub render_p99: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::InMemorySink;

    fn sample(apply_ts: i64, receive_ts: i64) -> PerMessageRecord {
        PerMessageRecord {
            timestamp_ms: apply_ts,
            message_type: "OrderBook.Insert".to_string(),
            send_ts_ms: 0,
            receive_ts_ms: receive_ts,
            queue_ts_ms: receive_ts,
            apply_ts_ms: apply_ts,
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

    #[tokio::test]
    async fn flush_once_drains_queue_into_sink_and_reservoirs() {
        let sink = Arc::new(InMemorySink::new());
        let pipeline = MetricsPipeline::new(sink.clone());
        pipeline.submit(sample(120, 100));
        pipeline.submit(sample(130, 100));

        pipeline.flush_once();

        assert_eq!(sink.records().len(), 2);
        assert_eq!(pipeline.percentiles().processing_p50, 25.0);
    }

    #[tokio::test]
    async fn update_render_timing_latches_onto_subsequent_submissions() {
        let sink = Arc::new(InMemorySink::new());
        let pipeline = MetricsPipeline::new(sink.clone());
        pipeline.update_render_timing(200, 210);
        pipeline.submit(sample(120, 100));
        pipeline.flush_once();

        let records = sink.records();
        assert_eq!(records[0].render_start_ts_ms, Some(200));
        assert_eq!(records[0].render_end_ts_ms, Some(210));
    }

    #[tokio::test]
    async fn dispose_without_start_is_a_no_op() {
        let sink = Arc::new(InMemorySink::new());
        let pipeline = MetricsPipeline::new(sink);
        pipeline.dispose().await;
        assert!(!pipeline.is_running());
    }
}
