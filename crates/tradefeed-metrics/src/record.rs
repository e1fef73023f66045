//! Per-message latency record, matching the metrics CSV schema .

/// One row of the metrics CSV .
///
/// Render timestamps are `None` until the external consumer calls
/// [`crate::MetricsPipeline::update_render_timing`]  — this implementation resolves that open-ended
/// contract by latching the most recently announced render window
/// onto records as they are submitted; a record submitted before any
/// render timing has ever been announced keeps `None` and is written
/// with zeroed render columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PerMessageRecord {
    pub timestamp_ms: i64,
    pub message_type: String,
    pub send_ts_ms: i64,
    pub receive_ts_ms: i64,
    pub queue_ts_ms: i64,
    pub apply_ts_ms: i64,
    pub render_start_ts_ms: Option<i64>,
    pub render_end_ts_ms: Option<i64>,
    pub queue_depth: u64,
    pub ui_render_queue_depth: u64,
    pub cpu_usage_percent: f32,
    pub memory_usage_bytes: u64,
    pub gen0_collections: u64,
    pub gen1_collections: u64,
    pub gen2_collections: u64,
}

impl PerMessageRecord {
    /// `processing = apply - receive` ; always available.
    pub fn processing_latency_ms(&self) -> i64 {
        self.apply_ts_ms - self.receive_ts_ms
    }

    /// `end_to_end = render_end - send`; `None` if render timing was
    /// never supplied.
    pub fn end_to_end_latency_ms(&self) -> Option<i64> {
        self.render_end_ts_ms.map(|end| end - self.send_ts_ms)
    }

    /// `render = render_end - render_start`; `None` if render timing
    /// was never supplied.
    pub fn render_latency_ms(&self) -> Option<i64> {
        match (self.render_start_ts_ms, self.render_end_ts_ms) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// CSV row in the exact column order of the metrics schema .
    pub fn to_csv_row(&self) -> Vec<String> {
        vec![
            self.timestamp_ms.to_string(),
            self.message_type.clone(),
            self.send_ts_ms.to_string(),
            self.receive_ts_ms.to_string(),
            self.queue_ts_ms.to_string(),
            self.apply_ts_ms.to_string(),
            self.render_start_ts_ms.unwrap_or(0).to_string(),
            self.render_end_ts_ms.unwrap_or(0).to_string(),
            self.end_to_end_latency_ms().unwrap_or(0).to_string(),
            self.processing_latency_ms().to_string(),
            self.render_latency_ms().unwrap_or(0).to_string(),
            self.queue_depth.to_string(),
            self.ui_render_queue_depth.to_string(),
            self.cpu_usage_percent.to_string(),
            self.memory_usage_bytes.to_string(),
            self.gen0_collections.to_string(),
            self.gen1_collections.to_string(),
            self.gen2_collections.to_string(),
        ]
    }
}

/// Column header, in order, for the metrics CSV .
pub const CSV_HEADER: [&str; 18] = [
    "Timestamp",
    "MessageType",
    "SendTimestamp",
    "ReceiveTimestamp",
    "QueueTimestamp",
    "ApplyTimestamp",
    "RenderStartTimestamp",
    "RenderEndTimestamp",
    "EndToEndLatency",
    "ProcessingLatency",
    "RenderLatency",
    "QueueDepth",
    "UIRenderQueueDepth",
    "CPUUsage",
    "MemoryUsage",
    "Gen0Collections",
    "Gen1Collections",
    "Gen2Collections",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PerMessageRecord {
        PerMessageRecord {
            timestamp_ms: 1_000,
            message_type: "OrderBook.Insert".to_string(),
            send_ts_ms: 100,
            receive_ts_ms: 110,
            queue_ts_ms: 115,
            apply_ts_ms: 130,
            render_start_ts_ms: Some(140),
            render_end_ts_ms: Some(150),
            queue_depth: 3,
            ui_render_queue_depth: 0,
            cpu_usage_percent: 12.5,
            memory_usage_bytes: 4096,
            gen0_collections: 0,
            gen1_collections: 0,
            gen2_collections: 0,
        }
    }

    #[test]
    fn derives_latencies_when_render_timing_present() {
        let record = sample();
        assert_eq!(record.processing_latency_ms(), 20);
        assert_eq!(record.end_to_end_latency_ms(), Some(50));
        assert_eq!(record.render_latency_ms(), Some(10));
    }

    #[test]
    fn missing_render_timing_degrades_to_zero_in_csv() {
        let mut record = sample();
        record.render_start_ts_ms = None;
        record.render_end_ts_ms = None;
        assert_eq!(record.end_to_end_latency_ms(), None);
        let row = record.to_csv_row();
        assert_eq!(row[6], "0");
        assert_eq!(row[7], "0");
        assert_eq!(row[8], "0");
        assert_eq!(row[10], "0");
    }
}
