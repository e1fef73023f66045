//! Flush destinations for per-message records and summary lines .
//!
//! `MetricsSink` is an object-safe trait (teacher's `SpanExporterBoxed`
//! shape, minus the async-trait indirection since flushing here is a
//! quick, synchronous local-file append) so tests can swap in an
//! in-memory sink while production wires up `CsvFileSink`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::error::MetricsError;
use crate::record::{PerMessageRecord, CSV_HEADER};

pub trait MetricsSink: Send + Sync {
    fn write_record(&self, record: &PerMessageRecord) -> Result<(), MetricsError>;
    fn write_summary(&self, line: &str) -> Result<(), MetricsError>;
    fn name(&self) -> &str;
}

/// Writes records to `metrics_YYYYMMDD_HHMMSS.csv` under a configured
/// directory , appending a `# SUMMARY ...` comment line every
/// 10 s.
pub struct CsvFileSink {
    writer: Mutex<csv::Writer<std::fs::File>>,
    raw_file: Mutex<std::fs::File>,
    path: PathBuf,
}

impl CsvFileSink {
    /// Creates (or truncates) the CSV file at `path`, writing the
    /// header immediately.
    pub fn create(path: PathBuf) -> Result<Self, MetricsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let raw_file = file.try_clone()?;
        let mut writer = csv::WriterBuilder::new().from_writer(file);
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;
        Ok(Self {
            writer: Mutex::new(writer),
            raw_file: Mutex::new(raw_file),
            path,
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl MetricsSink for CsvFileSink {
    fn write_record(&self, record: &PerMessageRecord) -> Result<(), MetricsError> {
        let mut writer = self.writer.lock();
        writer.write_record(record.to_csv_row())?;
        writer.flush()?;
        Ok(())
    }

    fn write_summary(&self, line: &str) -> Result<(), MetricsError> {
        let mut file = self.raw_file.lock();
        writeln!(file, "# SUMMARY {line}")?;
        file.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "csv_file"
    }
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct InMemorySink {
    records: Mutex<Vec<PerMessageRecord>>,
    summaries: Mutex<Vec<String>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<PerMessageRecord> {
        self.records.lock().clone()
    }

    pub fn summaries(&self) -> Vec<String> {
        self.summaries.lock().clone()
    }
}

impl MetricsSink for InMemorySink {
    fn write_record(&self, record: &PerMessageRecord) -> Result<(), MetricsError> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn write_summary(&self, line: &str) -> Result<(), MetricsError> {
        self.summaries.lock().push(line.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "in_memory"
    }
}
