//! Latency reservoirs, percentile computation, and periodic CSV/summary
//! flush for the ingestion pipeline .

mod error;
mod host;
mod pipeline;
mod record;
mod reservoir;
mod sink;

pub use error::MetricsError;
pub use host::{HostSnapshot, HostStats};
pub use pipeline::{LatencyPercentiles, MetricsPipeline};
pub use record::{PerMessageRecord, CSV_HEADER};
pub use reservoir::{LatencyReservoir, RESERVOIR_CAPACITY};
pub use sink::{CsvFileSink, InMemorySink, MetricsSink};
