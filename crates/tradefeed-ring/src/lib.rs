//! Ring-decomposed lock-free Multi-Producer Single-Consumer channel.
//!
//! Each registered producer owns a dedicated SPSC ring buffer, which
//! eliminates producer-producer contention entirely. This is the queue
//! primitive underneath the ingestion pipeline: every transport
//! connection registers a producer, and the single applier consumes
//! across all of them in round-robin order.
//!
//! # Example
//!
//! ```
//! use tradefeed_ring::{Channel, Config};
//!
//! let channel = Channel::<u64>::new(Config::default());
//! let producer = channel.register().unwrap();
//! producer.push(42);
//!
//! let consumed = channel.consume_all(|item: &u64| {
//!     println!("received: {item}");
//! });
//! assert_eq!(consumed, 1);
//! ```

mod backoff;
mod channel;
mod config;
mod invariants;
mod metrics;
mod reservation;
mod ring;
#[cfg(feature = "stack-ring")]
mod stack_channel;
#[cfg(feature = "stack-ring")]
mod stack_ring;

pub use backoff::Backoff;
pub use channel::{Channel, ChannelError, Producer};
pub use config::{Config, HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG};
pub use metrics::Metrics;
pub use reservation::Reservation;
pub use ring::Ring;
#[cfg(feature = "stack-ring")]
pub use stack_channel::StackChannel;
#[cfg(feature = "stack-ring")]
pub use stack_ring::StackRing;
