//! Batches decoded wire events and dispatches them to the order/trade
//! tables, emitting a `BatchApplied` summary per release .

mod applier;
mod config;
mod event;

pub use applier::Applier;
pub use config::BatchConfig;
pub use event::BatchApplied;
