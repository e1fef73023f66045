//! TCP and local-socket listeners that decode wire frames and push them
//! onto the ingest channel .
//!
//! Grounded on `tradefeed-ring-stream`'s `channel`/`SenderFactory` API
//! for backpressured producer registration, and on
//! `span_collector::async_bridge`'s `tokio::spawn`-per-task pattern for
//! one task per accepted connection.

mod config;
mod error;
mod handler;
mod tcp;
mod unix;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;

use tradefeed_codec::{DataMessage, ParseErrorCounter};
use tradefeed_ring_stream::SenderFactory;

pub use config::TransportConfig;
pub use error::TransportError;
pub use handler::{run_connection, ConnectionContext};

/// Spawns both listener accept-loops and returns their join handles.
/// Shutdown is driven entirely by `cancel`; this function itself never
/// blocks.
pub fn spawn_listeners(
    config: TransportConfig,
    senders: SenderFactory<DataMessage>,
    errors: ParseErrorCounter,
    cancel: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let ctx = ConnectionContext {
        errors,
        senders: Arc::new(senders),
        buffer_size: config.buffer_size,
        cancel: cancel.clone(),
    };

    let tcp_ctx = ctx.clone();
    let tcp_port = config.tcp_port;
    let tcp_handle = tokio::spawn(async move {
        if let Err(err) = tcp::serve_tcp(tcp_port, tcp_ctx).await {
            error!(error = %err, "TCP listener exited");
        }
    });

    let unix_ctx = ctx;
    let socket_path = config.socket_path;
    let max_instances = config.max_local_instances;
    let unix_handle = tokio::spawn(async move {
        if let Err(err) = unix::serve_unix(&socket_path, max_instances, unix_ctx).await {
            error!(error = %err, "local socket listener exited");
        }
    });

    vec![tcp_handle, unix_handle]
}
