//! One task per accepted connection . Grounded on
//! `span_collector::async_bridge`'s per-task consumer loop, retargeted
//! from exporting spans to decoding wire frames.

use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use tradefeed_codec::{now_ms, DataMessage, Framer, ParseErrorCounter};
use tradefeed_ring_stream::RingSender;

/// Reads frames off `stream` until it disconnects or `cancel` fires,
/// stamping `receive_ts_ms`/`queue_ts_ms` and forwarding each decoded
/// message into `sender`. Returns cleanly either way .
pub async fn run_connection<S>(
    mut stream: S,
    mut sender: RingSender<DataMessage>,
    errors: ParseErrorCounter,
    buffer_size: usize,
    cancel: CancellationToken,
) where
    S: tokio::io::AsyncRead + Unpin,
{
    let mut framer = Framer::new(errors);
    let mut buf = vec![0u8; buffer_size];

    loop {
        let n = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("connection handler cancelled");
                return;
            }
            result = stream.read(&mut buf) => match result {
                Ok(0) => {
                    debug!("peer disconnected");
                    return;
                }
                Ok(n) => n,
                Err(err) => {
                    warn!(error = %err, "connection read failed");
                    return;
                }
            },
        };

        for mut message in framer.push_bytes(&buf[..n]) {
            let receive_ts = now_ms();
            message.receive_ts_ms = Some(receive_ts);
            message.queue_ts_ms = Some(now_ms());
            if send_with_cancellation(&mut sender, message, &cancel).await.is_err() {
                return;
            }
        }
    }
}

async fn send_with_cancellation(
    sender: &mut RingSender<DataMessage>,
    message: DataMessage,
    cancel: &CancellationToken,
) -> Result<(), ()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(()),
        result = sender.send(message) => result.map_err(|err| {
            warn!(error = %err, "failed to enqueue decoded message, dropping");
        }),
    }
}

/// Convenience wrapper bundling what every listener needs to spawn a
/// handler: the shared process-wide parse-error counter and the sender
/// factory each accepted connection registers its own `RingSender` from.
#[derive(Clone)]
pub struct ConnectionContext {
    pub errors: ParseErrorCounter,
    pub senders: Arc<tradefeed_ring_stream::SenderFactory<DataMessage>>,
    pub buffer_size: usize,
    pub cancel: CancellationToken,
}
