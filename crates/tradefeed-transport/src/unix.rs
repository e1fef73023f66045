//! Local named byte-stream listener .
//!
//! A Unix domain socket stands in for the platform-native multi-instance
//! local channel (e.g. a named pipe) this spec describes: on POSIX,
//! binding one path and accepting up to `max_instances` concurrent
//! connections on it is the idiomatic equivalent of a named-pipe server
//! with a fixed instance count.

use std::sync::Arc;

use tokio::net::UnixListener;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::handler::{run_connection, ConnectionContext};

pub async fn serve_unix(
    socket_path: &str,
    max_instances: usize,
    ctx: ConnectionContext,
) -> Result<(), TransportError> {
    let _ = std::fs::remove_file(socket_path);
    let listener = UnixListener::bind(socket_path).map_err(TransportError::Bind)?;
    info!(socket_path, max_instances, "local socket listener bound");

    let instances = Arc::new(Semaphore::new(max_instances));

    loop {
        tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => {
                debug!("local socket accept loop cancelled");
                let _ = std::fs::remove_file(socket_path);
                return Ok(());
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let Ok(permit) = Arc::clone(&instances).try_acquire_owned() else {
                            warn!(max_instances, "local socket at max concurrent instances, rejecting connection");
                            drop(stream);
                            continue;
                        };
                        debug!("local socket connection accepted");
                        spawn_handler(stream, &ctx, permit);
                    }
                    Err(err) => {
                        warn!(error = %err, "local socket accept failed");
                    }
                }
            }
        }
    }
}

fn spawn_handler(
    stream: tokio::net::UnixStream,
    ctx: &ConnectionContext,
    permit: tokio::sync::OwnedSemaphorePermit,
) {
    let sender = match ctx.senders.register() {
        Ok(sender) => sender,
        Err(err) => {
            warn!(error = %err, "failed to register ingest sender for new connection");
            return;
        }
    };
    let errors = ctx.errors.clone();
    let buffer_size = ctx.buffer_size;
    let cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        let _permit = permit;
        let (read_half, _write_half) = stream.into_split();
        run_connection(read_half, sender, errors, buffer_size, cancel).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tradefeed_codec::{DataMessage, ParseErrorCounter};
    use tradefeed_ring::Config;
    use tradefeed_ring_stream::channel;

    #[tokio::test]
    async fn accepts_a_connection_and_forwards_a_decoded_message() {
        let (factory, mut rx) = channel::<DataMessage>(Config::new(12, 4, false));
        let cancel = CancellationToken::new();
        let ctx = ConnectionContext {
            errors: ParseErrorCounter::new(),
            senders: Arc::new(factory),
            buffer_size: 8192,
            cancel: cancel.clone(),
        };

        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");
        let socket_path_str = socket_path.to_str().unwrap().to_string();

        let serve_ctx = ctx.clone();
        let path_for_server = socket_path_str.clone();
        let serve =
            tokio::spawn(async move { serve_unix(&path_for_server, 4, serve_ctx).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        let mut stream = tokio::net::UnixStream::connect(&socket_path_str)
            .await
            .unwrap();
        stream
            .write_all(b"TradeBook,Delete,1000,TRD1\n")
            .await
            .unwrap();

        use tokio_stream::StreamExt;
        let msg = tokio::time::timeout(Duration::from_secs(1), rx.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(msg.delete_key(), Some("TRD1"));

        cancel.cancel();
        let _ = serve.await;
    }
}
