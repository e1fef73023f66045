//! TCP stream-socket listener .

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::handler::{run_connection, ConnectionContext};

/// Binds `0.0.0.0:port` and spawns one handler task per accepted
/// connection until `ctx.cancel` fires.
pub async fn serve_tcp(port: u16, ctx: ConnectionContext) -> Result<(), TransportError> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(TransportError::Bind)?;
    info!(port, "TCP listener bound");

    loop {
        tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => {
                debug!("TCP accept loop cancelled");
                return Ok(());
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "TCP connection accepted");
                        spawn_handler(stream, &ctx);
                    }
                    Err(err) => {
                        warn!(error = %err, "TCP accept failed");
                    }
                }
            }
        }
    }
}

fn spawn_handler(stream: tokio::net::TcpStream, ctx: &ConnectionContext) {
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
        let (read_half, _write_half) = stream.into_split();
        run_connection(read_half, sender, errors, buffer_size, cancel).await;
    });
}
