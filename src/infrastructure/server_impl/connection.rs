use std::future::Future;
use std::io;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::Instrument;

use crate::application::ServerData;
use crate::infrastructure::server_impl::response::{Response, StatusCode};
use crate::infrastructure::server_impl::router::match_routes;
use crate::infrastructure::server_impl::server::parse_http;
use crate::AnyResult;

const READ_CHUNK: usize = 2048;
/// Pause after a failed accept, e.g. while out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts connections forever, one task per connection. A failed accept is logged and retried
/// after a short pause.
pub async fn serve(listener: TcpListener, server_data: ServerData) -> AnyResult<()> {
    tracing::info!(address = %listener.local_addr()?, "listening");

    loop {
        let (socket, peer) = accept_next(|| listener.accept()).await;

        let server_data = server_data.clone();
        tokio::spawn(
            async move {
                if let Err(err) = serve_connection(socket, &server_data).await {
                    tracing::warn!("connection dropped: {err}");
                }
            }
            .instrument(tracing::debug_span!("connection", %peer)),
        );
    }
}

async fn accept_next<T, F, Fut>(mut accept: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<T>>,
{
    loop {
        match accept().await {
            Ok(accepted) => return accepted,
            Err(err) => {
                tracing::error!("failed to accept connection: {err}");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

/// Serves exactly one request on `stream`, then shuts down the write half.
///
/// Bytes are accumulated until the request parses, so a head or body split over several TCP
/// segments is still read whole. A peer that closes before sending anything gets no response.
pub async fn serve_connection<S>(mut stream: S, server_data: &ServerData) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = BytesMut::with_capacity(READ_CHUNK);

    let response = loop {
        if buf.len() >= server_data.max_request_bytes {
            tracing::warn!(buffered = buf.len(), "request exceeds the size limit");
            break Response::from_status_code(StatusCode::PayloadTooLarge);
        }

        buf.reserve(READ_CHUNK);
        let read = tokio::time::timeout(server_data.read_timeout, stream.read_buf(&mut buf))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "peer sent nothing in time"))??;

        if read == 0 && buf.is_empty() {
            return Ok(());
        }

        match parse_http(&buf) {
            Ok(request) => {
                tracing::info!(method = ?request.method, resource = request.resource, "request");
                break match_routes(server_data, request).await;
            }
            Err(err) if err.is_incomplete() && read != 0 => continue,
            Err(err) => {
                tracing::warn!("bad request: {err}");
                break Response::from_status_code(StatusCode::BadRequest);
            }
        }
    };

    tracing::debug!(status = response.status_code.code(), "response");
    stream.write_all(&response.into_http()).await?;
    stream.shutdown().await
}
