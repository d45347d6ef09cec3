//! Streaming relay for upstream event streams.
//!
//! Moves upstream bytes to the client chunk by chunk, without buffering
//! the payload and without re-framing: each chunk is forwarded in arrival
//! order exactly as received. Once the 200 and the stream headers are
//! committed, a mid-stream upstream failure can no longer change the
//! status line, so it is signaled in-band: one synthetic terminal SSE
//! data line, then a clean close.

use std::{
    convert::Infallible,
    fmt,
    pin::Pin,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use bytes::Bytes;
use futures::Stream;
use tracing::{error, warn};

use crate::routers::error as router_error;

/// Terminal event written when the upstream stream fails mid-flight.
pub const INTERRUPTED_EVENT: &str = "data: {\"error\": \"Streaming interrupted\"}\n\n";

/// Stream adapter that forwards upstream chunks and converts the first
/// upstream error into [`INTERRUPTED_EVENT`] followed by end-of-stream.
///
/// The client-facing body itself never errors, so a broken upstream can
/// not tear down the connection machinery uncleanly. Dropping the adapter
/// (client disconnect) drops the inner upstream stream, aborting the read.
pub struct RelayStream<S> {
    inner: Pin<Box<S>>,
    terminated: bool,
}

impl<S> RelayStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: Box::pin(inner),
            terminated: false,
        }
    }
}

impl<S, E> Stream for RelayStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.terminated {
            return Poll::Ready(None);
        }

        match self.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(Some(Err(e))) => {
                warn!(error = %e, "Upstream stream interrupted");
                self.terminated = true;
                Poll::Ready(Some(Ok(Bytes::from_static(INTERRUPTED_EVENT.as_bytes()))))
            }
            Poll::Ready(None) => {
                self.terminated = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Wrap a confirmed-2xx upstream response into the client-facing stream
/// response.
///
/// Headers are committed here — after the status check, before the first
/// chunk. CORS headers come from the layer wrapping the router.
pub fn relay_response(upstream: reqwest::Response) -> Response {
    let stream = RelayStream::new(upstream.bytes_stream());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|e| {
            error!("Failed to build streaming response: {}", e);
            router_error::internal_error("Failed to build streaming response")
        })
}
