//! Direct (single-call) path: forward the normalized request to the
//! provider and hand the result straight back, buffered or streamed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, info};

use chat_protocol::{ChatCompletionRequest, UpstreamPayload};

use crate::{
    routers::{error as router_error, streaming},
    upstream::{UpstreamClient, UpstreamError},
};

pub async fn execute(client: &UpstreamClient, request: &ChatCompletionRequest) -> Response {
    let payload = UpstreamPayload::from_request(request);

    if payload.stream {
        execute_streaming(client, &payload).await
    } else {
        execute_buffered(client, &payload).await
    }
}

/// Non-streaming: the upstream JSON body is returned verbatim with 200.
async fn execute_buffered(client: &UpstreamClient, payload: &UpstreamPayload) -> Response {
    match client.send_json(payload).await {
        Ok(body) => {
            info!(model = %payload.model, "Completed direct request");
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => router_error::upstream_error(e),
    }
}

async fn execute_streaming(client: &UpstreamClient, payload: &UpstreamPayload) -> Response {
    let response = match client.send(payload, true).await {
        Ok(r) => r,
        Err(e) => return router_error::upstream_error(e),
    };

    // A 2xx with an explicitly empty body cannot be relayed as a stream.
    if response.content_length() == Some(0) {
        return router_error::upstream_error(UpstreamError::NoResponseBody);
    }

    debug!(model = %payload.model, "Starting streaming relay");
    streaming::relay_response(response)
}
