//! Request gateway: validation, mode selection, and dispatch to the
//! direct passthrough or the Chain-of-Draft orchestrator.

pub mod direct;
pub mod draft;
pub mod error;
pub mod streaming;

use axum::response::Response;
use serde_json::Value;
use tracing::{error, info};

use chat_protocol::ChatCompletionRequest;

use crate::{server::AppState, upstream::UpstreamClient};

/// How one request will be served. Decided exactly once, before any
/// upstream call; there is no mid-flight mode switching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Single upstream call, buffered or streaming passthrough
    Direct,
    /// Two-stage Chain-of-Draft orchestration, always non-streaming upstream
    Staged,
}

impl RequestMode {
    pub fn of(request: &ChatCompletionRequest) -> Self {
        if request.enhanced_cod_mode {
            RequestMode::Staged
        } else {
            RequestMode::Direct
        }
    }
}

/// Handle one parsed chat-completions body end to end.
pub async fn handle_chat(state: &AppState, body: Value) -> Response {
    let Some(api_key) = state.config.api_key.as_deref() else {
        error!("Rejecting request: upstream API key not configured");
        return error::server_configuration_error();
    };

    if !has_required_fields(&body) {
        error!(
            model = body.get("model").is_some(),
            messages = body.get("messages").is_some(),
            "Missing required fields in request"
        );
        return error::bad_request("Missing required fields: model and messages");
    }

    let request: ChatCompletionRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => return error::bad_request(format!("Invalid request body: {e}")),
    };

    let mode = RequestMode::of(&request);
    info!(
        model = %request.model,
        message_count = request.messages.len(),
        stream = request.stream,
        mode = ?mode,
        tools_enabled = request.tools.as_ref().is_some_and(|t| !t.is_empty()),
        "Processing chat completions request"
    );

    let client = UpstreamClient::new(
        state.client.clone(),
        state.config.upstream_url.clone(),
        api_key,
    );

    match mode {
        RequestMode::Direct => direct::execute(&client, &request).await,
        RequestMode::Staged => draft::execute(&client, &request).await,
    }
}

/// `model` must be a non-empty string and `messages` an array; checked on
/// the raw JSON so the error fires before typed parsing and before any
/// upstream traffic.
fn has_required_fields(body: &Value) -> bool {
    let model_ok = body
        .get("model")
        .and_then(Value::as_str)
        .is_some_and(|model| !model.is_empty());
    let messages_ok = body.get("messages").is_some_and(Value::is_array);
    model_ok && messages_ok
}
