//! HTTP transport to the upstream inference provider.
//!
//! One endpoint, one credential, no retries: a single upstream failure is
//! final for the request that triggered it.

use reqwest::{header, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use chat_protocol::UpstreamPayload;

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Non-2xx from the provider; status and raw body surface untransformed.
    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request to upstream failed: {0}")]
    Request(#[from] reqwest::Error),

    /// 2xx streaming response with an explicitly empty body.
    #[error("no response body from upstream")]
    NoResponseBody,
}

/// Client for the single upstream chat-completions endpoint.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    chat_url: String,
    api_key: String,
}

impl UpstreamClient {
    pub fn new(
        http: reqwest::Client,
        chat_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            chat_url: chat_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Send the payload upstream. 2xx responses come back as the live
    /// `reqwest::Response`; everything else folds into [`UpstreamError`].
    pub async fn send(
        &self,
        payload: &UpstreamPayload,
        streaming: bool,
    ) -> Result<reqwest::Response, UpstreamError> {
        let mut builder = self
            .http
            .post(&self.chat_url)
            .bearer_auth(&self.api_key)
            .json(payload);
        if streaming {
            builder = builder.header(header::ACCEPT, "text/event-stream");
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(url = %self.chat_url, status = %status, "Received upstream response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = %status,
                body_preview = %body.chars().take(200).collect::<String>(),
                "Upstream error"
            );
            return Err(UpstreamError::Status { status, body });
        }

        Ok(response)
    }

    /// Non-streaming call, fully buffered and parsed.
    pub async fn send_json(&self, payload: &UpstreamPayload) -> Result<Value, UpstreamError> {
        let response = self.send(payload, false).await?;
        Ok(response.json().await?)
    }
}
