//! Single-stage execution: message-list construction, stage overrides,
//! the upstream call, and section parsing of the returned text.

use serde_json::Value;
use tracing::debug;

use chat_protocol::{ChatCompletionRequest, ChatMessage, UpstreamPayload, Usage};

use crate::{config::DRAFT_MODEL, upstream::UpstreamClient};

use super::prompts::SECTION_SEPARATOR;

/// Token budget for a stage when the caller did not set one.
pub(crate) const STAGE_DEFAULT_MAX_TOKENS: u32 = 8192;

/// Per-stage parameters chosen by the orchestrator.
pub(crate) struct StageSpec<'a> {
    pub name: &'static str,
    pub system_prompt: &'a str,
    pub temperature: f32,
    pub max_tokens_ceiling: u32,
    /// Stands in for the answer segment when the separator is missing
    pub missing_answer_placeholder: &'static str,
}

/// What one stage produced. Immutable once built; request-scoped.
pub(crate) struct StageOutcome {
    pub thinking: String,
    pub answer: String,
    pub usage: Option<Usage>,
}

/// A stage failure, carried as text so the orchestrator can surface one
/// error naming the stage. Nothing escapes a stage any other way.
pub(crate) type StageError = String;

pub(crate) async fn run_stage(
    client: &UpstreamClient,
    request: &ChatCompletionRequest,
    stage: &StageSpec<'_>,
    history: &[ChatMessage],
) -> Result<StageOutcome, StageError> {
    let payload = build_stage_payload(request, stage, history);

    let body = client
        .send_json(&payload)
        .await
        .map_err(|e| e.to_string())?;

    let content = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| "upstream response missing message content".to_string())?
        .to_string();

    let usage = body
        .get("usage")
        .cloned()
        .and_then(|u| serde_json::from_value::<Usage>(u).ok());

    debug!(
        stage = stage.name,
        content_len = content.len(),
        has_usage = usage.is_some(),
        "Stage completed"
    );

    let (thinking, answer) = split_sections(&content, stage.missing_answer_placeholder);

    Ok(StageOutcome {
        thinking,
        answer,
        usage,
    })
}

/// Normalize the caller's request, then force the stage overrides: pinned
/// model, the stage system prompt followed by the history with prior
/// system turns removed, stage temperature, clamped token budget, and
/// stream always off.
fn build_stage_payload(
    request: &ChatCompletionRequest,
    stage: &StageSpec<'_>,
    history: &[ChatMessage],
) -> UpstreamPayload {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(stage.system_prompt));
    messages.extend(history.iter().filter(|m| !m.is_system()).cloned());

    let mut payload = UpstreamPayload::from_request(request);
    payload.model = DRAFT_MODEL.to_string();
    payload.messages = messages;
    payload.temperature = stage.temperature;
    payload.max_tokens = clamp_max_tokens(request.max_tokens, stage.max_tokens_ceiling);
    payload.stream = false;
    payload
}

/// The caller's token budget, defaulted to [`STAGE_DEFAULT_MAX_TOKENS`],
/// never above the stage ceiling.
pub(crate) fn clamp_max_tokens(requested: Option<u32>, ceiling: u32) -> u32 {
    requested.unwrap_or(STAGE_DEFAULT_MAX_TOKENS).min(ceiling)
}

/// Split model output at the first separator occurrence, trimming both
/// sides. Without a separator the whole trimmed text becomes the first
/// segment and the placeholder stands in for the second.
pub(crate) fn split_sections(content: &str, placeholder: &str) -> (String, String) {
    match content.find(SECTION_SEPARATOR) {
        Some(at) => {
            let before = content[..at].trim().to_string();
            let after = content[at + SECTION_SEPARATOR.len()..].trim().to_string();
            (before, after)
        }
        None => (content.trim().to_string(), placeholder.to_string()),
    }
}
