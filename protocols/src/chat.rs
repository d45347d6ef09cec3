use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Chat Completions API (v1/chat/completions)
// ============================================================================

/// One conversation turn.
///
/// `content` stays an untyped JSON value so multi-part content blocks reach
/// the provider byte-for-byte; provider-specific extras (`tool_calls`,
/// `name`, ...) ride along in `other`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Value,

    /// Additional message fields passed through verbatim
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text("user", content)
    }

    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Value::String(content.into()),
            other: Map::new(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == "system"
    }

    /// Plain-text view of the content: string content as-is, structured
    /// content serialized back to compact JSON.
    pub fn content_text(&self) -> String {
        match &self.content {
            Value::String(s) => s.clone(),
            v => v.to_string(),
        }
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatCompletionRequest {
    /// ID of the model to use
    pub model: String,

    /// A list of messages comprising the conversation so far
    pub messages: Vec<ChatMessage>,

    /// What sampling temperature to use, between 0 and 2
    pub temperature: Option<f32>,

    /// An alternative to sampling with temperature (nucleus sampling)
    pub top_p: Option<f32>,

    /// Top-k sampling parameter
    pub top_k: Option<i32>,

    /// The maximum number of tokens to generate
    pub max_tokens: Option<u32>,

    /// Number between -2.0 and 2.0. Positive values penalize new tokens based on whether they appear in the text so far
    pub presence_penalty: Option<f32>,

    /// Number between -2.0 and 2.0. Positive values penalize new tokens based on their existing frequency in the text so far
    pub frequency_penalty: Option<f32>,

    /// Whether to stream back partial progress
    #[serde(default)]
    pub stream: bool,

    /// Route the request through the two-stage Chain-of-Draft pipeline
    #[serde(default)]
    pub enhanced_cod_mode: bool,

    /// Tool definitions, forwarded to the provider untouched
    pub tools: Option<Vec<Value>>,

    /// Tool selection directive, only meaningful alongside `tools`
    pub tool_choice: Option<Value>,
}

impl ChatCompletionRequest {
    /// Text of the most recent `user` message, if any.
    pub fn last_user_text(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(ChatMessage::content_text)
    }
}

// ============================================================================
// Request Normalization
// ============================================================================

/// Defaults substituted when the client omits a sampling field.
///
/// Applied exactly once, by [`UpstreamPayload::from_request`]. An explicit
/// `0` from the client is forwarded as `0`, never replaced by the default.
#[derive(Debug, Clone, Copy)]
pub struct SamplingDefaults {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: i32,
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

pub const SAMPLING_DEFAULTS: SamplingDefaults = SamplingDefaults {
    temperature: 0.6,
    top_p: 1.0,
    top_k: 40,
    max_tokens: 4096,
    presence_penalty: 0.0,
    frequency_penalty: 0.0,
};

/// The normalized request body actually sent upstream.
///
/// Every sampling field is resolved against [`SAMPLING_DEFAULTS`]; `tools`
/// is attached only when non-empty and `tool_choice` only alongside it.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamPayload {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: i32,
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub stream: bool,
    pub tools: Option<Vec<Value>>,
    pub tool_choice: Option<Value>,
}

impl UpstreamPayload {
    pub fn from_request(request: &ChatCompletionRequest) -> Self {
        let defaults = SAMPLING_DEFAULTS;
        let tools = request
            .tools
            .as_ref()
            .filter(|tools| !tools.is_empty())
            .cloned();
        let tool_choice = match tools {
            Some(_) => request.tool_choice.clone(),
            None => None,
        };

        Self {
            model: request.model.clone(),
            messages: request.messages.clone(),
            temperature: request.temperature.unwrap_or(defaults.temperature),
            top_p: request.top_p.unwrap_or(defaults.top_p),
            top_k: request.top_k.unwrap_or(defaults.top_k),
            max_tokens: request.max_tokens.unwrap_or(defaults.max_tokens),
            presence_penalty: request
                .presence_penalty
                .unwrap_or(defaults.presence_penalty),
            frequency_penalty: request
                .frequency_penalty
                .unwrap_or(defaults.frequency_penalty),
            stream: request.stream,
            tools,
            tool_choice,
        }
    }
}

// ============================================================================
// Token Accounting
// ============================================================================

/// Token usage as reported by the provider.
///
/// Per-field defaults so a partial usage object from upstream still parses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl Usage {
    /// Element-wise sum, treating an absent operand as all zeros.
    pub fn merged(a: Option<&Usage>, b: Option<&Usage>) -> Usage {
        let zero = Usage::default();
        let a = a.unwrap_or(&zero);
        let b = b.unwrap_or(&zero);
        Usage {
            prompt_tokens: a.prompt_tokens + b.prompt_tokens,
            completion_tokens: a.completion_tokens + b.completion_tokens,
            total_tokens: a.total_tokens + b.total_tokens,
        }
    }
}
