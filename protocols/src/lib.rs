//! Protocol definitions for the Chain-of-Draft gateway.
//!
//! Wire-facing request/response types plus the normalization step that
//! resolves client-supplied sampling parameters against documented
//! defaults before anything is sent upstream.

pub mod chat;
pub mod enhanced;

pub use chat::{
    ChatCompletionRequest, ChatMessage, SamplingDefaults, UpstreamPayload, Usage,
    SAMPLING_DEFAULTS,
};
pub use enhanced::{EnhancedMetadata, EnhancedResponse, REASONING_METHOD};
