//! Response envelope for the two-stage Chain-of-Draft pipeline.

use serde::{Deserialize, Serialize};

use crate::chat::Usage;

/// Tag identifying the pipeline that produced an [`EnhancedResponse`].
pub const REASONING_METHOD: &str = "enhanced_chain_of_draft";

/// Envelope returned when both Chain-of-Draft stages succeed.
///
/// `final_content` serializes as `finalContent`; existing clients key on
/// that exact name.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnhancedResponse {
    /// Drafting and verification output joined into one displayable text
    #[serde(rename = "finalContent")]
    pub final_content: String,

    pub enhanced_cod: bool,

    pub reasoning_method: String,

    /// Element-wise sum of both stages' token usage
    pub usage: Usage,

    pub metadata: EnhancedMetadata,
}

/// Every intermediate artifact of the pipeline, exposed for observability.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnhancedMetadata {
    pub stage1_thinking: String,
    pub stage1_answer: String,
    pub stage2_verification: String,
    pub stage2_final_answer: String,
    pub stages_completed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_content_field_name() {
        let response = EnhancedResponse {
            final_content: "text".to_string(),
            enhanced_cod: true,
            reasoning_method: REASONING_METHOD.to_string(),
            usage: Usage::default(),
            metadata: EnhancedMetadata {
                stage1_thinking: "t".to_string(),
                stage1_answer: "a".to_string(),
                stage2_verification: "v".to_string(),
                stage2_final_answer: "f".to_string(),
                stages_completed: 2,
            },
        };

        let serialized = serde_json::to_value(&response).unwrap();
        assert_eq!(serialized["finalContent"], "text");
        assert!(serialized.get("final_content").is_none());
        assert_eq!(serialized["reasoning_method"], "enhanced_chain_of_draft");
        assert_eq!(serialized["metadata"]["stages_completed"], 2);
    }
}
