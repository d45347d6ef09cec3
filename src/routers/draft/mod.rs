//! Two-stage Enhanced Chain-of-Draft orchestration.
//!
//! Stage 1 drafts, Stage 2 verifies; the stages run strictly in sequence
//! because Stage 2's prompt is built from Stage 1's output. Either stage
//! failing aborts the whole request — no retry, no partial response, no
//! fallback to the direct path.

mod prompts;
mod stage;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use chat_protocol::{
    ChatCompletionRequest, ChatMessage, EnhancedMetadata, EnhancedResponse, Usage,
    REASONING_METHOD, SAMPLING_DEFAULTS,
};

use crate::{routers::error as router_error, upstream::UpstreamClient};

use stage::{run_stage, StageOutcome, StageSpec};

/// Drafting may spend more tokens than verification.
const STAGE1_MAX_TOKENS_CEILING: u32 = 12000;
const STAGE2_MAX_TOKENS_CEILING: u32 = 8192;

const STAGE2_TEMPERATURE_SCALE: f32 = 0.7;
const STAGE2_TEMPERATURE_FLOOR: f32 = 0.1;

pub async fn execute(client: &UpstreamClient, request: &ChatCompletionRequest) -> Response {
    let effective_temperature = request
        .temperature
        .unwrap_or(SAMPLING_DEFAULTS.temperature);

    let stage1_spec = StageSpec {
        name: "Stage 1",
        system_prompt: prompts::STAGE1_SYSTEM_PROMPT,
        temperature: effective_temperature,
        max_tokens_ceiling: STAGE1_MAX_TOKENS_CEILING,
        missing_answer_placeholder: prompts::STAGE1_MISSING_ANSWER,
    };

    let stage1 = match run_stage(client, request, &stage1_spec, &request.messages).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, "Chain-of-Draft stage 1 failed");
            return router_error::enhanced_cod_failed(format!("Stage 1 failed: {e}"));
        }
    };

    let question = request.last_user_text().unwrap_or_default();
    let stage2_history = [ChatMessage::user(prompts::stage2_user_message(
        &question,
        &stage1.thinking,
        &stage1.answer,
    ))];

    let stage2_spec = StageSpec {
        name: "Stage 2",
        system_prompt: prompts::STAGE2_SYSTEM_PROMPT,
        temperature: stage2_temperature(request.temperature),
        max_tokens_ceiling: STAGE2_MAX_TOKENS_CEILING,
        missing_answer_placeholder: prompts::STAGE2_MISSING_ANSWER,
    };

    let stage2 = match run_stage(client, request, &stage2_spec, &stage2_history).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, "Chain-of-Draft stage 2 failed");
            return router_error::enhanced_cod_failed(format!("Stage 2 failed: {e}"));
        }
    };

    info!(model = %request.model, "Completed enhanced Chain-of-Draft request");
    (StatusCode::OK, Json(assemble(stage1, stage2))).into_response()
}

/// Verification runs cooler than drafting: the effective temperature
/// scaled by 0.7 and floored at 0.1, for any input including 0 or below.
fn stage2_temperature(requested: Option<f32>) -> f32 {
    let effective = requested.unwrap_or(SAMPLING_DEFAULTS.temperature);
    (effective * STAGE2_TEMPERATURE_SCALE).max(STAGE2_TEMPERATURE_FLOOR)
}

/// Build the response envelope from two successful stages. Every
/// intermediate artifact survives into the metadata; `final_content`
/// carries draft, banner, verification, separator, and answer in that
/// order with blank-line separation.
fn assemble(stage1: StageOutcome, stage2: StageOutcome) -> EnhancedResponse {
    let final_content = [
        stage1.thinking.as_str(),
        prompts::VERIFICATION_BANNER,
        stage2.thinking.as_str(),
        prompts::SECTION_SEPARATOR,
        stage2.answer.as_str(),
    ]
    .join("\n\n");

    EnhancedResponse {
        final_content,
        enhanced_cod: true,
        reasoning_method: REASONING_METHOD.to_string(),
        usage: Usage::merged(stage1.usage.as_ref(), stage2.usage.as_ref()),
        metadata: EnhancedMetadata {
            stage1_thinking: stage1.thinking,
            stage1_answer: stage1.answer,
            stage2_verification: stage2.thinking,
            stage2_final_answer: stage2.answer,
            stages_completed: 2,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(thinking: &str, answer: &str, usage: Option<Usage>) -> StageOutcome {
        StageOutcome {
            thinking: thinking.to_string(),
            answer: answer.to_string(),
            usage,
        }
    }

    #[test]
    fn test_stage2_temperature_scaled_from_default() {
        let t = stage2_temperature(None);
        assert!((t - 0.42).abs() < 1e-6);
    }

    #[test]
    fn test_stage2_temperature_scaled_from_explicit() {
        let t = stage2_temperature(Some(1.0));
        assert!((t - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_stage2_temperature_floored_at_zero_input() {
        assert_eq!(stage2_temperature(Some(0.0)), 0.1);
    }

    #[test]
    fn test_stage2_temperature_floored_at_negative_input() {
        assert_eq!(stage2_temperature(Some(-1.0)), 0.1);
    }

    #[test]
    fn test_assemble_orders_sections() {
        let response = assemble(
            outcome("step1", "answer1", None),
            outcome("verify", "final", None),
        );

        assert_eq!(
            response.final_content,
            "step1\n\n--- Verification ---\n\nverify\n\n####\n\nfinal"
        );
        assert!(response.enhanced_cod);
        assert_eq!(response.reasoning_method, "enhanced_chain_of_draft");
    }

    #[test]
    fn test_assemble_merges_usage() {
        let response = assemble(
            outcome(
                "t",
                "a",
                Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 20,
                    total_tokens: 30,
                }),
            ),
            outcome("v", "f", None),
        );

        assert_eq!(response.usage.prompt_tokens, 10);
        assert_eq!(response.usage.completion_tokens, 20);
        assert_eq!(response.usage.total_tokens, 30);
    }

    #[test]
    fn test_assemble_keeps_all_artifacts() {
        let response = assemble(
            outcome("step1", "answer1", None),
            outcome("verify", "final", None),
        );

        assert_eq!(response.metadata.stage1_thinking, "step1");
        assert_eq!(response.metadata.stage1_answer, "answer1");
        assert_eq!(response.metadata.stage2_verification, "verify");
        assert_eq!(response.metadata.stage2_final_answer, "final");
        assert_eq!(response.metadata.stages_completed, 2);
    }
}
