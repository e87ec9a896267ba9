//! Evaluator step - judges the worker's latest output

use std::sync::Arc;

use tracing::debug;

use crate::llm::{CompletionRequest, LlmClient, LlmError, Message};
use crate::prompts::{EvaluatorPromptContext, PromptLoader};

use super::error::AgentError;
use super::state::{TaskState, VERDICT_TOOL, Verdict};

/// Produces exactly one verdict per invocation
///
/// Stateless apart from reading the conversation: it never mutates the
/// message log, only returns a verdict for the engine to merge in.
pub struct EvaluatorStep {
    llm: Arc<dyn LlmClient>,
    max_tokens: u32,
}

impl EvaluatorStep {
    pub fn new(llm: Arc<dyn LlmClient>, max_tokens: u32) -> Self {
        Self { llm, max_tokens }
    }

    /// Judge the latest response against the success criteria
    pub async fn run(&self, state: &TaskState, prompts: &PromptLoader) -> Result<Verdict, AgentError> {
        let review = prompts.render_evaluator(&EvaluatorPromptContext {
            transcript: state.transcript(),
            success_criteria: state.success_criteria.clone(),
            last_response: state.last_assistant_text().unwrap_or("(no response)").to_string(),
        })?;

        let request = CompletionRequest {
            system_prompt: prompts.evaluator_system().to_string(),
            messages: vec![Message::user(review)],
            tools: vec![Verdict::tool_definition()],
            max_tokens: self.max_tokens,
            tool_choice: Some(VERDICT_TOOL.to_string()),
        };

        let response = self.llm.complete(request).await?;

        let call = response
            .tool_calls
            .into_iter()
            .find(|c| c.name == VERDICT_TOOL)
            .ok_or(LlmError::MissingToolCall {
                expected: VERDICT_TOOL.to_string(),
            })?;

        let verdict: Verdict = serde_json::from_value(call.input)?;
        debug!(
            criteria_met = verdict.criteria_met,
            user_input_needed = verdict.user_input_needed,
            "EvaluatorStep::run: verdict recorded"
        );

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;
    use crate::llm::{CompletionResponse, StopReason, TokenUsage, ToolCall};

    fn verdict_response(feedback: &str, criteria_met: bool, user_input_needed: bool) -> CompletionResponse {
        CompletionResponse {
            content: None,
            tool_calls: vec![ToolCall {
                id: "v1".to_string(),
                name: VERDICT_TOOL.to_string(),
                input: serde_json::json!({
                    "feedback": feedback,
                    "criteria_met": criteria_met,
                    "user_input_needed": user_input_needed,
                }),
            }],
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    fn state_with_answer() -> TaskState {
        let mut state = TaskState::new("One sentence.");
        state.push(Message::user("summarize"));
        state.push(Message::assistant("Here is the one-sentence summary."));
        state
    }

    #[tokio::test]
    async fn test_evaluator_parses_verdict() {
        let mock = Arc::new(MockLlmClient::new(vec![verdict_response("Meets it.", true, false)]));
        let evaluator = EvaluatorStep::new(mock.clone(), 1024);
        let prompts = PromptLoader::new().unwrap();

        let verdict = evaluator.run(&state_with_answer(), &prompts).await.unwrap();

        assert!(verdict.criteria_met);
        assert_eq!(verdict.feedback, "Meets it.");

        // The verdict tool was forced
        let request = &mock.requests()[0];
        assert_eq!(request.tool_choice.as_deref(), Some(VERDICT_TOOL));
        assert_eq!(request.tools.len(), 1);
    }

    #[tokio::test]
    async fn test_evaluator_review_includes_transcript_and_criteria() {
        let mock = Arc::new(MockLlmClient::new(vec![verdict_response("ok", true, false)]));
        let evaluator = EvaluatorStep::new(mock.clone(), 1024);
        let prompts = PromptLoader::new().unwrap();

        evaluator.run(&state_with_answer(), &prompts).await.unwrap();

        let review = mock.requests()[0].messages[0].text().unwrap().to_string();
        assert!(review.contains("User: summarize"));
        assert!(review.contains("\"One sentence.\""));
        assert!(review.contains("Here is the one-sentence summary."));
    }

    #[tokio::test]
    async fn test_evaluator_missing_verdict_call_is_error() {
        let mock = Arc::new(MockLlmClient::new(vec![CompletionResponse::text_only(
            "I think it looks fine",
        )]));
        let evaluator = EvaluatorStep::new(mock, 1024);
        let prompts = PromptLoader::new().unwrap();

        let result = evaluator.run(&state_with_answer(), &prompts).await;

        assert!(matches!(
            result,
            Err(AgentError::Llm(LlmError::MissingToolCall { .. }))
        ));
    }

    #[tokio::test]
    async fn test_evaluator_malformed_verdict_is_error() {
        let response = CompletionResponse {
            content: None,
            tool_calls: vec![ToolCall {
                id: "v1".to_string(),
                name: VERDICT_TOOL.to_string(),
                input: serde_json::json!({"feedback": 12}),
            }],
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        };
        let mock = Arc::new(MockLlmClient::new(vec![response]));
        let evaluator = EvaluatorStep::new(mock, 1024);
        let prompts = PromptLoader::new().unwrap();

        let result = evaluator.run(&state_with_answer(), &prompts).await;

        assert!(matches!(result, Err(AgentError::MalformedVerdict(_))));
    }
}
