//! Worker step - attempts the task, possibly requesting tools

use std::sync::Arc;

use chrono::Local;
use tracing::debug;

use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, ToolDefinition};
use crate::prompts::{PromptLoader, WorkerPromptContext};

use super::error::AgentError;
use super::state::TaskState;

/// Produces the next assistant action for the task
pub struct WorkerStep {
    llm: Arc<dyn LlmClient>,
    max_tokens: u32,
}

impl WorkerStep {
    pub fn new(llm: Arc<dyn LlmClient>, max_tokens: u32) -> Self {
        Self { llm, max_tokens }
    }

    /// Run one worker invocation
    ///
    /// The directive is rebuilt from the state every time: the criteria
    /// and the latest feedback are the loop's only memory of why it is
    /// retrying.
    pub async fn run(
        &self,
        state: &TaskState,
        tools: &[ToolDefinition],
        prompts: &PromptLoader,
    ) -> Result<CompletionResponse, AgentError> {
        let directive = prompts.render_worker(&WorkerPromptContext {
            now: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            success_criteria: state.success_criteria.clone(),
            feedback: state.feedback.clone(),
        })?;

        debug!(
            messages = state.messages.len(),
            tools = tools.len(),
            has_feedback = state.feedback.is_some(),
            "WorkerStep::run"
        );

        let request = CompletionRequest {
            system_prompt: directive,
            messages: state.messages.clone(),
            tools: tools.to_vec(),
            max_tokens: self.max_tokens,
            tool_choice: None,
        };

        Ok(self.llm.complete(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;
    use crate::llm::client::mock::MockLlmClient;

    #[tokio::test]
    async fn test_worker_directive_carries_criteria_and_feedback() {
        let mock = Arc::new(MockLlmClient::new(vec![CompletionResponse::text_only("done")]));
        let worker = WorkerStep::new(mock.clone(), 1024);
        let prompts = PromptLoader::new().unwrap();

        let mut state = TaskState::new("Answer in one sentence.");
        state.push(Message::user("summarize the headline"));
        state.feedback = Some("Previous answer was two sentences.".to_string());

        worker.run(&state, &[], &prompts).await.unwrap();

        let request = &mock.requests()[0];
        assert!(request.system_prompt.contains("Answer in one sentence."));
        assert!(request.system_prompt.contains("Previous answer was two sentences."));
        assert_eq!(request.messages.len(), 1);
        assert!(request.tool_choice.is_none());
    }

    #[tokio::test]
    async fn test_worker_passes_tool_definitions() {
        let mock = Arc::new(MockLlmClient::new(vec![CompletionResponse::text_only("ok")]));
        let worker = WorkerStep::new(mock.clone(), 1024);
        let prompts = PromptLoader::new().unwrap();

        let tools = vec![ToolDefinition::new(
            "web_search",
            "Search the web",
            serde_json::json!({"type": "object"}),
        )];
        let state = TaskState::new("x");

        worker.run(&state, &tools, &prompts).await.unwrap();

        assert_eq!(mock.requests()[0].tools.len(), 1);
        assert_eq!(mock.requests()[0].tools[0].name, "web_search");
    }
}
