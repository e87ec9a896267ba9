//! TaskEngine - drives the worker/evaluator loop to termination

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::llm::{CompletionResponse, ContentBlock, LlmClient, Message};
use crate::prompts::PromptLoader;
use crate::tools::{ToolContext, ToolExecutor, ToolResult};

use super::error::AgentError;
use super::evaluator::EvaluatorStep;
use super::router::{self, Step};
use super::state::{TaskState, Verdict};
use super::worker::WorkerStep;

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// The worker's final answer
    pub answer: String,

    /// The evaluator's feedback on it
    pub feedback: String,

    /// Whether the success criteria was met
    pub criteria_met: bool,

    /// Whether the run stopped to ask the user something
    pub user_input_needed: bool,
}

/// Drives worker -> (tools -> worker)* -> evaluator until termination
///
/// Both loop bounds are explicit: `max_cycles` caps evaluator rejections,
/// `max_tool_turns` caps worker->tools round trips. Hitting either ends
/// the run gracefully with `user_input_needed` set so the session stays
/// resumable.
pub struct TaskEngine {
    worker: WorkerStep,
    evaluator: EvaluatorStep,
    tools: ToolExecutor,
    prompts: PromptLoader,
    max_cycles: u32,
    max_tool_turns: u32,
}

impl TaskEngine {
    pub fn new(
        worker_llm: Arc<dyn LlmClient>,
        evaluator_llm: Arc<dyn LlmClient>,
        tools: ToolExecutor,
        prompts: PromptLoader,
        agent: &AgentConfig,
        max_tokens: u32,
    ) -> Self {
        Self {
            worker: WorkerStep::new(worker_llm, max_tokens),
            evaluator: EvaluatorStep::new(evaluator_llm, max_tokens),
            tools,
            prompts,
            max_cycles: agent.max_cycles,
            max_tool_turns: agent.max_tool_turns,
        }
    }

    /// Run the loop for the task currently in `state`
    ///
    /// Appends to the message log and overwrites the evaluation fields;
    /// model-call failures propagate and leave the state as it was at the
    /// point of failure.
    pub async fn run(&self, state: &mut TaskState, ctx: &ToolContext) -> Result<TaskOutcome, AgentError> {
        let tool_defs = self.tools.definitions();

        let mut step = Step::Worker;
        let mut rejections: u32 = 0;
        let mut tool_turns: u32 = 0;
        let mut pending_calls = Vec::new();

        loop {
            match step {
                Step::Worker => {
                    let response = self.worker.run(state, &tool_defs, &self.prompts).await?;
                    state.push(assistant_message(&response));

                    step = router::after_worker(&response);
                    if step == Step::Tools {
                        pending_calls = response.tool_calls;
                        tool_turns += 1;
                        if tool_turns > self.max_tool_turns {
                            warn!(max_tool_turns = self.max_tool_turns, "tool turn budget exhausted");
                            // Close out the dangling tool calls so the
                            // checkpointed log stays well-formed
                            let skipped: Vec<(String, ToolResult)> = pending_calls
                                .drain(..)
                                .map(|c| (c.id, ToolResult::error("not executed: tool turn budget exhausted")))
                                .collect();
                            state.push(tool_result_message(&skipped));
                            state.apply_verdict(&Verdict {
                                feedback: format!(
                                    "Stopped after {} tool turns without a final answer. \
                                     Consider narrowing the task.",
                                    self.max_tool_turns
                                ),
                                criteria_met: false,
                                user_input_needed: true,
                            });
                            step = Step::Done;
                        }
                    }
                }
                Step::Tools => {
                    debug!(calls = pending_calls.len(), "dispatching tool calls");
                    let results = self.tools.execute_all(&pending_calls, ctx).await;
                    state.push(tool_result_message(&results));
                    pending_calls.clear();

                    step = router::after_tools();
                }
                Step::Evaluator => {
                    let verdict = self.evaluator.run(state, &self.prompts).await?;
                    state.apply_verdict(&verdict);

                    step = router::after_evaluator(&verdict);
                    if step == Step::Worker {
                        rejections += 1;
                        if rejections >= self.max_cycles {
                            warn!(max_cycles = self.max_cycles, "retry budget exhausted");
                            state.apply_verdict(&Verdict {
                                feedback: format!(
                                    "{} (Stopped after {} attempts; tell me how to proceed.)",
                                    verdict.feedback, rejections
                                ),
                                criteria_met: false,
                                user_input_needed: true,
                            });
                            step = Step::Done;
                        }
                    }
                }
                Step::Done => {
                    let answer = state
                        .last_assistant_text()
                        .unwrap_or("No final response was generated.")
                        .to_string();

                    info!(
                        criteria_met = state.criteria_met,
                        user_input_needed = state.user_input_needed,
                        rejections,
                        tool_turns,
                        "run finished"
                    );

                    return Ok(TaskOutcome {
                        answer,
                        feedback: state.feedback.clone().unwrap_or_default(),
                        criteria_met: state.criteria_met,
                        user_input_needed: state.user_input_needed,
                    });
                }
            }
        }
    }
}

/// Assemble the assistant message for a worker response
fn assistant_message(response: &CompletionResponse) -> Message {
    let mut blocks = Vec::new();

    if let Some(text) = &response.content {
        blocks.push(ContentBlock::text(text));
    }

    for call in &response.tool_calls {
        blocks.push(ContentBlock::ToolUse {
            id: call.id.clone(),
            name: call.name.clone(),
            input: call.input.clone(),
        });
    }

    Message::assistant_blocks(blocks)
}

/// Assemble the user message carrying tool results, one block per call
fn tool_result_message(results: &[(String, ToolResult)]) -> Message {
    let blocks: Vec<ContentBlock> = results
        .iter()
        .map(|(id, result)| ContentBlock::tool_result(id, &result.content, result.is_error))
        .collect();

    Message::user_blocks(blocks)
}
