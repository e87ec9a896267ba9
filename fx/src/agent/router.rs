//! Routing - the pure transition function of the control loop

use crate::llm::CompletionResponse;

use super::state::Verdict;

/// Steps of the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The worker attempts the task
    Worker,
    /// Requested tool calls are dispatched
    Tools,
    /// The evaluator judges the worker's output
    Evaluator,
    /// The run is finished
    Done,
}

/// Where to go after a worker response
///
/// Tool-call requests always go to the dispatcher; anything else is a
/// candidate final answer and goes to the evaluator.
pub fn after_worker(response: &CompletionResponse) -> Step {
    if response.tool_calls.is_empty() {
        Step::Evaluator
    } else {
        Step::Tools
    }
}

/// Where to go after tool dispatch - always back to the worker
pub fn after_tools() -> Step {
    Step::Worker
}

/// Where to go after an evaluation
///
/// Either flag ends the run; both false sends the worker back with the
/// feedback carried in the state.
pub fn after_evaluator(verdict: &Verdict) -> Step {
    if verdict.criteria_met || verdict.user_input_needed {
        Step::Done
    } else {
        Step::Worker
    }
}
