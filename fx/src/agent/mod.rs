//! Worker/evaluator control loop
//!
//! A worker model attempts the task (using tools as needed); an evaluator
//! model judges the latest output against the success criteria; a pure
//! router decides what happens next. The [`TaskEngine`] drives the loop
//! with explicit, configurable bounds.

mod engine;
mod error;
mod evaluator;
mod router;
mod state;
mod worker;

pub use engine::{TaskEngine, TaskOutcome};
pub use error::AgentError;
pub use evaluator::EvaluatorStep;
pub use router::{Step, after_evaluator, after_tools, after_worker};
pub use state::{TaskState, VERDICT_TOOL, Verdict};
pub use worker::WorkerStep;
