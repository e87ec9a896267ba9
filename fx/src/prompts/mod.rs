//! Prompt templates for the worker and evaluator

mod embedded;
mod loader;

pub use loader::{EvaluatorPromptContext, PromptLoader, WorkerPromptContext};
