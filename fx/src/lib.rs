//! Factotum - worker/evaluator chat agent
//!
//! A chat assistant built around a two-role refinement loop: a worker
//! model attempts the user's task with tools, and an evaluator model
//! judges the result against a user-supplied success criteria, looping
//! until the criteria is met, the user must weigh in, or a configured
//! bound is hit.
//!
//! # Modules
//!
//! - [`agent`] - the control loop: state, router, worker, evaluator, engine
//! - [`llm`] - provider-agnostic completion types and clients
//! - [`tools`] - tool trait, executor, and the builtin tool set
//! - [`prompts`] - worker/evaluator prompt templates
//! - [`session`] - session wrapper and lifecycle API
//! - [`repl`] - interactive chat surface
//! - [`config`] - configuration types and loading

pub mod agent;
pub mod cli;
pub mod config;
pub mod llm;
pub mod prompts;
pub mod repl;
pub mod session;
pub mod tools;

// Re-export commonly used types
pub use agent::{AgentError, Step, TaskEngine, TaskOutcome, TaskState, Verdict};
pub use config::{AgentConfig, Config, LlmConfig};
pub use llm::{AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient};
pub use session::{ChatEntry, ChatRole, Session, SessionManager};
pub use tools::{Tool, ToolContext, ToolError, ToolExecutor, ToolResult, WebSession};
