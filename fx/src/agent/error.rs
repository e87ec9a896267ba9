//! Agent error types

use thiserror::Error;

use crate::llm::LlmError;

/// Errors that abort a run and propagate to the caller
///
/// Tool failures never appear here - they are fed back to the worker as
/// error-bearing results and the loop continues.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("evaluator verdict did not match the expected shape: {0}")]
    MalformedVerdict(#[from] serde_json::Error),

    #[error("prompt rendering failed: {0}")]
    Prompt(#[from] handlebars::RenderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_conversion() {
        let err: AgentError = LlmError::InvalidResponse("garbled".to_string()).into();
        assert!(err.to_string().contains("garbled"));
    }

    #[test]
    fn test_malformed_verdict_message() {
        let json_err = serde_json::from_str::<crate::agent::Verdict>("{\"feedback\": 3}").unwrap_err();
        let err: AgentError = json_err.into();
        assert!(err.to_string().contains("expected shape"));
    }
}
