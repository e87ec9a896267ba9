//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;

use super::context::ToolContext;

/// A capability the worker model can invoke by name
///
/// The name and description are the whole selection contract: the model
/// picks tools from them, so descriptions carry behavioral weight.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the model's tool_use name)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool
    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult;
}

/// Result of a tool execution
///
/// Failures are results, not errors: they flow back to the worker as
/// error-flagged content and the loop continues.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an error result
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("3 entries");
        assert!(!result.is_error);
        assert_eq!(result.content, "3 entries");
    }

    #[test]
    fn test_tool_result_error() {
        let result = ToolResult::error("no such file");
        assert!(result.is_error);
        assert_eq!(result.content, "no such file");
    }
}
