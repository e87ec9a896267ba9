//! Tool error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during tool execution
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Path {path} escapes sandbox {sandbox}")]
    SandboxViolation { path: PathBuf, sandbox: PathBuf },

    #[error("Tool not found: {name}")]
    UnknownTool { name: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Command timed out after {timeout_ms}ms")]
    CommandTimeout { timeout_ms: u64 },

    #[error("Browsing session is closed")]
    SessionClosed,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_violation_message() {
        let err = ToolError::SandboxViolation {
            path: PathBuf::from("/etc/passwd"),
            sandbox: PathBuf::from("/tmp/session"),
        };

        let msg = err.to_string();
        assert!(msg.contains("/etc/passwd"));
        assert!(msg.contains("/tmp/session"));
    }

    #[test]
    fn test_timeout_message() {
        let err = ToolError::CommandTimeout { timeout_ms: 5000 };
        assert!(err.to_string().contains("5000"));
    }
}
