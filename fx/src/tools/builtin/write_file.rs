//! write_file tool - create or overwrite a file

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

use crate::tools::{Tool, ToolContext, ToolResult};

/// Write content to a file, creating parent directories as needed
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn description(&self) -> &'static str {
        "Create or overwrite a file in the session sandbox."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path relative to the sandbox"
                },
                "content": {
                    "type": "string",
                    "description": "Full file content to write"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        let path = match input["path"].as_str() {
            Some(p) => p,
            None => return ToolResult::error("path is required"),
        };
        let content = match input["content"].as_str() {
            Some(c) => c,
            None => return ToolResult::error("content is required"),
        };

        let full_path = match ctx.validate_path(Path::new(path)) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        if let Some(parent) = full_path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return ToolResult::error(format!("Failed to create parent directory: {}", e));
            }
        }

        match tokio::fs::write(&full_path, content).await {
            Ok(()) => ToolResult::success(format!("Wrote {} bytes to {}", content.len(), path)),
            Err(e) => ToolResult::error(format!("Failed to write file: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_file_basic() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test".to_string());

        let result = WriteFileTool
            .execute(serde_json::json!({"path": "out.txt", "content": "hello"}), &ctx)
            .await;

        assert!(!result.is_error);
        assert_eq!(fs::read_to_string(temp.path().join("out.txt")).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_write_file_creates_parents() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test".to_string());

        let result = WriteFileTool
            .execute(serde_json::json!({"path": "a/b/c.txt", "content": "deep"}), &ctx)
            .await;

        assert!(!result.is_error);
        assert_eq!(fs::read_to_string(temp.path().join("a/b/c.txt")).unwrap(), "deep");
    }

    #[tokio::test]
    async fn test_write_file_overwrites() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("out.txt"), "old").unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test".to_string());

        WriteFileTool
            .execute(serde_json::json!({"path": "out.txt", "content": "new"}), &ctx)
            .await;

        assert_eq!(fs::read_to_string(temp.path().join("out.txt")).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_write_file_outside_sandbox() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test".to_string());

        let result = WriteFileTool
            .execute(serde_json::json!({"path": "/tmp/escape.txt", "content": "x"}), &ctx)
            .await;

        assert!(result.is_error);
    }

    #[tokio::test]
    async fn test_write_file_missing_content() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test".to_string());

        let result = WriteFileTool.execute(serde_json::json!({"path": "x.txt"}), &ctx).await;

        assert!(result.is_error);
        assert!(result.content.contains("content is required"));
    }
}
