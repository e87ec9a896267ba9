//! run_python tool - execute a Python snippet in the sandbox

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::tools::{Tool, ToolContext, ToolResult};

/// Default execution timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Hard ceiling on the timeout the model may request
const MAX_TIMEOUT_SECS: u64 = 300;

/// Cap on captured output
const MAX_OUTPUT_CHARS: usize = 20_000;

/// Run a Python snippet with the sandbox as working directory
pub struct PythonTool;

#[async_trait]
impl Tool for PythonTool {
    fn name(&self) -> &'static str {
        "run_python"
    }

    fn description(&self) -> &'static str {
        "Execute a Python snippet with python3. Prints go to stdout; the sandbox is the working directory."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "Python code to execute"
                },
                "timeout_secs": {
                    "type": "integer",
                    "description": "Execution timeout in seconds (default: 30)"
                }
            },
            "required": ["code"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        let code = match input["code"].as_str() {
            Some(c) => c,
            None => return ToolResult::error("code is required"),
        };

        let timeout_secs = input["timeout_secs"]
            .as_u64()
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .min(MAX_TIMEOUT_SECS);

        debug!(session = %ctx.session_id, timeout_secs, "PythonTool::execute");

        let child = tokio::process::Command::new("python3")
            .arg("-c")
            .arg(code)
            .current_dir(&ctx.sandbox)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(c) => c,
            Err(e) => return ToolResult::error(format!("Failed to start python3: {}", e)),
        };

        let output = match tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return ToolResult::error(format!("Failed to run python3: {}", e)),
            Err(_) => {
                return ToolResult::error(format!("Python execution timed out after {}s", timeout_secs));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let mut combined = String::new();
        if !stdout.trim().is_empty() {
            combined.push_str(stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str("stderr:\n");
            combined.push_str(stderr.trim_end());
        }
        if combined.is_empty() {
            combined = "(no output)".to_string();
        }
        if combined.len() > MAX_OUTPUT_CHARS {
            combined.truncate(MAX_OUTPUT_CHARS);
            combined.push_str("...\n[output truncated]");
        }

        if output.status.success() {
            ToolResult::success(combined)
        } else {
            ToolResult::error(format!(
                "Exited with {}\n{}",
                output.status.code().unwrap_or(-1),
                combined
            ))
        }
    }
}
