//! send_push_notification tool - Pushover messages

use async_trait::async_trait;
use serde_json::Value;

use crate::config::PushConfig;
use crate::tools::{Tool, ToolContext, ToolResult};

const PUSHOVER_URL: &str = "https://api.pushover.net/1/messages.json";

/// Send a push notification to the user's devices via Pushover
pub struct PushTool {
    credentials: Option<(String, String)>,
}

impl PushTool {
    /// Build from config, resolving credentials once
    pub fn from_config(config: &PushConfig) -> Self {
        Self {
            credentials: config.get_credentials(),
        }
    }
}

#[async_trait]
impl Tool for PushTool {
    fn name(&self) -> &'static str {
        "send_push_notification"
    }

    fn description(&self) -> &'static str {
        "Send a short push notification to the user's devices."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "Notification text"
                }
            },
            "required": ["message"]
        })
    }

    async fn execute(&self, input: Value, _ctx: &ToolContext) -> ToolResult {
        let message = match input["message"].as_str() {
            Some(m) => m,
            None => return ToolResult::error("message is required"),
        };

        let Some((token, user)) = &self.credentials else {
            return ToolResult::error("Push notifications are not configured. Set the Pushover env vars named in the config.");
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        let response = match client
            .post(PUSHOVER_URL)
            .form(&[("token", token.as_str()), ("user", user.as_str()), ("message", message)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Failed to send notification: {}", e)),
        };

        if response.status().is_success() {
            ToolResult::success("Notification sent")
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            ToolResult::error(format!("Pushover API error {}: {}", status, text))
        }
    }
}
