//! wikipedia tool - look up articles via the MediaWiki API

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::{Tool, ToolContext, ToolResult};

const API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Cap on the returned article extract
const MAX_EXTRACT_CHARS: usize = 8_000;

/// Look up a topic on Wikipedia and return the article introduction
pub struct WikipediaTool;

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    fn description(&self) -> &'static str {
        "Look up a topic on Wikipedia and return the introduction of the best-matching article."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Topic to look up"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value, _ctx: &ToolContext) -> ToolResult {
        let query = match input["query"].as_str() {
            Some(q) => q,
            None => return ToolResult::error("query is required"),
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        // First find the best-matching article title
        let search = match client
            .get(API_URL)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", "1"),
                ("format", "json"),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Wikipedia request failed: {}", e)),
        };

        let search: Value = match search.json().await {
            Ok(v) => v,
            Err(e) => return ToolResult::error(format!("Failed to parse response: {}", e)),
        };

        let Some(title) = search["query"]["search"][0]["title"].as_str().map(str::to_string) else {
            return ToolResult::success(format!("No Wikipedia article found for '{}'", query));
        };

        // Then fetch the plain-text introduction of that article
        let extract = match client
            .get(API_URL)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("titles", title.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Wikipedia request failed: {}", e)),
        };

        let extract: Value = match extract.json().await {
            Ok(v) => v,
            Err(e) => return ToolResult::error(format!("Failed to parse response: {}", e)),
        };

        let text = extract["query"]["pages"]
            .as_object()
            .and_then(|pages| pages.values().next())
            .and_then(|page| page["extract"].as_str())
            .unwrap_or("");

        if text.is_empty() {
            return ToolResult::success(format!("Article '{}' has no readable introduction", title));
        }

        let mut text = text.to_string();
        if text.len() > MAX_EXTRACT_CHARS {
            let mut end = MAX_EXTRACT_CHARS;
            while end > 0 && !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
            text.push_str("...");
        }

        let url = format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_"));
        ToolResult::success(format!("{}\n{}\n\n{}", title, url, text))
    }
}
