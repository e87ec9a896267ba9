//! web_search tool - web search via Serper or Tavily

use async_trait::async_trait;
use serde_json::Value;

use crate::config::SearchConfig;
use crate::tools::{Tool, ToolContext, ToolResult};

/// Search the web for up-to-date information
pub struct SearchTool {
    provider: String,
    api_key: Option<String>,
}

impl SearchTool {
    /// Build from config, resolving the API key once
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            api_key: config.get_api_key(),
        }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Search the web for up-to-date information. Returns titles, URLs, and snippets."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum results to return (default: 5)"
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

        let max_results = input["max_results"].as_u64().unwrap_or(5) as usize;

        let Some(api_key) = &self.api_key else {
            return ToolResult::error("Web search is not configured. Set the search API key env var named in the config.");
        };

        match self.provider.as_str() {
            "serper" => search_serper(query, max_results, api_key).await,
            "tavily" => search_tavily(query, max_results, api_key).await,
            other => ToolResult::error(format!("Unknown search provider: {}", other)),
        }
    }
}

/// Search using the Serper API
async fn search_serper(query: &str, max_results: usize, api_key: &str) -> ToolResult {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_default();

    let body = serde_json::json!({
        "q": query,
        "num": max_results,
    });

    let response = match client
        .post("https://google.serper.dev/search")
        .header("X-API-KEY", api_key)
        .json(&body)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => return ToolResult::error(format!("Search request failed: {}", e)),
    };

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return ToolResult::error(format!("Serper API error {}: {}", status, error_text));
    }

    let result: Value = match response.json().await {
        Ok(r) => r,
        Err(e) => return ToolResult::error(format!("Failed to parse response: {}", e)),
    };

    let results = result["organic"].as_array();
    if results.is_none_or(|r| r.is_empty()) {
        return ToolResult::success("No results found");
    }

    let output: Vec<String> = results
        .unwrap()
        .iter()
        .take(max_results)
        .enumerate()
        .map(|(i, r)| {
            let title = r["title"].as_str().unwrap_or("(no title)");
            let link = r["link"].as_str().unwrap_or("");
            let snippet = r["snippet"].as_str().unwrap_or("");
            format!("{}. {}\n   {}\n   {}\n", i + 1, title, link, truncate(snippet, 200))
        })
        .collect();

    ToolResult::success(output.join("\n"))
}

/// Search using the Tavily API
async fn search_tavily(query: &str, max_results: usize, api_key: &str) -> ToolResult {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_default();

    let body = serde_json::json!({
        "api_key": api_key,
        "query": query,
        "max_results": max_results,
        "search_depth": "basic"
    });

    let response = match client.post("https://api.tavily.com/search").json(&body).send().await {
        Ok(r) => r,
        Err(e) => return ToolResult::error(format!("Search request failed: {}", e)),
    };

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return ToolResult::error(format!("Tavily API error {}: {}", status, error_text));
    }

    let result: Value = match response.json().await {
        Ok(r) => r,
        Err(e) => return ToolResult::error(format!("Failed to parse response: {}", e)),
    };

    let results = result["results"].as_array();
    if results.is_none_or(|r| r.is_empty()) {
        return ToolResult::success("No results found");
    }

    let output: Vec<String> = results
        .unwrap()
        .iter()
        .take(max_results)
        .enumerate()
        .map(|(i, r)| {
            let title = r["title"].as_str().unwrap_or("(no title)");
            let url = r["url"].as_str().unwrap_or("");
            let content = r["content"].as_str().unwrap_or("");
            format!("{}. {}\n   {}\n   {}\n", i + 1, title, url, truncate(content, 200))
        })
        .collect();

    ToolResult::success(output.join("\n"))
}

/// Truncate string to max length
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
