//! Stateful web browsing session and its tools
//!
//! One `WebSession` lives per chat session: pages are fetched over HTTP,
//! converted to markdown, and kept on a history stack so the model can
//! look at the current page, extract its links, or go back. Closing the
//! session is idempotent and drops the HTTP client and history.

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::{Tool, ToolContext, ToolError, ToolResult};

/// Cap on page content returned to the model
const MAX_PAGE_CHARS: usize = 20_000;

/// Cap on extracted links
const MAX_LINKS: usize = 100;

/// A fetched page
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub title: Option<String>,
    pub markdown: String,
    html: String,
}

impl Page {
    /// Page rendered for the model: title line plus truncated markdown
    pub fn render(&self) -> String {
        let header = match &self.title {
            Some(title) => format!("{} - {}", title, self.url),
            None => self.url.clone(),
        };

        let body = if self.markdown.len() > MAX_PAGE_CHARS {
            let cut = truncate_at_boundary(&self.markdown, MAX_PAGE_CHARS);
            format!("{}...\n[truncated, {} chars total]", cut, self.markdown.len())
        } else {
            self.markdown.clone()
        };

        format!("{}\n\n{}", header, body)
    }
}

fn truncate_at_boundary(s: &str, max: usize) -> &str {
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

struct WebInner {
    client: reqwest::Client,
    pages: Vec<Page>,
}

/// Long-lived browsing resource shared by the browsing tools
#[derive(Clone)]
pub struct WebSession {
    inner: Arc<Mutex<Option<WebInner>>>,
}

impl WebSession {
    /// Open a browsing session with the given fetch timeout
    pub fn open(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            inner: Arc::new(Mutex::new(Some(WebInner {
                client,
                pages: Vec::new(),
            }))),
        }
    }

    /// Close the session, dropping the client and history
    ///
    /// Safe to call any number of times and after partial setup.
    pub fn close(&self) {
        let mut guard = self.inner.lock().unwrap();
        if guard.take().is_some() {
            debug!("WebSession::close: session closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().is_none()
    }

    fn client(&self) -> Result<reqwest::Client, ToolError> {
        let guard = self.inner.lock().unwrap();
        guard
            .as_ref()
            .map(|inner| inner.client.clone())
            .ok_or(ToolError::SessionClosed)
    }

    /// Fetch a URL and push it onto the history stack
    pub async fn navigate(&self, url: &str) -> Result<Page, ToolError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ToolError::InvalidArgument(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        let client = self.client()?;
        let response = client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ToolError::InvalidArgument(format!(
                "HTTP error {} fetching {}",
                response.status(),
                url
            )));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        let is_html = content_type.contains("text/html") || content_type.contains("application/xhtml");
        let page = Page {
            url: final_url,
            title: if is_html { extract_title(&body) } else { None },
            markdown: if is_html { html2md::rewrite_html(&body, false) } else { body.clone() },
            html: if is_html { body } else { String::new() },
        };

        let mut guard = self.inner.lock().unwrap();
        let inner = guard.as_mut().ok_or(ToolError::SessionClosed)?;
        inner.pages.push(page.clone());
        debug!(url = %page.url, depth = inner.pages.len(), "WebSession::navigate");

        Ok(page)
    }

    /// The page currently on top of the stack
    pub fn current(&self) -> Result<Option<Page>, ToolError> {
        let guard = self.inner.lock().unwrap();
        let inner = guard.as_ref().ok_or(ToolError::SessionClosed)?;
        Ok(inner.pages.last().cloned())
    }

    /// Pop the current page and return the one before it
    pub fn back(&self) -> Result<Option<Page>, ToolError> {
        let mut guard = self.inner.lock().unwrap();
        let inner = guard.as_mut().ok_or(ToolError::SessionClosed)?;
        inner.pages.pop();
        Ok(inner.pages.last().cloned())
    }

    /// Hyperlinks on the current page
    pub fn links(&self) -> Result<Vec<String>, ToolError> {
        let guard = self.inner.lock().unwrap();
        let inner = guard.as_ref().ok_or(ToolError::SessionClosed)?;

        let Some(page) = inner.pages.last() else {
            return Ok(Vec::new());
        };

        static HREF: OnceLock<Regex> = OnceLock::new();
        let href = HREF.get_or_init(|| Regex::new(r#"href\s*=\s*["']([^"'#][^"']*)["']"#).expect("valid regex"));

        let mut links = Vec::new();
        for cap in href.captures_iter(&page.html) {
            let link = cap[1].to_string();
            if !links.contains(&link) {
                links.push(link);
            }
            if links.len() >= MAX_LINKS {
                break;
            }
        }
        Ok(links)
    }
}

fn extract_title(html: &str) -> Option<String> {
    static TITLE: OnceLock<Regex> = OnceLock::new();
    let title = TITLE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));

    title
        .captures(html)
        .map(|cap| cap[1].trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Fetch a web page and show it as markdown
pub struct NavigateTool {
    web: WebSession,
}

impl NavigateTool {
    pub fn new(web: WebSession) -> Self {
        Self { web }
    }
}

#[async_trait]
impl Tool for NavigateTool {
    fn name(&self) -> &'static str {
        "navigate"
    }

    fn description(&self) -> &'static str {
        "Open a URL in the browsing session and return the page as markdown. The page becomes the current page."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "URL to open (http or https)"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, input: Value, _ctx: &ToolContext) -> ToolResult {
        let url = match input["url"].as_str() {
            Some(u) => u,
            None => return ToolResult::error("url is required"),
        };

        match self.web.navigate(url).await {
            Ok(page) => ToolResult::success(page.render()),
            Err(e) => ToolResult::error(format!("Failed to open {}: {}", url, e)),
        }
    }
}

/// Re-read the current page
pub struct CurrentPageTool {
    web: WebSession,
}

impl CurrentPageTool {
    pub fn new(web: WebSession) -> Self {
        Self { web }
    }
}

#[async_trait]
impl Tool for CurrentPageTool {
    fn name(&self) -> &'static str {
        "current_page"
    }

    fn description(&self) -> &'static str {
        "Return the current page of the browsing session as markdown."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value, _ctx: &ToolContext) -> ToolResult {
        match self.web.current() {
            Ok(Some(page)) => ToolResult::success(page.render()),
            Ok(None) => ToolResult::error("No page is open. Use navigate first."),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

/// Go back one page
pub struct PreviousPageTool {
    web: WebSession,
}

impl PreviousPageTool {
    pub fn new(web: WebSession) -> Self {
        Self { web }
    }
}

#[async_trait]
impl Tool for PreviousPageTool {
    fn name(&self) -> &'static str {
        "previous_page"
    }

    fn description(&self) -> &'static str {
        "Go back to the previous page in the browsing session and return it as markdown."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value, _ctx: &ToolContext) -> ToolResult {
        match self.web.back() {
            Ok(Some(page)) => ToolResult::success(page.render()),
            Ok(None) => ToolResult::error("No earlier page in the history."),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

/// List hyperlinks on the current page
pub struct ExtractLinksTool {
    web: WebSession,
}

impl ExtractLinksTool {
    pub fn new(web: WebSession) -> Self {
        Self { web }
    }
}

#[async_trait]
impl Tool for ExtractLinksTool {
    fn name(&self) -> &'static str {
        "extract_links"
    }

    fn description(&self) -> &'static str {
        "List the hyperlinks found on the current page of the browsing session."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value, _ctx: &ToolContext) -> ToolResult {
        match self.web.links() {
            Ok(links) if links.is_empty() => ToolResult::error("No page is open or no links found."),
            Ok(links) => {
                let listing: Vec<String> = links
                    .iter()
                    .enumerate()
                    .map(|(i, link)| format!("{}. {}", i + 1, link))
                    .collect();
                ToolResult::success(listing.join("\n"))
            }
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}
