//! ToolExecutor - dispatches tool calls for one session

use std::collections::HashMap;

use crate::config::Config;
use crate::llm::{ToolCall, ToolDefinition};

use super::builtin::{
    GlobTool, GrepTool, ListDirectoryTool, PushTool, PythonTool, ReadFileTool, SearchTool, WikipediaTool,
    WriteFileTool,
};
use super::web::{CurrentPageTool, ExtractLinksTool, NavigateTool, PreviousPageTool, WebSession};
use super::{Tool, ToolContext, ToolResult};

/// Dispatches tool calls for one session
pub struct ToolExecutor {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolExecutor {
    /// Create the full session tool set
    ///
    /// File tools operate inside the session sandbox; the browsing tools
    /// share the session's `WebSession`.
    pub fn for_session(config: &Config, web: WebSession) -> Self {
        let mut executor = Self::empty();

        // File management
        executor.add_tool(Box::new(ReadFileTool));
        executor.add_tool(Box::new(WriteFileTool));
        executor.add_tool(Box::new(ListDirectoryTool));
        executor.add_tool(Box::new(GlobTool));
        executor.add_tool(Box::new(GrepTool));

        // Web
        executor.add_tool(Box::new(SearchTool::from_config(&config.search)));
        executor.add_tool(Box::new(WikipediaTool));
        executor.add_tool(Box::new(NavigateTool::new(web.clone())));
        executor.add_tool(Box::new(CurrentPageTool::new(web.clone())));
        executor.add_tool(Box::new(PreviousPageTool::new(web.clone())));
        executor.add_tool(Box::new(ExtractLinksTool::new(web)));

        // Execution and notifications
        executor.add_tool(Box::new(PythonTool));
        executor.add_tool(Box::new(PushTool::from_config(&config.push)));

        executor
    }

    /// Create an empty executor (for testing)
    pub fn empty() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Add a tool to the executor
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Tool definitions handed to the worker model
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a single tool call
    ///
    /// Unknown tools become error results, not failures: the worker sees
    /// the message and can react.
    pub async fn execute(&self, tool_call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        match self.tools.get(&tool_call.name) {
            Some(tool) => tool.execute(tool_call.input.clone(), ctx).await,
            None => ToolResult::error(format!("Unknown tool: {}", tool_call.name)),
        }
    }

    /// Execute tool calls sequentially, in request order
    pub async fn execute_all(&self, tool_calls: &[ToolCall], ctx: &ToolContext) -> Vec<(String, ToolResult)> {
        let mut results = Vec::with_capacity(tool_calls.len());

        for call in tool_calls {
            let result = self.execute(call, ctx).await;
            results.push((call.id.clone(), result));
        }

        results
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Sorted tool names
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}
