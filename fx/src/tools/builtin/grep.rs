//! grep tool - search sandbox files using the ripgrep libraries

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use grep_matcher::Matcher;
use grep_regex::RegexMatcherBuilder;
use grep_searcher::sinks::UTF8;
use grep_searcher::{BinaryDetection, SearcherBuilder};
use serde_json::{Value, json};
use walkdir::WalkDir;

use crate::tools::{Tool, ToolContext, ToolResult};

/// Search for regex patterns in sandbox files
pub struct GrepTool;

#[async_trait]
impl Tool for GrepTool {
    fn name(&self) -> &'static str {
        "grep"
    }

    fn description(&self) -> &'static str {
        "Search sandbox files for a regex pattern. Returns matching lines with context."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Regex pattern to search for"
                },
                "path": {
                    "type": "string",
                    "description": "Path to search in (relative to the sandbox, default: '.')",
                    "default": "."
                },
                "file_pattern": {
                    "type": "string",
                    "description": "Glob pattern to filter files (e.g., '*.md')"
                },
                "case_insensitive": {
                    "type": "boolean",
                    "description": "Case-insensitive search (default: false)",
                    "default": false
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of matching lines to return (default: 50)",
                    "default": 50
                }
            },
            "required": ["pattern"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        let pattern = match input.get("pattern").and_then(|v| v.as_str()) {
            Some(p) => p,
            None => return ToolResult::error("Missing required parameter: pattern"),
        };

        let path = input.get("path").and_then(|v| v.as_str()).unwrap_or(".");
        let file_pattern = input.get("file_pattern").and_then(|v| v.as_str());
        let case_insensitive = input.get("case_insensitive").and_then(|v| v.as_bool()).unwrap_or(false);
        let max_results = input.get("max_results").and_then(|v| v.as_u64()).unwrap_or(50) as usize;

        let search_path = match ctx.validate_path(Path::new(path)) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid path: {}", e)),
        };

        let matcher = match RegexMatcherBuilder::new()
            .case_insensitive(case_insensitive)
            .build(pattern)
        {
            Ok(m) => m,
            Err(e) => return ToolResult::error(format!("Invalid regex pattern: {}", e)),
        };

        let glob_matcher = file_pattern.and_then(|fp| glob::Pattern::new(fp).ok());

        let results: Arc<Mutex<Vec<MatchLine>>> = Arc::new(Mutex::new(Vec::new()));
        let match_count = Arc::new(Mutex::new(0usize));

        let mut searcher_builder = SearcherBuilder::new();
        searcher_builder
            .binary_detection(BinaryDetection::quit(b'\x00'))
            .before_context(1)
            .after_context(1);

        let files = if search_path.is_file() {
            vec![search_path.clone()]
        } else {
            WalkDir::new(&search_path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| {
                    if let Some(ref glob) = glob_matcher {
                        e.path()
                            .file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|name| glob.matches(name))
                    } else {
                        true
                    }
                })
                .map(|e| e.path().to_path_buf())
                .collect::<Vec<_>>()
        };

        for file_path in files {
            {
                let count = match_count.lock().unwrap();
                if *count >= max_results {
                    break;
                }
            }

            let mut searcher = searcher_builder.build();
            let file_results = Arc::clone(&results);
            let file_match_count = Arc::clone(&match_count);

            let display_path = file_path
                .strip_prefix(&ctx.sandbox)
                .unwrap_or(&file_path)
                .to_string_lossy()
                .to_string();

            let search_result = searcher.search_path(
                &matcher,
                &file_path,
                UTF8(|line_num, line| {
                    let mut count = file_match_count.lock().unwrap();
                    if *count >= max_results {
                        return Ok(false);
                    }

                    let is_match = matcher.is_match(line.as_bytes()).unwrap_or(false);

                    let mut results = file_results.lock().unwrap();
                    results.push(MatchLine {
                        file: display_path.clone(),
                        line_num,
                        line: line.trim_end().to_string(),
                        is_context: !is_match,
                    });

                    if is_match {
                        *count += 1;
                    }

                    Ok(true)
                }),
            );

            // Unsearchable files (binary, permissions) are skipped
            let _ = search_result;
        }

        let results = results.lock().unwrap();
        if results.is_empty() {
            return ToolResult::success("No matches found.");
        }

        ToolResult::success(format_results(&results, max_results))
    }
}

#[derive(Debug)]
struct MatchLine {
    file: String,
    line_num: u64,
    line: String,
    is_context: bool,
}

fn format_results(results: &[MatchLine], max_results: usize) -> String {
    let mut output = String::new();
    let mut current_file = String::new();
    let mut match_count = 0;

    for result in results {
        if result.file != current_file {
            if !current_file.is_empty() {
                output.push('\n');
            }
            current_file = result.file.clone();
        }

        let separator = if result.is_context { "-" } else { ":" };
        output.push_str(&format!(
            "{}{}{}{}{}\n",
            result.file, separator, result.line_num, separator, result.line
        ));

        if !result.is_context {
            match_count += 1;
        }
    }

    if match_count >= max_results {
        output.push_str(&format!("\n... (truncated at {} matches)", max_results));
    }

    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::fs;

    #[tokio::test]
    async fn test_grep_basic() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test".to_string());
        fs::write(temp.path().join("notes.txt"), "hello world\nfoo bar\nhello again")
            .await
            .unwrap();

        let result = GrepTool.execute(json!({"pattern": "hello"}), &ctx).await;

        assert!(!result.is_error);
        assert!(result.content.contains("hello"));
    }

    #[tokio::test]
    async fn test_grep_case_insensitive() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test".to_string());
        fs::write(temp.path().join("notes.txt"), "Hello World\nHELLO AGAIN")
            .await
            .unwrap();

        let result = GrepTool
            .execute(json!({"pattern": "hello", "case_insensitive": true}), &ctx)
            .await;

        assert!(!result.is_error);
        assert!(result.content.contains("Hello"));
        assert!(result.content.contains("HELLO"));
    }

    #[tokio::test]
    async fn test_grep_no_matches() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test".to_string());
        fs::write(temp.path().join("notes.txt"), "foo bar baz").await.unwrap();

        let result = GrepTool.execute(json!({"pattern": "notfound"}), &ctx).await;

        assert!(!result.is_error);
        assert!(result.content.contains("No matches found"));
    }

    #[tokio::test]
    async fn test_grep_file_pattern() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test".to_string());
        fs::write(temp.path().join("a.md"), "hello markdown").await.unwrap();
        fs::write(temp.path().join("b.txt"), "hello text").await.unwrap();

        let result = GrepTool
            .execute(json!({"pattern": "hello", "file_pattern": "*.md"}), &ctx)
            .await;

        assert!(!result.is_error);
        assert!(result.content.contains("a.md"));
        assert!(!result.content.contains("b.txt"));
    }

    #[tokio::test]
    async fn test_grep_invalid_regex() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test".to_string());

        let result = GrepTool.execute(json!({"pattern": "[invalid"}), &ctx).await;

        assert!(result.is_error);
        assert!(result.content.contains("Invalid regex"));
    }

    #[test]
    fn test_format_results() {
        let results = vec![
            MatchLine {
                file: "notes.txt".to_string(),
                line_num: 1,
                line: "hello world".to_string(),
                is_context: false,
            },
            MatchLine {
                file: "notes.txt".to_string(),
                line_num: 2,
                line: "context line".to_string(),
                is_context: true,
            },
        ];

        let output = format_results(&results, 50);
        assert!(output.contains("notes.txt:1:hello world"));
        assert!(output.contains("notes.txt-2-context line"));
    }
}
