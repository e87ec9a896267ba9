//! Prompt loader
//!
//! Registers the embedded templates and lets users override any of them
//! by dropping a `<name>.hbs` file into the override directory.

use std::fs;
use std::path::PathBuf;

use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;

/// Template name for the worker directive
const WORKER_TEMPLATE: &str = "worker-directive";

/// Template name for the evaluator review request
const EVALUATOR_TEMPLATE: &str = "evaluator-review";

/// Context for rendering the worker directive
#[derive(Debug, Clone, Serialize)]
pub struct WorkerPromptContext {
    /// Current date and time, e.g. "2026-08-06 14:02:11"
    pub now: String,
    /// The success criteria for this task
    pub success_criteria: String,
    /// Evaluator feedback from the previous attempt, if any
    pub feedback: Option<String>,
}

/// Context for rendering the evaluator review request
#[derive(Debug, Clone, Serialize)]
pub struct EvaluatorPromptContext {
    /// The conversation rendered as role-tagged lines
    pub transcript: String,
    /// The success criteria for this task
    pub success_criteria: String,
    /// The worker's latest response text
    pub last_response: String,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    hbs: Handlebars<'static>,
}

impl PromptLoader {
    /// Create a loader with the embedded templates
    pub fn new() -> Result<Self, handlebars::TemplateError> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text, not HTML
        hbs.register_escape_fn(handlebars::no_escape);

        hbs.register_template_string(WORKER_TEMPLATE, embedded::WORKER_DIRECTIVE)?;
        hbs.register_template_string(EVALUATOR_TEMPLATE, embedded::EVALUATOR_REVIEW)?;

        Ok(Self { hbs })
    }

    /// Create a loader, applying `<name>.hbs` overrides from a directory
    ///
    /// Unknown template names in the directory are ignored; unreadable or
    /// invalid files fall back to the embedded template.
    pub fn with_overrides(dir: impl Into<PathBuf>) -> Result<Self, handlebars::TemplateError> {
        let mut loader = Self::new()?;
        let dir = dir.into();

        for name in [WORKER_TEMPLATE, EVALUATOR_TEMPLATE] {
            let path = dir.join(format!("{}.hbs", name));
            if !path.exists() {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(content) => match loader.hbs.register_template_string(name, &content) {
                    Ok(()) => info!(template = name, path = %path.display(), "Loaded prompt override"),
                    Err(e) => {
                        tracing::warn!(template = name, error = %e, "Invalid prompt override, using embedded");
                        // Make sure the embedded template is registered
                        let embedded = if name == WORKER_TEMPLATE {
                            embedded::WORKER_DIRECTIVE
                        } else {
                            embedded::EVALUATOR_REVIEW
                        };
                        loader.hbs.register_template_string(name, embedded)?;
                    }
                },
                Err(e) => {
                    tracing::warn!(template = name, error = %e, "Unreadable prompt override, using embedded");
                }
            }
        }

        Ok(loader)
    }

    /// Render the worker directive
    pub fn render_worker(&self, ctx: &WorkerPromptContext) -> Result<String, handlebars::RenderError> {
        debug!(has_feedback = ctx.feedback.is_some(), "PromptLoader::render_worker");
        self.hbs.render(WORKER_TEMPLATE, ctx)
    }

    /// Render the evaluator review request
    pub fn render_evaluator(&self, ctx: &EvaluatorPromptContext) -> Result<String, handlebars::RenderError> {
        self.hbs.render(EVALUATOR_TEMPLATE, ctx)
    }

    /// The evaluator's fixed system prompt
    pub fn evaluator_system(&self) -> &'static str {
        embedded::EVALUATOR_SYSTEM
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn worker_ctx(feedback: Option<&str>) -> WorkerPromptContext {
        WorkerPromptContext {
            now: "2026-08-06 12:00:00".to_string(),
            success_criteria: "One sentence.".to_string(),
            feedback: feedback.map(str::to_string),
        }
    }

    #[test]
    fn test_render_worker_without_feedback() {
        let loader = PromptLoader::new().unwrap();

        let rendered = loader.render_worker(&worker_ctx(None)).unwrap();

        assert!(rendered.contains("2026-08-06 12:00:00"));
        assert!(rendered.contains("\"One sentence.\""));
        assert!(!rendered.contains("previous attempt"));
    }

    #[test]
    fn test_render_worker_with_feedback() {
        let loader = PromptLoader::new().unwrap();

        let rendered = loader.render_worker(&worker_ctx(Some("Too long; trim it."))).unwrap();

        assert!(rendered.contains("Too long; trim it."));
        assert!(rendered.contains("previous attempt"));
    }

    #[test]
    fn test_render_worker_does_not_escape() {
        let loader = PromptLoader::new().unwrap();

        let mut ctx = worker_ctx(None);
        ctx.success_criteria = "Use <b>bold</b> & \"quotes\"".to_string();
        let rendered = loader.render_worker(&ctx).unwrap();

        assert!(rendered.contains("<b>bold</b> & \"quotes\""));
    }

    #[test]
    fn test_render_evaluator() {
        let loader = PromptLoader::new().unwrap();

        let rendered = loader
            .render_evaluator(&EvaluatorPromptContext {
                transcript: "User: hi\nAssistant: hello".to_string(),
                success_criteria: "Greets back.".to_string(),
                last_response: "hello".to_string(),
            })
            .unwrap();

        assert!(rendered.contains("User: hi"));
        assert!(rendered.contains("\"Greets back.\""));
        assert!(rendered.contains("\"hello\""));
    }

    #[test]
    fn test_override_replaces_embedded_template() {
        let temp = tempdir().unwrap();
        std::fs::write(
            temp.path().join("worker-directive.hbs"),
            "custom directive for {{success_criteria}}",
        )
        .unwrap();

        let loader = PromptLoader::with_overrides(temp.path()).unwrap();
        let rendered = loader.render_worker(&worker_ctx(None)).unwrap();

        assert_eq!(rendered, "custom directive for One sentence.");
    }

    #[test]
    fn test_override_dir_without_files_uses_embedded() {
        let temp = tempdir().unwrap();

        let loader = PromptLoader::with_overrides(temp.path()).unwrap();
        let rendered = loader.render_worker(&worker_ctx(None)).unwrap();

        assert!(rendered.contains("success criteria"));
    }
}
