//! Task state and evaluation verdict

use serde::{Deserialize, Serialize};

use crate::llm::{ContentBlock, Message, MessageContent, Role, ToolDefinition};

/// Tool name the evaluator must call to record its verdict
pub const VERDICT_TOOL: &str = "record_verdict";

/// State threaded through one task
///
/// The message log is append-only for the lifetime of a task; the
/// evaluation fields (feedback and the two flags) are overwritten by each
/// verdict. Serializable so sessions can checkpoint and resume it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskState {
    /// Conversation so far, including tool traffic
    pub messages: Vec<Message>,

    /// What "done" means, supplied by the user
    pub success_criteria: String,

    /// Feedback from the latest evaluation
    pub feedback: Option<String>,

    /// Whether the latest evaluation judged the criteria met
    pub criteria_met: bool,

    /// Whether the latest evaluation decided the user must weigh in
    pub user_input_needed: bool,
}

impl TaskState {
    /// Fresh state for a task with the given success criteria
    pub fn new(success_criteria: impl Into<String>) -> Self {
        Self {
            success_criteria: success_criteria.into(),
            ..Default::default()
        }
    }

    /// Append a message to the log
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Merge a verdict into the state
    ///
    /// Overwrites the evaluation fields; never touches the message log.
    pub fn apply_verdict(&mut self, verdict: &Verdict) {
        self.feedback = Some(verdict.feedback.clone());
        self.criteria_met = verdict.criteria_met;
        self.user_input_needed = verdict.user_input_needed;
    }

    /// Text of the most recent assistant message that has any
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == Role::Assistant)
            .find_map(|m| m.text())
    }

    /// The conversation rendered as role-tagged lines for the evaluator
    pub fn transcript(&self) -> String {
        let mut lines = Vec::new();

        for message in &self.messages {
            match &message.content {
                MessageContent::Text(text) => {
                    lines.push(format!("{}: {}", role_label(message.role), text));
                }
                MessageContent::Blocks(blocks) => {
                    for block in blocks {
                        match block {
                            ContentBlock::Text { text } => {
                                lines.push(format!("{}: {}", role_label(message.role), text));
                            }
                            ContentBlock::ToolUse { name, input, .. } => {
                                lines.push(format!("Assistant: [called tool {} with {}]", name, input));
                            }
                            ContentBlock::ToolResult { content, is_error, .. } => {
                                let tag = if *is_error { "tool error" } else { "tool result" };
                                lines.push(format!("[{}] {}", tag, content));
                            }
                        }
                    }
                }
            }
        }

        lines.join("\n")
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Assistant => "Assistant",
    }
}

/// One evaluation of the worker's latest output
///
/// Immutable once produced; only the latest verdict matters to routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Constructive feedback on the response
    pub feedback: String,

    /// Whether the success criteria has been met
    #[serde(default)]
    pub criteria_met: bool,

    /// Whether user clarification is needed before continuing
    #[serde(default)]
    pub user_input_needed: bool,
}

impl Verdict {
    /// The tool definition forced onto the evaluator model; its input
    /// schema is this struct's schema
    pub fn tool_definition() -> ToolDefinition {
        ToolDefinition::new(
            VERDICT_TOOL,
            "Record the verdict on the assistant's latest response.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "feedback": {
                        "type": "string",
                        "description": "Constructive feedback on the response"
                    },
                    "criteria_met": {
                        "type": "boolean",
                        "description": "Whether the success criteria has been met"
                    },
                    "user_input_needed": {
                        "type": "boolean",
                        "description": "Whether user clarification is needed, or the assistant is stuck"
                    }
                },
                "required": ["feedback", "criteria_met", "user_input_needed"]
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_verdict_overwrites_evaluation_fields() {
        let mut state = TaskState::new("One sentence.");
        state.push(Message::user("hi"));

        state.apply_verdict(&Verdict {
            feedback: "Too long.".to_string(),
            criteria_met: false,
            user_input_needed: false,
        });
        state.apply_verdict(&Verdict {
            feedback: "Good.".to_string(),
            criteria_met: true,
            user_input_needed: false,
        });

        assert_eq!(state.feedback.as_deref(), Some("Good."));
        assert!(state.criteria_met);
        // The message log is untouched by verdicts
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn test_last_assistant_text_skips_tool_only_messages() {
        let mut state = TaskState::new("x");
        state.push(Message::user("question"));
        state.push(Message::assistant("the answer"));
        state.push(Message::assistant_blocks(vec![ContentBlock::ToolUse {
            id: "t1".into(),
            name: "glob".into(),
            input: serde_json::json!({}),
        }]));

        assert_eq!(state.last_assistant_text(), Some("the answer"));
    }

    #[test]
    fn test_last_assistant_text_empty_log() {
        let state = TaskState::new("x");
        assert!(state.last_assistant_text().is_none());
    }

    #[test]
    fn test_transcript_renders_tool_traffic() {
        let mut state = TaskState::new("x");
        state.push(Message::user("find the headline"));
        state.push(Message::assistant_blocks(vec![
            ContentBlock::text("Searching now."),
            ContentBlock::ToolUse {
                id: "t1".into(),
                name: "web_search".into(),
                input: serde_json::json!({"query": "headline"}),
            },
        ]));
        state.push(Message::user_blocks(vec![ContentBlock::tool_result(
            "t1",
            "Result: launch announced",
            false,
        )]));

        let transcript = state.transcript();

        assert!(transcript.contains("User: find the headline"));
        assert!(transcript.contains("Assistant: Searching now."));
        assert!(transcript.contains("[called tool web_search"));
        assert!(transcript.contains("[tool result] Result: launch announced"));
    }

    #[test]
    fn test_transcript_marks_tool_errors() {
        let mut state = TaskState::new("x");
        state.push(Message::user_blocks(vec![ContentBlock::tool_result(
            "t1",
            "no such file",
            true,
        )]));

        assert!(state.transcript().contains("[tool error] no such file"));
    }

    #[test]
    fn test_state_serde_roundtrip() {
        let mut state = TaskState::new("One sentence.");
        state.push(Message::user("hi"));
        state.apply_verdict(&Verdict {
            feedback: "ok".to_string(),
            criteria_met: true,
            user_input_needed: false,
        });

        let json = serde_json::to_value(&state).unwrap();
        let back: TaskState = serde_json::from_value(json).unwrap();

        assert_eq!(back.success_criteria, "One sentence.");
        assert_eq!(back.messages.len(), 1);
        assert!(back.criteria_met);
        assert_eq!(back.feedback.as_deref(), Some("ok"));
    }

    #[test]
    fn test_verdict_parses_from_tool_input() {
        let input = serde_json::json!({
            "feedback": "Looks complete.",
            "criteria_met": true,
            "user_input_needed": false
        });

        let verdict: Verdict = serde_json::from_value(input).unwrap();

        assert!(verdict.criteria_met);
        assert!(!verdict.user_input_needed);
        assert_eq!(verdict.feedback, "Looks complete.");
    }

    #[test]
    fn test_verdict_tool_definition_schema() {
        let def = Verdict::tool_definition();

        assert_eq!(def.name, VERDICT_TOOL);
        assert_eq!(def.input_schema["required"].as_array().unwrap().len(), 3);
        assert!(def.input_schema["properties"]["criteria_met"].is_object());
    }
}
