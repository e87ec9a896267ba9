//! Session wrapper and lifecycle API
//!
//! A session owns one engine instance plus its long-lived resources (web
//! browsing session, file sandbox) for the lifetime of one conversation.
//! Conversation state is checkpointed under the session id so each turn
//! resumes where the previous one left off. The [`SessionManager`] is the
//! lifecycle API the chat surface consumes: create, reset, destroy.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use threadstore::{Checkpointer, FileSaver, MemorySaver};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::{TaskEngine, TaskState};
use crate::config::Config;
use crate::llm::{LlmClient, Message, create_client};
use crate::prompts::PromptLoader;
use crate::tools::{ToolContext, ToolExecutor, WebSession};

/// Role tag for a displayed chat entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry of the displayed chat history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub content: String,
}

impl ChatEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// One user conversation and its resources
pub struct Session {
    id: String,
    sandbox: PathBuf,
    web: WebSession,
    engine: TaskEngine,
    checkpointer: Arc<dyn Checkpointer>,
    default_criteria: String,
    closed: bool,
}

impl Session {
    /// The session id, also used as the checkpoint key
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The session's file sandbox
    pub fn sandbox(&self) -> &Path {
        &self.sandbox
    }

    /// Feed one user turn through the loop
    ///
    /// Restores prior state under the session id, appends the user
    /// message, runs the engine to termination, saves the checkpoint, and
    /// returns the history extended with the user message, the final
    /// answer, and the evaluator's feedback as a separate display entry.
    pub async fn run_turn(
        &mut self,
        history: &[ChatEntry],
        message: &str,
        success_criteria: &str,
    ) -> Result<Vec<ChatEntry>> {
        if self.closed {
            return Err(eyre::eyre!("Session {} is closed", self.id));
        }

        let mut state = match self.checkpointer.load(&self.id)? {
            Some(snapshot) => serde_json::from_value(snapshot).context("Corrupt session checkpoint")?,
            None => TaskState::default(),
        };

        state.success_criteria = if success_criteria.trim().is_empty() {
            self.default_criteria.clone()
        } else {
            success_criteria.to_string()
        };
        state.push(Message::user(message));

        debug!(session = %self.id, messages = state.messages.len(), "running turn");

        let ctx = ToolContext::new(self.sandbox.clone(), self.id.clone());
        let outcome = self.engine.run(&mut state, &ctx).await?;

        self.checkpointer
            .save(&self.id, serde_json::to_value(&state)?)
            .context("Failed to checkpoint session state")?;

        let mut updated = history.to_vec();
        updated.push(ChatEntry::user(message));
        updated.push(ChatEntry::assistant(outcome.answer));
        updated.push(ChatEntry::assistant(format!("Evaluator feedback: {}", outcome.feedback)));
        Ok(updated)
    }

    /// Release the session's resources
    ///
    /// Idempotent, and safe even if setup never completed; also runs on
    /// drop.
    pub fn cleanup(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.web.close();
        info!(session = %self.id, "session cleaned up");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Builds sessions and manages their lifecycle
pub struct SessionManager {
    config: Config,
    worker_llm: Arc<dyn LlmClient>,
    evaluator_llm: Arc<dyn LlmClient>,
    checkpointer: Arc<dyn Checkpointer>,
}

impl SessionManager {
    /// Build a manager from config
    ///
    /// Creates the worker and evaluator clients up front. Checkpoints
    /// live in memory unless the config names a persist directory.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let worker_llm = create_client(&config.llm)?;
        let evaluator_llm = create_client(&config.llm.for_evaluator())?;

        let checkpointer: Arc<dyn Checkpointer> = match &config.session.persist_dir {
            Some(dir) => Arc::new(FileSaver::open(dir)?),
            None => Arc::new(MemorySaver::new()),
        };

        Ok(Self::with_parts(config, worker_llm, evaluator_llm, checkpointer))
    }

    /// Assemble a manager from pre-built parts
    pub fn with_parts(
        config: Config,
        worker_llm: Arc<dyn LlmClient>,
        evaluator_llm: Arc<dyn LlmClient>,
        checkpointer: Arc<dyn Checkpointer>,
    ) -> Self {
        Self {
            config,
            worker_llm,
            evaluator_llm,
            checkpointer,
        }
    }

    /// Acquire resources and build a session with a fresh id
    pub fn create_session(&self) -> Result<Session> {
        let id = Uuid::now_v7().to_string();

        let sandbox = self.config.session.sandbox_dir.join(&id);
        std::fs::create_dir_all(&sandbox).context("Failed to create session sandbox")?;

        let web = WebSession::open(Duration::from_millis(self.config.session.web_timeout_ms));

        let prompts = match self.prompt_loader() {
            Ok(p) => p,
            Err(e) => {
                // Partial setup: release what was acquired
                web.close();
                return Err(e);
            }
        };

        let tools = ToolExecutor::for_session(&self.config, web.clone());
        let engine = TaskEngine::new(
            self.worker_llm.clone(),
            self.evaluator_llm.clone(),
            tools,
            prompts,
            &self.config.agent,
            self.config.llm.max_tokens,
        );

        info!(session = %id, sandbox = %sandbox.display(), "session created");

        Ok(Session {
            id,
            sandbox,
            web,
            engine,
            checkpointer: self.checkpointer.clone(),
            default_criteria: self.config.agent.default_criteria.clone(),
            closed: false,
        })
    }

    /// Destroy a session and hand back a fresh one
    ///
    /// The new session has a distinct id, an empty checkpoint, and its
    /// own resources; the caller clears the displayed history.
    pub fn reset(&self, old: Session) -> Result<Session> {
        self.destroy(old);
        self.create_session()
    }

    /// Release a session's resources and discard its checkpoint
    pub fn destroy(&self, mut session: Session) {
        let id = session.id.clone();
        session.cleanup();
        if let Err(e) = self.checkpointer.remove(&id) {
            warn!(session = %id, error = %e, "failed to discard session checkpoint");
        }
    }

    fn prompt_loader(&self) -> Result<PromptLoader> {
        if let Some(config_dir) = dirs::config_dir() {
            let override_dir = config_dir.join("factotum").join("prompts");
            if override_dir.is_dir() {
                return Ok(PromptLoader::with_overrides(override_dir)?);
            }
        }
        Ok(PromptLoader::new()?)
    }
}
