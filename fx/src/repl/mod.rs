//! Interactive chat surface
//!
//! A line-oriented REPL over the session lifecycle API. Each submission is
//! one task turn; slash commands manage the success criteria and the
//! session itself. Engine failures become assistant-role error entries in
//! the visible history and the session stays usable.

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

use crate::config::Config;
use crate::session::{ChatEntry, ChatRole, Session, SessionManager};

/// Run the interactive chat loop
pub async fn run_interactive(config: &Config, initial_task: Option<String>) -> Result<()> {
    let manager = SessionManager::new(config.clone())?;
    let session = manager.create_session()?;

    let mut chat = ChatRepl {
        manager,
        session: Some(session),
        history: Vec::new(),
        criteria: String::new(),
    };
    let result = chat.run(initial_task).await;

    if let Some(session) = chat.session.take() {
        chat.manager.destroy(session);
    }
    result
}

struct ChatRepl {
    manager: SessionManager,
    /// None only if a reset failed halfway; the next /reset recovers
    session: Option<Session>,
    history: Vec<ChatEntry>,
    criteria: String,
}

/// What to do after a slash command
enum SlashResult {
    Continue,
    Quit,
}

impl ChatRepl {
    async fn run(&mut self, initial_task: Option<String>) -> Result<()> {
        self.print_welcome();

        if let Some(task) = initial_task {
            println!("{} {}", ">".bright_green(), task);
            self.submit(&task).await;
        }

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input) {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.submit(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Submit one task turn and print what it added to the history
    async fn submit(&mut self, message: &str) {
        let Some(session) = self.session.as_mut() else {
            println!("{}", "No active session. Use /reset to start one.".red());
            return;
        };

        let before = self.history.len();

        match session.run_turn(&self.history, message, &self.criteria).await {
            Ok(updated) => {
                self.history = updated;
            }
            Err(e) => {
                // Keep the session; surface the failure in the history
                warn!(error = %e, "turn failed");
                self.history.push(ChatEntry::user(message));
                self.history.push(ChatEntry::assistant(format!("Error: {}", e)));
            }
        }

        for entry in &self.history[before..] {
            self.print_entry(entry);
        }
        println!();
    }

    fn print_entry(&self, entry: &ChatEntry) {
        match entry.role {
            ChatRole::User => {
                println!("{} {}", "You:".bright_green(), entry.content);
            }
            ChatRole::Assistant => {
                if entry.content.starts_with("Evaluator feedback:") || entry.content.starts_with("Error:") {
                    println!("{}", entry.content.dimmed());
                } else {
                    println!("{} {}", "Assistant:".bright_blue(), entry.content);
                }
            }
        }
    }

    fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/criteria" => {
                if rest.is_empty() {
                    if self.criteria.is_empty() {
                        println!("{}", "No success criteria set (using the default).".dimmed());
                    } else {
                        println!("Success criteria: {}", self.criteria);
                    }
                } else {
                    self.criteria = rest.to_string();
                    println!("{}", "Success criteria updated.".dimmed());
                }
                SlashResult::Continue
            }
            "/reset" => {
                match self.reset_session() {
                    Ok(()) => println!("{}", "Session reset.".dimmed()),
                    Err(e) => println!("{} {}", "Reset failed:".red(), e),
                }
                SlashResult::Continue
            }
            "/history" => {
                self.print_history();
                SlashResult::Continue
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    /// Swap in a fresh session and clear the displayed history
    fn reset_session(&mut self) -> Result<()> {
        let fresh = match self.session.take() {
            Some(old) => self.manager.reset(old)?,
            None => self.manager.create_session()?,
        };
        self.session = Some(fresh);
        self.history.clear();
        self.criteria.clear();
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Factotum".bright_cyan().bold());
        println!(
            "Describe a task, or set what \"done\" means first with {}",
            "/criteria".yellow()
        );
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:18} Show this help", "/help".yellow());
        println!("  {:18} Exit", "/quit".yellow());
        println!("  {:18} Show or set the success criteria", "/criteria [text]".yellow());
        println!("  {:18} Start over with a fresh session", "/reset".yellow());
        println!("  {:18} Show the conversation so far", "/history".yellow());
        println!();
    }

    fn print_history(&self) {
        if self.history.is_empty() {
            println!("{}", "No conversation yet.".dimmed());
            return;
        }

        println!();
        for entry in &self.history {
            self.print_entry(entry);
        }
        println!();
    }
}
