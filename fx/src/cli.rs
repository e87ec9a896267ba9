//! Command-line interface definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Worker/evaluator chat agent
#[derive(Debug, Parser)]
#[command(name = "fx", version, about = "Chat agent that works a task until it meets your success criteria")]
pub struct Cli {
    /// Path to a config file (default: .factotum.yml, then
    /// ~/.config/factotum/factotum.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive chat (default)
    Chat {
        /// Task to submit immediately on startup
        task: Option<String>,
    },

    /// Run a single task turn and print the result
    Run {
        /// The task to perform
        message: String,

        /// What "done" means for this task
        #[arg(short = 's', long)]
        criteria: Option<String>,
    },

    /// List the available tools
    Tools,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_with_criteria() {
        let cli = Cli::parse_from(["fx", "run", "summarize the news", "--criteria", "one sentence"]);

        match cli.command {
            Some(Command::Run { message, criteria }) => {
                assert_eq!(message, "summarize the news");
                assert_eq!(criteria.as_deref(), Some("one sentence"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::parse_from(["fx"]);
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["fx", "tools", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Command::Tools)));
    }
}
