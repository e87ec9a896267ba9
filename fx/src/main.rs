//! Factotum - worker/evaluator chat agent
//!
//! CLI entry point.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use eyre::{Context, Result};
use tracing::info;

use factotum::cli::{Cli, Command};
use factotum::config::Config;
use factotum::repl;
use factotum::session::{ChatRole, SessionManager};
use factotum::tools::{ToolExecutor, WebSession};

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("factotum")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Log to a file so the chat surface stays clean
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("factotum.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!(
        "Loaded config: provider={}, model={}",
        config.llm.provider, config.llm.model
    );

    match cli.command {
        Some(Command::Chat { task }) => repl::run_interactive(&config, task).await,
        Some(Command::Run { message, criteria }) => cmd_run(&config, &message, criteria.as_deref()).await,
        Some(Command::Tools) => cmd_tools(&config),
        None => repl::run_interactive(&config, None).await,
    }
}

/// Run a single task turn and print the result
async fn cmd_run(config: &Config, message: &str, criteria: Option<&str>) -> Result<()> {
    let manager = SessionManager::new(config.clone())?;
    let mut session = manager.create_session()?;

    let outcome = session.run_turn(&[], message, criteria.unwrap_or("")).await;

    let result = match outcome {
        Ok(entries) => {
            for entry in entries {
                match entry.role {
                    ChatRole::User => println!("> {}", entry.content),
                    ChatRole::Assistant => println!("{}", entry.content),
                }
            }
            Ok(())
        }
        Err(e) => Err(e),
    };

    manager.destroy(session);
    result
}

/// List the available tools with their descriptions
fn cmd_tools(config: &Config) -> Result<()> {
    // Build a throwaway tool set; nothing here touches the network
    let web = WebSession::open(Duration::from_millis(config.session.web_timeout_ms));
    let executor = ToolExecutor::for_session(config, web.clone());

    println!("Available tools:");
    println!();
    for def in executor.definitions() {
        println!("  {}", def.name);
        println!("    {}", def.description);
    }

    web.close();
    Ok(())
}
