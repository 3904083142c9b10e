//! LLM Tic-Tac-Toe - unified CLI
//!
//! Runs either the terminal game client or the move-suggestion service.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use llm_tictactoe::{
    AppConfig, HttpMoveService, LlmClient, MoveServerState, TerminalView, move_server, run_session,
};
use llm_tictactoe_core::Coordinator;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config).context("Failed to load configuration")?;

    match cli.command {
        Command::Play {
            service_url,
            instruction,
        } => run_play(config, service_url, instruction).await,
        Command::Serve { port, host } => run_serve(config, host, port).await,
    }
}

/// Run the terminal game client
async fn run_play(
    config: AppConfig,
    service_url: Option<String>,
    instruction: Option<String>,
) -> Result<()> {
    let config = match service_url {
        Some(url) => config.with_service_url(url),
        None => config,
    };
    let instruction = instruction.unwrap_or_else(|| config.default_instruction().clone());
    info!(service_url = %config.service_url(), "Starting terminal game");

    let service = HttpMoveService::new(
        config.service_url(),
        Duration::from_secs(*config.request_timeout_secs()),
    )
    .context("Failed to create move service client")?;

    let mut coordinator = Coordinator::new(TerminalView::new(std::io::stdout()));
    let stdin = BufReader::new(tokio::io::stdin());
    run_session(&mut coordinator, &service, stdin, &instruction).await
}

/// Run the move-suggestion service
async fn run_serve(config: AppConfig, host: String, port: u16) -> Result<()> {
    let llm_config = config
        .create_llm_config()
        .context("Failed to configure LLM client")?;
    info!(provider = ?llm_config.provider(), model = %llm_config.model(), "Starting move service");

    let state = MoveServerState::new(LlmClient::new(llm_config));
    move_server::serve(&host, port, state).await
}
