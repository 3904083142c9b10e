//! LLM tic-tac-toe - play against a language model through a move service.
//!
//! # Architecture
//!
//! - **Client**: [`HttpMoveService`] posts the game state to a move-suggestion
//!   endpoint; [`TerminalView`] and [`run_session`] give the coordinator a
//!   line-oriented frontend.
//! - **Service**: [`move_server`] exposes `POST /api/llm_move`; [`LlmClient`]
//!   turns each request into a prompt for OpenAI or Anthropic and reads a
//!   [`MoveSuggestion`] out of the reply.
//! - **Config**: [`AppConfig`] from TOML, API keys from the environment.
//!
//! Game rules and move coordination live in `llm_tictactoe_core`.
//!
//! # Example
//!
//! ```no_run
//! use llm_tictactoe::{AppConfig, HttpMoveService};
//! use llm_tictactoe_core::{Coordinator, Position, RecordingView};
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::default();
//! let service = HttpMoveService::new(config.service_url(), Duration::from_secs(30))?;
//!
//! let mut coordinator = Coordinator::new(RecordingView::default());
//! coordinator.handle_local_move(Position::new(1, 1).unwrap());
//! coordinator.request_automated_move(&service, "Block me if you can").await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod llm_client;
mod move_client;
pub mod move_server;
mod terminal;

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError};

// Crate-level exports - LLM client
pub use llm_client::{
    Completion, LlmClient, LlmConfig, LlmError, LlmErrorKind, LlmProvider, MOVE_REPLY_TOKEN_LIMIT,
    MovePrompt, MoveSuggestion,
};

// Crate-level exports - Move service client
pub use move_client::HttpMoveService;

// Crate-level exports - Move service server
pub use move_server::{MOVE_ROUTE, MoveServerState};

// Crate-level exports - Terminal frontend
pub use terminal::{Command, TerminalView, parse_command, run_session};
