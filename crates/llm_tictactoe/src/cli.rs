//! Command-line interface for llm_tictactoe.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// LLM Tic-Tac-Toe - play X against a language model playing O
#[derive(Parser, Debug)]
#[command(name = "llm_tictactoe")]
#[command(about = "Play tic-tac-toe against an LLM", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file (optional)
    #[arg(short, long, global = true, default_value = "llm_tictactoe.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal against the move service
    Play {
        /// Move service endpoint (overrides the config file)
        #[arg(long)]
        service_url: Option<String>,

        /// Instruction sent with `ai` when none is typed
        #[arg(long)]
        instruction: Option<String>,
    },

    /// Run the move-suggestion HTTP service
    Serve {
        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}
