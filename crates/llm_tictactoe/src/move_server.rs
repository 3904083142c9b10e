//! Move-suggestion HTTP service backed by an LLM.
//!
//! Exposes `POST /api/llm_move`, which hands each [`MoveRequest`] to an
//! [`LlmClient`] and answers with the move it suggested.

use crate::llm_client::{LlmClient, MoveSuggestion};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use llm_tictactoe_core::{MoveRequest, MoveResponse};
use tracing::{error, info, instrument, warn};

/// Route the client posts move requests to.
pub const MOVE_ROUTE: &str = "/api/llm_move";

/// Shared state for the service handlers.
#[derive(Clone)]
pub struct MoveServerState {
    client: LlmClient,
}

impl MoveServerState {
    /// Serves suggestions from `client`.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

/// Builds the service router.
#[instrument(skip(state))]
pub fn router(state: MoveServerState) -> Router {
    Router::new()
        .route(MOVE_ROUTE, post(llm_move))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip_all, fields(turn = request.game_state.turn, actions = request.available_actions.len()))]
async fn llm_move(
    State(state): State<MoveServerState>,
    Json(request): Json<MoveRequest>,
) -> (StatusCode, Json<MoveResponse>) {
    info!("Move requested");

    if request.available_actions.is_empty() {
        warn!("No available actions in request");
        return (
            StatusCode::OK,
            Json(MoveResponse::error("No available moves to choose from")),
        );
    }

    let response = match state.client.suggest_move(&request).await {
        Ok(MoveSuggestion::Chosen(pos)) => MoveResponse::from_position(pos),
        Ok(MoveSuggestion::Unavailable(pos)) => {
            MoveResponse::error(format!("LLM chose an unavailable square {}", pos))
        }
        Ok(MoveSuggestion::Missing) => MoveResponse::error("LLM reply did not contain a move"),
        Err(e) => {
            error!(error = %e, "LLM request failed");
            return (
                StatusCode::BAD_GATEWAY,
                Json(MoveResponse::error(format!("LLM request failed: {}", e.kind))),
            );
        }
    };
    (StatusCode::OK, Json(response))
}

/// Binds `host:port` and serves the move service until the process exits.
#[instrument(skip(state))]
pub async fn serve(host: &str, port: u16, state: MoveServerState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(address = %listener.local_addr()?, "Move service listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
