//! HTTP client for the move-suggestion service.

use llm_tictactoe_core::{MoveReply, MoveRequest, MoveService, MoveServiceError};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Posts move requests to a move-suggestion endpoint as JSON.
#[derive(Debug, Clone)]
pub struct HttpMoveService {
    url: String,
    client: reqwest::Client,
}

impl HttpMoveService {
    /// Creates a client for `url` whose requests give up after `timeout`.
    #[instrument(skip(url), fields(url = %url.as_ref()))]
    pub fn new(url: impl AsRef<str>, timeout: Duration) -> Result<Self, MoveServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MoveServiceError::network(format!("Failed to build HTTP client: {}", e)))?;
        info!("Created move service client");
        Ok(Self {
            url: url.as_ref().to_string(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl MoveService for HttpMoveService {
    #[instrument(skip(self, request), fields(url = %self.url, turn = request.game_state.turn))]
    async fn request_move(&self, request: &MoveRequest) -> Result<MoveReply, MoveServiceError> {
        debug!("Sending move request");
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| MoveServiceError::network(e.to_string()))?;

        let status = response.status();
        debug!(status = %status, "Received response");
        let body = response
            .text()
            .await
            .map_err(|e| MoveServiceError::network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            // Error bodies carry `{error}` when the service produced them.
            let detail = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| "Unknown error".to_string());
            warn!(status = %status, detail = %detail, "Move service returned error status");
            return Err(MoveServiceError::status(status.as_u16(), detail));
        }

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| MoveServiceError::malformed(e.to_string()))?;
        Ok(MoveReply::from_value(value))
    }
}
