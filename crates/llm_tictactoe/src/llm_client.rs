//! LLM-backed move suggestions.
//!
//! [`LlmClient::suggest_move`] renders a [`MoveRequest`] into a [`MovePrompt`],
//! sends it to a [`Completion`] backend (OpenAI or Anthropic) and reads a
//! [`MoveSuggestion`] back out of the free-form reply.

use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use derive_more::{Display, Error};
use llm_tictactoe_core::{MoveRequest, Player, Position, Square};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Ceiling on output tokens per move. A `{"row": r, "col": c}` reply plus a
/// sentence of preamble fits comfortably.
pub const MOVE_REPLY_TOKEN_LIMIT: u32 = 256;

/// LLM provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI chat completions.
    #[display("openai")]
    OpenAI,
    /// Anthropic messages.
    #[display("anthropic")]
    Anthropic,
}

/// Provider, credentials and model for the move service.
#[derive(Clone)]
pub struct LlmConfig {
    provider: LlmProvider,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl LlmConfig {
    /// Creates a configuration. The client caps `max_tokens` at
    /// [`MOVE_REPLY_TOKEN_LIMIT`].
    pub fn new(provider: LlmProvider, api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            provider,
            api_key,
            model,
            max_tokens,
        }
    }

    /// The provider.
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// The model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// System and user text sent to the model for one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePrompt {
    /// Role and reply format.
    pub system: String,
    /// Board, legal moves and operator instruction.
    pub user: String,
}

impl MovePrompt {
    /// Renders a move request.
    pub fn for_request(request: &MoveRequest) -> Self {
        let state = &request.game_state;
        let system = format!(
            "You are playing tic-tac-toe as {player} on a 3x3 board. \
             Rows and columns are numbered 0-2 from the top-left corner. \
             Choose exactly one of the available actions and reply with only a JSON \
             object of the form {{\"row\": <row>, \"col\": <col>}}.",
            player = state.current_player
        );

        let board: String = state
            .board
            .iter()
            .map(|row| {
                let cells: Vec<&str> = row.iter().map(|square| cell_glyph(*square)).collect();
                format!("{}\n", cells.join(" "))
            })
            .collect();

        let actions: Vec<String> = request
            .available_actions
            .iter()
            .map(|pos| format!("{{\"row\": {}, \"col\": {}}}", pos.row(), pos.col()))
            .collect();

        let instruction = match request.instruction.trim() {
            "" => "(none)",
            text => text,
        };

        let user = format!(
            "Turn {turn}, status {status}. Current board ('.' is empty):\n{board}\n\
             Available actions:\n{actions}\n\n\
             Operator instruction: {instruction}",
            turn = state.turn,
            status = state.status,
            actions = actions.join("\n"),
        );

        Self { system, user }
    }
}

fn cell_glyph(square: Square) -> &'static str {
    match square {
        Square::Empty => ".",
        Square::Occupied(Player::X) => "X",
        Square::Occupied(Player::O) => "O",
    }
}

/// What the model's reply amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSuggestion {
    /// One of the offered actions.
    Chosen(Position),
    /// A cell on the board that was not offered.
    Unavailable(Position),
    /// No `{"row", "col"}` object naming a board cell was found.
    Missing,
}

impl MoveSuggestion {
    /// Reads the first move object out of `text` and checks it against `available`.
    #[instrument(skip_all, fields(available = available.len()))]
    pub fn from_reply(text: &str, available: &[Position]) -> Self {
        match find_move(text) {
            Some(pos) if available.contains(&pos) => MoveSuggestion::Chosen(pos),
            Some(pos) => MoveSuggestion::Unavailable(pos),
            None => MoveSuggestion::Missing,
        }
    }
}

#[derive(Deserialize)]
struct ReplyMove {
    row: usize,
    col: usize,
}

/// First parseable `{"row": .., "col": ..}` object in `text` that lies on the board.
fn find_move(text: &str) -> Option<Position> {
    for (start, _) in text.match_indices('{') {
        for (offset, _) in text[start..].match_indices('}') {
            if let Ok(candidate) = serde_json::from_str::<ReplyMove>(&text[start..=start + offset]) {
                return Position::new(candidate.row, candidate.col);
            }
        }
    }
    None
}

/// Turns a prompt into model text.
#[async_trait::async_trait]
pub trait Completion: Send + Sync {
    /// Generates at most `max_tokens` of output for `prompt`.
    async fn complete(&self, prompt: &MovePrompt, max_tokens: u32) -> Result<String, LlmError>;
}

/// OpenAI chat completions through `async-openai`.
struct OpenAiCompletion {
    client: OpenAIClient<OpenAIConfig>,
    model: String,
}

#[async_trait::async_trait]
impl Completion for OpenAiCompletion {
    #[instrument(skip_all, fields(model = %self.model, max_tokens = max_tokens))]
    async fn complete(&self, prompt: &MovePrompt, max_tokens: u32) -> Result<String, LlmError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(prompt.system.as_str())
                .build()
                .map_err(|e| LlmError::request(format!("Invalid system prompt: {}", e)))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.user.as_str())
                .build()
                .map_err(|e| LlmError::request(format!("Invalid user prompt: {}", e)))?
                .into(),
        ];
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(max_tokens)
            .build()
            .map_err(|e| LlmError::request(format!("Invalid chat request: {}", e)))?;

        debug!("Sending chat completion");
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::request(e.to_string()))?;

        response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LlmError::empty_reply(LlmProvider::OpenAI))
    }
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [AnthropicMessage<'a>; 1],
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicBlock>,
}

#[derive(Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic messages API over `reqwest`.
struct AnthropicCompletion {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

#[async_trait::async_trait]
impl Completion for AnthropicCompletion {
    #[instrument(skip_all, fields(model = %self.model, max_tokens = max_tokens))]
    async fn complete(&self, prompt: &MovePrompt, max_tokens: u32) -> Result<String, LlmError> {
        let body = AnthropicRequest {
            model: &self.model,
            max_tokens,
            system: &prompt.system,
            messages: [AnthropicMessage {
                role: "user",
                content: &prompt.user,
            }],
        };

        debug!("Sending message");
        let response = self
            .http
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::request(e.to_string()))?;
        if !status.is_success() {
            return Err(LlmError::api(status.as_u16(), text));
        }

        let parsed: AnthropicResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::request(format!("Unreadable reply: {}", e)))?;
        let reply: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();
        if reply.trim().is_empty() {
            return Err(LlmError::empty_reply(LlmProvider::Anthropic));
        }
        Ok(reply)
    }
}

/// Asks a model for the automated player's move.
#[derive(Clone)]
pub struct LlmClient {
    completion: Arc<dyn Completion>,
    max_tokens: u32,
}

impl LlmClient {
    /// Connects to the provider named in `config`.
    #[instrument(skip(config), fields(provider = %config.provider, model = %config.model))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating LLM client");
        let completion: Arc<dyn Completion> = match config.provider {
            LlmProvider::OpenAI => Arc::new(OpenAiCompletion {
                client: OpenAIClient::with_config(
                    OpenAIConfig::new().with_api_key(config.api_key),
                ),
                model: config.model,
            }),
            LlmProvider::Anthropic => Arc::new(AnthropicCompletion {
                http: reqwest::Client::new(),
                api_key: config.api_key,
                model: config.model,
            }),
        };
        Self::with_completion(completion, config.max_tokens)
    }

    /// Uses an arbitrary completion backend.
    pub fn with_completion(completion: Arc<dyn Completion>, max_tokens: u32) -> Self {
        Self {
            completion,
            max_tokens: max_tokens.clamp(1, MOVE_REPLY_TOKEN_LIMIT),
        }
    }

    /// Output token budget per move.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Prompts the model with `request` and interprets its reply.
    ///
    /// Only provider failures are errors. A reply that names no move or an
    /// unoffered square is a successful [`MoveSuggestion`].
    #[instrument(skip_all, fields(player = %request.game_state.current_player, turn = request.game_state.turn))]
    pub async fn suggest_move(&self, request: &MoveRequest) -> Result<MoveSuggestion, LlmError> {
        let prompt = MovePrompt::for_request(request);
        let reply = self.completion.complete(&prompt, self.max_tokens).await?;
        debug!(reply = %reply, "Model replied");

        let suggestion = MoveSuggestion::from_reply(&reply, &request.available_actions);
        match suggestion {
            MoveSuggestion::Chosen(pos) => info!(position = %pos, "Model chose a move"),
            MoveSuggestion::Unavailable(pos) => warn!(position = %pos, "Model chose an unoffered square"),
            MoveSuggestion::Missing => warn!("No move found in model reply"),
        }
        Ok(suggestion)
    }
}

/// What went wrong talking to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LlmErrorKind {
    /// The request could not be built, sent, or its reply read.
    #[display("{}", _0)]
    Request(String),
    /// The provider answered with a non-2xx status.
    #[display("API returned {}: {}", status, body)]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// The provider answered without any text.
    #[display("{} reply contained no text", _0)]
    EmptyReply(LlmProvider),
}

/// LLM error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", kind, file, line)]
pub struct LlmError {
    /// Error category and detail.
    pub kind: LlmErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    pub fn new(kind: LlmErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_kind = %kind, "LLM error created");
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Request could not be completed.
    #[track_caller]
    pub fn request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Request(message.into()))
    }

    /// Non-2xx provider status.
    #[track_caller]
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Api {
            status,
            body: body.into(),
        })
    }

    /// Reply without text.
    #[track_caller]
    pub fn empty_reply(provider: LlmProvider) -> Self {
        Self::new(LlmErrorKind::EmptyReply(provider))
    }
}
