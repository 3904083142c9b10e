//! JSON wire types exchanged with the move-suggestion service.

use crate::position::Position;
use crate::types::{BOARD_SIZE, GameStatus, Player, Square};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Status string sent in `gameState.status`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
pub enum StatusLabel {
    /// Game is ongoing.
    #[serde(rename = "playing")]
    #[strum(serialize = "playing")]
    Playing,
    /// X has a line.
    #[serde(rename = "X_won")]
    #[strum(serialize = "X_won")]
    XWon,
    /// O has a line.
    #[serde(rename = "O_won")]
    #[strum(serialize = "O_won")]
    OWon,
    /// Full board, no line.
    #[serde(rename = "draw")]
    #[strum(serialize = "draw")]
    Draw,
}

impl From<GameStatus> for StatusLabel {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::InProgress => StatusLabel::Playing,
            GameStatus::Won(Player::X) => StatusLabel::XWon,
            GameStatus::Won(Player::O) => StatusLabel::OWon,
            GameStatus::Draw => StatusLabel::Draw,
        }
    }
}

/// The `gameState` object of a move request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Board rows, `""` for empty squares.
    pub board: [[Square; BOARD_SIZE]; BOARD_SIZE],
    /// Player to move.
    pub current_player: Player,
    /// Number of marks on the board.
    pub turn: usize,
    /// Derived status.
    pub status: StatusLabel,
}

/// Body of `POST /api/llm_move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Full current state.
    pub game_state: GameSnapshot,
    /// Every empty square, row-major.
    pub available_actions: Vec<Position>,
    /// Free-text instruction from the operator.
    pub instruction: String,
}

/// Response body produced by the move-suggestion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MoveResponse {
    /// A suggested move.
    Move {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },
    /// An application-level failure.
    Error {
        /// Description shown to the operator.
        error: String,
    },
}

impl MoveResponse {
    /// Builds a move response from a position.
    pub fn from_position(pos: Position) -> Self {
        MoveResponse::Move {
            row: pos.row(),
            col: pos.col(),
        }
    }

    /// Builds an error response.
    pub fn error(message: impl Into<String>) -> Self {
        MoveResponse::Error {
            error: message.into(),
        }
    }
}

/// A successfully transported reply, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveReply {
    /// `{row, col}` naming a cell on the board.
    Move(Position),
    /// `{error}` from the service.
    Error(String),
    /// Well-formed JSON of any other shape, including out-of-range coordinates.
    Unexpected(Value),
}

impl MoveReply {
    /// Classifies a parsed JSON body.
    ///
    /// A truthy `error` field wins over coordinates; `null`, `false`, `0` and
    /// `""` do not count. `row` and `col` must both
    /// be non-negative integers inside the board.
    #[instrument(skip_all)]
    pub fn from_value(value: Value) -> Self {
        match value.get("error") {
            Some(Value::String(message)) if !message.is_empty() => {
                debug!(error = %message, "Service returned error");
                return MoveReply::Error(message.clone());
            }
            Some(Value::Null) | Some(Value::Bool(false)) | Some(Value::String(_)) | None => {}
            // Zero is as falsy as `false` for the browser client.
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {}
            Some(other) => return MoveReply::Error(other.to_string()),
        }

        let coordinate = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_u64)
                .and_then(|n| usize::try_from(n).ok())
        };
        match (coordinate("row"), coordinate("col")) {
            (Some(row), Some(col)) => match Position::new(row, col) {
                Some(pos) => MoveReply::Move(pos),
                None => {
                    warn!(row, col, "Service move is outside the board");
                    MoveReply::Unexpected(value)
                }
            },
            _ => {
                warn!(body = %value, "Unexpected response format");
                MoveReply::Unexpected(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Game;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let mut game = Game::new();
        game.place(Position::new(0, 0).unwrap(), Player::X);
        let request = MoveRequest {
            game_state: game.snapshot(),
            available_actions: game.legal_moves(),
            instruction: "take the center".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["gameState"]["board"][0], json!(["X", "", ""]));
        assert_eq!(value["gameState"]["currentPlayer"], json!("X"));
        assert_eq!(value["gameState"]["turn"], json!(1));
        assert_eq!(value["gameState"]["status"], json!("playing"));
        assert_eq!(value["availableActions"][0], json!({"row": 0, "col": 1}));
        assert_eq!(value["availableActions"].as_array().unwrap().len(), 8);
        assert_eq!(value["instruction"], json!("take the center"));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(StatusLabel::from(GameStatus::Won(Player::O)).to_string(), "O_won");
        assert_eq!(StatusLabel::from(GameStatus::Draw).to_string(), "draw");
        assert_eq!(serde_json::to_value(StatusLabel::XWon).unwrap(), json!("X_won"));
    }

    #[test]
    fn test_reply_classification() {
        assert_eq!(
            MoveReply::from_value(json!({"row": 1, "col": 2})),
            MoveReply::Move(Position::new(1, 2).unwrap())
        );
        assert_eq!(
            MoveReply::from_value(json!({"error": "rate limited"})),
            MoveReply::Error("rate limited".to_string())
        );
        assert!(matches!(
            MoveReply::from_value(json!({"row": 1})),
            MoveReply::Unexpected(_)
        ));
        assert!(matches!(
            MoveReply::from_value(json!({"row": 3, "col": 0})),
            MoveReply::Unexpected(_)
        ));
        assert!(matches!(
            MoveReply::from_value(json!({"row": -1, "col": 0})),
            MoveReply::Unexpected(_)
        ));
    }

    #[test]
    fn test_falsy_error_falls_through_to_move() {
        assert_eq!(
            MoveReply::from_value(json!({"error": "", "row": 0, "col": 0})),
            MoveReply::Move(Position::new(0, 0).unwrap())
        );
        assert_eq!(
            MoveReply::from_value(json!({"error": 0, "row": 1, "col": 1})),
            MoveReply::Move(Position::new(1, 1).unwrap())
        );
        assert_eq!(
            MoveReply::from_value(json!({"error": 0.0, "row": 2, "col": 2})),
            MoveReply::Move(Position::new(2, 2).unwrap())
        );
        assert_eq!(
            MoveReply::from_value(json!({"error": 7, "row": 1, "col": 1})),
            MoveReply::Error("7".to_string())
        );
    }

    #[test]
    fn test_response_serialization() {
        let pos = Position::new(2, 0).unwrap();
        assert_eq!(
            serde_json::to_value(MoveResponse::from_position(pos)).unwrap(),
            json!({"row": 2, "col": 0})
        );
        assert_eq!(
            serde_json::to_value(MoveResponse::error("nope")).unwrap(),
            json!({"error": "nope"})
        );
    }
}
