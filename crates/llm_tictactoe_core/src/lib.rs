//! Pure tic-tac-toe game logic for playing against an LLM-backed opponent.
//!
//! # Architecture
//!
//! - **Board model**: [`Game`] owns a 3x3 [`Board`] and the player to move.
//!   Status, turn number and legal moves are derived from the board on demand.
//! - **Rules**: pure win/draw functions in [`rules`].
//! - **Coordinator**: [`Coordinator`] validates and applies moves from the local
//!   player and from an external [`MoveService`], and drives a [`GameView`].
//! - **Protocol**: JSON wire types exchanged with the move-suggestion service.
//!
//! # Example
//!
//! ```
//! use llm_tictactoe_core::{Coordinator, GameStatus, Position, RecordingView};
//!
//! let mut coordinator = Coordinator::new(RecordingView::default());
//! coordinator.handle_local_move(Position::new(1, 1).unwrap());
//! assert_eq!(coordinator.game().status(), GameStatus::InProgress);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod coordinator;
mod game;
mod position;
mod protocol;
pub mod rules;
mod service;
mod types;
mod view;

pub use coordinator::{
    AutomatedOutcome, Coordinator, MoveOutcome, PendingRequest, RequestRejection, RequestTicket,
};
pub use game::Game;
pub use position::{Position, PositionError};
pub use protocol::{GameSnapshot, MoveReply, MoveRequest, MoveResponse, StatusLabel};
pub use service::{MoveService, MoveServiceError, MoveServiceErrorKind};
pub use types::{BOARD_SIZE, Board, GameStatus, Player, Square};
pub use view::{GameView, RecordingView, ViewEvent};
