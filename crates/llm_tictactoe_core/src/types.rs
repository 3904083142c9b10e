//! Core domain types for tic-tac-toe.

use crate::position::Position;
use serde::{Deserialize, Serialize};

/// Side length of the board.
pub const BOARD_SIZE: usize = 3;

/// Player in the game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
pub enum Player {
    /// Player X (goes first, the local human).
    X,
    /// Player O (goes second, supplied by the move service).
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// A square on the tic-tac-toe board.
///
/// On the wire an empty square is `""` and an occupied one is `"X"` or `"O"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Square {
    /// Empty square.
    #[default]
    Empty,
    /// Square occupied by a player.
    Occupied(Player),
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        match square {
            Square::Empty => String::new(),
            Square::Occupied(player) => player.to_string(),
        }
    }
}

impl TryFrom<String> for Square {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "" => Ok(Square::Empty),
            "X" => Ok(Square::Occupied(Player::X)),
            "O" => Ok(Square::Occupied(Player::O)),
            other => Err(format!("invalid square mark {:?}", other)),
        }
    }
}

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; BOARD_SIZE * BOARD_SIZE],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the square at the given position.
    pub fn get(&self, pos: Position) -> Square {
        self.squares[pos.index()]
    }

    /// Sets the square at the given position.
    ///
    /// Does not check occupancy. Callers that need write-once cells
    /// go through [`crate::Coordinator::apply_move`].
    pub fn set(&mut self, pos: Position, square: Square) {
        self.squares[pos.index()] = square;
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// Returns all squares in row-major order.
    pub fn squares(&self) -> &[Square; BOARD_SIZE * BOARD_SIZE] {
        &self.squares
    }

    /// Number of occupied squares.
    pub fn occupied(&self) -> usize {
        self.squares.iter().filter(|s| **s != Square::Empty).count()
    }

    /// Returns the board as rows of squares.
    pub fn rows(&self) -> [[Square; BOARD_SIZE]; BOARD_SIZE] {
        let mut rows = [[Square::Empty; BOARD_SIZE]; BOARD_SIZE];
        for pos in Position::ALL {
            rows[pos.row()][pos.col()] = self.get(pos);
        }
        rows
    }

    /// Formats the board as a human-readable string.
    ///
    /// Empty squares show their `row,col` coordinates so the grid doubles as
    /// a legend for move entry.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for (r, row) in self.rows().iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(c, square)| match square {
                    Square::Empty => format!("{},{}", r, c),
                    Square::Occupied(player) => format!(" {} ", player),
                })
                .collect();
            result.push_str(&cells.join("|"));
            if r < BOARD_SIZE - 1 {
                result.push_str("\n---+---+---\n");
            }
        }
        result
    }
}

/// Current status of the game, always derived from the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// Game ended in a win.
    Won(Player),
    /// Game ended in a draw.
    Draw,
}

impl GameStatus {
    /// True for any status other than `InProgress`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// Human-readable outcome for a finished game.
    pub fn outcome_message(self) -> Option<String> {
        match self {
            GameStatus::InProgress => None,
            GameStatus::Won(player) => Some(format!("{} wins!", player)),
            GameStatus::Draw => Some("It's a draw!".to_string()),
        }
    }
}
