//! Bounds-checked board coordinates.

use crate::types::{BOARD_SIZE, Board};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A cell on the board, addressed by `(row, col)` with both below [`BOARD_SIZE`].
///
/// A `Position` can only be built through checked constructors, so every
/// value held by the program is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    row: usize,
    col: usize,
}

#[derive(Deserialize)]
struct RawPosition {
    row: usize,
    col: usize,
}

impl TryFrom<RawPosition> for Position {
    type Error = PositionError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::new(raw.row, raw.col).ok_or(PositionError {
            row: raw.row,
            col: raw.col,
        })
    }
}

/// Coordinates outside the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Position ({}, {}) is outside the 3x3 board", row, col)]
pub struct PositionError {
    /// Requested row.
    pub row: usize,
    /// Requested column.
    pub col: usize,
}

impl Position {
    /// All 9 positions in row-major order.
    pub const ALL: [Position; BOARD_SIZE * BOARD_SIZE] = [
        Position::at(0, 0),
        Position::at(0, 1),
        Position::at(0, 2),
        Position::at(1, 0),
        Position::at(1, 1),
        Position::at(1, 2),
        Position::at(2, 0),
        Position::at(2, 1),
        Position::at(2, 2),
    ];

    pub(crate) const fn at(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Creates a position, or `None` when either coordinate is off the board.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some(Self { row, col })
    }

    /// Creates position from a row-major board index (0-8).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Maps pointer coordinates to the cell under them.
    ///
    /// `cell_size` is the rendered width of one cell. Returns `None` when the
    /// pointer is outside the board, any input is NaN or infinite, or
    /// `cell_size` is not positive.
    #[instrument]
    pub fn from_pointer(x: f32, y: f32, cell_size: f32) -> Option<Self> {
        if !(x.is_finite() && y.is_finite() && cell_size.is_finite()) {
            return None;
        }
        if cell_size <= 0.0 || x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / cell_size).floor() as usize;
        let row = (y / cell_size).floor() as usize;
        Self::new(row, col)
    }

    /// Row index (0-2).
    pub fn row(self) -> usize {
        self.row
    }

    /// Column index (0-2).
    pub fn col(self) -> usize {
        self.col
    }

    /// Converts position to row-major board index (0-8).
    pub fn index(self) -> usize {
        self.row * BOARD_SIZE + self.col
    }

    /// Returns every empty position in row-major order.
    #[instrument(skip(board))]
    pub fn valid_moves(board: &Board) -> Vec<Position> {
        Self::ALL
            .iter()
            .copied()
            .filter(|pos| board.is_empty(*pos))
            .collect()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Player, Square};

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(Position::new(2, 2).is_some());
        assert!(Position::new(3, 0).is_none());
        assert!(Position::new(0, 3).is_none());
    }

    #[test]
    fn test_index_round_trip_order() {
        for (i, pos) in Position::ALL.iter().enumerate() {
            assert_eq!(pos.index(), i);
            assert_eq!(Position::from_index(i), Some(*pos));
        }
        assert_eq!(Position::from_index(9), None);
    }

    #[test]
    fn test_from_pointer() {
        assert_eq!(Position::from_pointer(10.0, 10.0, 100.0), Position::new(0, 0));
        assert_eq!(Position::from_pointer(250.0, 150.0, 100.0), Position::new(1, 2));
        assert_eq!(Position::from_pointer(300.0, 10.0, 100.0), None);
        assert_eq!(Position::from_pointer(-1.0, 10.0, 100.0), None);
        assert_eq!(Position::from_pointer(10.0, 10.0, 0.0), None);
    }

    #[test]
    fn test_from_pointer_rejects_non_finite() {
        assert_eq!(Position::from_pointer(f32::NAN, 10.0, 100.0), None);
        assert_eq!(Position::from_pointer(10.0, f32::NAN, 100.0), None);
        assert_eq!(Position::from_pointer(10.0, 10.0, f32::NAN), None);
        assert_eq!(Position::from_pointer(f32::INFINITY, 10.0, 100.0), None);
    }

    #[test]
    fn test_valid_moves_filters_occupied() {
        let mut board = Board::new();
        board.set(Position::at(0, 0), Square::Occupied(Player::X));
        board.set(Position::at(1, 1), Square::Occupied(Player::O));

        let valid = Position::valid_moves(&board);
        assert_eq!(valid.len(), 7);
        assert!(!valid.contains(&Position::at(0, 0)));
        assert!(!valid.contains(&Position::at(1, 1)));
        assert_eq!(valid.first(), Some(&Position::at(0, 1)));
    }

    #[test]
    fn test_deserialize_checks_bounds() {
        let pos: Position = serde_json::from_str(r#"{"row":2,"col":1}"#).unwrap();
        assert_eq!(pos, Position::at(2, 1));
        assert!(serde_json::from_str::<Position>(r#"{"row":5,"col":1}"#).is_err());
    }
}
