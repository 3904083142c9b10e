//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`]. Status is never cached: every caller
//! recomputes it from the current squares.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{LINES, check_win, winner};

use crate::types::{Board, GameStatus};
use tracing::instrument;

/// Derives the game status from the board.
///
/// Wins are checked before a full board, so a full board containing a line
/// is a win and never a draw.
#[instrument(skip(board))]
pub fn status(board: &Board) -> GameStatus {
    match winner(board) {
        Some(player) => GameStatus::Won(player),
        None if is_full(board) => GameStatus::Draw,
        None => GameStatus::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Player, Position, Square};

    fn board_from(marks: &str) -> Board {
        let mut board = Board::new();
        for (i, c) in marks.chars().enumerate() {
            let square = match c {
                'X' => Square::Occupied(Player::X),
                'O' => Square::Occupied(Player::O),
                _ => Square::Empty,
            };
            board.set(Position::from_index(i).unwrap(), square);
        }
        board
    }

    #[test]
    fn test_empty_board_in_progress() {
        assert_eq!(status(&Board::new()), GameStatus::InProgress);
    }

    #[test]
    fn test_full_board_with_line_is_win() {
        // X X X / O O X / X O O
        let board = board_from("XXXOOXXOO");
        assert!(is_full(&board));
        assert_eq!(status(&board), GameStatus::Won(Player::X));
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        // X O X / X O O / O X X
        let board = board_from("XOXXOOOXX");
        assert_eq!(status(&board), GameStatus::Draw);
    }

    #[test]
    fn test_o_win_detected() {
        let board = board_from("XX.OOOX..");
        assert_eq!(status(&board), GameStatus::Won(Player::O));
    }
}
