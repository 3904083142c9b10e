//! The board model: a board plus the player to move.

use crate::position::Position;
use crate::protocol::GameSnapshot;
use crate::rules;
use crate::types::{Board, GameStatus, Player, Square};
use tracing::{debug, instrument};

/// Tic-tac-toe game state.
///
/// Only the board and the player to move are stored. Status, turn number
/// and legal moves are recomputed from the board on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    current_player: Player,
}

impl Game {
    /// Creates a new game with an empty board and X to move.
    #[instrument]
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Player::X,
        }
    }

    /// Resets every square to empty and hands the move back to X.
    #[instrument(skip(self))]
    pub fn initialize(&mut self) {
        debug!("Initializing board");
        *self = Self::new();
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player to move.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Checks if the square at `pos` is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.board.is_empty(pos)
    }

    /// Writes `player`'s mark at `pos`.
    ///
    /// The square must be empty; occupancy is the coordinator's check,
    /// not this method's.
    #[instrument(skip_all, fields(position = %pos, player = %player))]
    pub fn place(&mut self, pos: Position, player: Player) {
        self.board.set(pos, Square::Occupied(player));
    }

    /// True iff `player` holds a complete line.
    pub fn check_win(&self, player: Player) -> bool {
        rules::check_win(&self.board, player)
    }

    /// True iff every square is occupied.
    pub fn check_draw(&self) -> bool {
        rules::is_full(&self.board)
    }

    /// Derives the status from the board.
    pub fn status(&self) -> GameStatus {
        rules::status(&self.board)
    }

    /// Every empty position in row-major order.
    pub fn legal_moves(&self) -> Vec<Position> {
        Position::valid_moves(&self.board)
    }

    /// Number of marks placed so far.
    pub fn turn(&self) -> usize {
        self.board.occupied()
    }

    /// Captures the board, player to move, turn and status for the wire.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.rows(),
            current_player: self.current_player,
            turn: self.turn(),
            status: self.status().into(),
        }
    }

    pub(crate) fn advance_turn(&mut self) {
        self.current_player = self.current_player.opponent();
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game() {
        let game = Game::new();
        assert_eq!(game.current_player(), Player::X);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.legal_moves().len(), 9);
        assert_eq!(game.turn(), 0);
    }

    #[test]
    fn test_initialize_clears_board() {
        let mut game = Game::new();
        game.place(Position::new(0, 0).unwrap(), Player::X);
        game.advance_turn();
        game.initialize();
        assert_eq!(game, Game::new());
    }

    #[test]
    fn test_status_tracks_board_without_caching() {
        let mut game = Game::new();
        for col in 0..3 {
            assert_eq!(game.status(), GameStatus::InProgress);
            game.place(Position::new(2, col).unwrap(), Player::O);
        }
        assert_eq!(game.status(), GameStatus::Won(Player::O));
        game.initialize();
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_turn_counts_marks() {
        let mut game = Game::new();
        game.place(Position::new(0, 0).unwrap(), Player::X);
        game.place(Position::new(2, 2).unwrap(), Player::O);
        assert_eq!(game.turn(), 2);
        assert_eq!(game.legal_moves().len(), 7);
    }
}
