//! Turn order on top of a [`Board`].

use derive_more::{Display, Error};

use crate::board::{Board, MoveOutcome, apply_move};
use crate::error::BoardError;
use crate::grid::{Color, Move};

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GameError {
    #[display("not your turn: {expected} to move, got {got}")]
    NotYourTurn { expected: Color, got: Color },
}

/// One game: a board, whose turn it is, and the komi.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    turn: Color,
    komi: f32,
}

impl Game {
    pub fn new(size: usize, komi: f32) -> Result<Self, BoardError> {
        Ok(Self {
            board: Board::new(size)?,
            turn: Color::White,
            komi,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn komi(&self) -> f32 {
        self.komi
    }

    /// Play a move for `mv.color`, which must be the side to move.
    /// The turn passes only when the move is committed.
    pub fn play(&mut self, mv: Move) -> Result<MoveOutcome, GameError> {
        if mv.color != self.turn {
            return Err(GameError::NotYourTurn {
                expected: self.turn,
                got: mv.color,
            });
        }
        Ok(self.play_here(mv.x, mv.y))
    }

    /// Play at `(x, y)` for whoever is to move.
    pub fn play_here(&mut self, x: usize, y: usize) -> MoveOutcome {
        let mv = Move::new(x, y, self.turn);
        let outcome = apply_move(&mut self.board, mv);
        if outcome.is_committed() {
            self.turn = self.turn.opponent();
        }
        outcome
    }
}
