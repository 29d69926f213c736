//! Board state and move execution.
//!
//! [`apply_move`] is the single entry point that changes a board. It works on
//! a scratch copy of the grid in this order:
//!
//! 1. reject out-of-bounds and occupied points;
//! 2. take one liberty from every neighbor of the target point;
//! 3. remove every adjacent opponent group left with no liberty;
//! 4. place the stone and reject it if its own group has no liberty;
//! 5. reject the result if it repeats the board from two commits back (ko);
//! 6. commit the scratch grid and record it in the history.
//!
//! A rejected move never touches the board: the scratch grid is dropped.

use std::fmt;

use derive_more::Display;
use serde::Serialize;
use tracing::debug;

use crate::constants::HISTORY_DEPTH;
use crate::error::BoardError;
use crate::grid::{Grid, Move};
use crate::group::{Visited, capture, is_captured};
use crate::history::{History, Snapshot};

/// Terminal state of one [`apply_move`] call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// The stone was placed, capturing this many opponent stones.
    #[display("committed, {captured} stone(s) captured")]
    Committed { captured: usize },
    #[display("point is occupied")]
    RejectedOccupied,
    #[display("no liberty left for the placed stone")]
    RejectedNoLiberty,
    #[display("ko: repeats the position from two moves ago")]
    RejectedKo,
    #[display("point is outside the board")]
    OutOfBounds,
}

impl MoveOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, MoveOutcome::Committed { .. })
    }
}

/// A game board: the grid plus the history needed for ko.
#[derive(Clone, Debug)]
pub struct Board {
    grid: Grid,
    /// Number of committed moves
    moves: usize,
    history: History,
}

impl Board {
    pub fn new(size: usize) -> Result<Self, BoardError> {
        create_board(size)
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.entries(1).first().map(|(mv, _)| *mv)
    }
}

/// Create an empty `size`×`size` board.
pub fn create_board(size: usize) -> Result<Board, BoardError> {
    Ok(Board {
        grid: Grid::new(size)?,
        moves: 0,
        history: History::new(HISTORY_DEPTH),
    })
}

/// Try to place a stone. See the module docs for the order of checks.
pub fn apply_move(board: &mut Board, mv: Move) -> MoveOutcome {
    let outcome = try_move(board, mv);
    debug!(%mv, %outcome, moves = board.moves, "move resolved");
    outcome
}

fn try_move(board: &mut Board, mv: Move) -> MoveOutcome {
    let pt = mv.point();
    let Ok(target) = board.grid.get(mv.x, mv.y) else {
        return MoveOutcome::OutOfBounds;
    };
    if !target.is_empty() {
        return MoveOutcome::RejectedOccupied;
    }

    let mut next = board.grid.clone();
    let neighbors: Vec<_> = next.neighbors(mv.x, mv.y).collect();
    for &n in &neighbors {
        next.adjust_liberty(n, -1);
    }

    let opponent = mv.color.opponent();
    let mut captured = 0;
    for &n in &neighbors {
        let cell = next.at(n);
        if cell.stone != Some(opponent) || cell.liberty > 0 {
            continue;
        }
        let mut visited = Visited::new(&next);
        if is_captured(&next, n, &mut visited) {
            captured += capture(&mut next, n);
        }
    }

    next.set_stone(pt, Some(mv.color));
    let mut visited = Visited::new(&next);
    if is_captured(&next, pt, &mut visited) {
        return MoveOutcome::RejectedNoLiberty;
    }

    // Fewer than two snapshots means no ko is possible yet.
    if let Ok(before) = board.history.board_at(1) {
        if next.same_layout(before.grid()) {
            return MoveOutcome::RejectedKo;
        }
    }

    board.history.record_move(mv);
    board.history.record_board(Snapshot::new(&next));
    board.grid = next;
    board.moves += 1;
    MoveOutcome::Committed { captured }
}

/// Read-only view of the current grid.
pub fn board_snapshot(board: &Board) -> &Grid {
    &board.grid
}

/// Up to `depth` most recent committed moves with the board each produced,
/// oldest first.
pub fn history(board: &Board, depth: usize) -> Vec<(Move, &Snapshot)> {
    board.history.entries(depth)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Move #{}", self.moves + 1)?;
        write!(f, "{}", self.grid)
    }
}
