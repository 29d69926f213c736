//! Fixed-depth record of recent moves and the boards they produced.

use std::collections::VecDeque;

use crate::error::BoardError;
use crate::grid::{Grid, Move};

/// Immutable copy of the grid taken right after a committed move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    grid: Grid,
}

impl Snapshot {
    pub fn new(grid: &Grid) -> Self {
        Self { grid: grid.clone() }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

/// Two FIFOs of equal capacity: committed moves and the snapshots after them.
#[derive(Clone, Debug)]
pub struct History {
    depth: usize,
    moves: VecDeque<Move>,
    boards: VecDeque<Snapshot>,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            moves: VecDeque::with_capacity(depth + 1),
            boards: VecDeque::with_capacity(depth + 1),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of snapshots currently retained.
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn record_move(&mut self, mv: Move) {
        self.moves.push_back(mv);
        if self.moves.len() > self.depth {
            self.moves.pop_front();
        }
    }

    pub fn record_board(&mut self, snapshot: Snapshot) {
        self.boards.push_back(snapshot);
        if self.boards.len() > self.depth {
            self.boards.pop_front();
        }
    }

    /// Snapshot `offset` commits back; `0` is the most recent.
    pub fn board_at(&self, offset: usize) -> Result<&Snapshot, BoardError> {
        let available = self.boards.len();
        if offset >= available {
            return Err(BoardError::InsufficientHistory {
                requested: offset + 1,
                available,
            });
        }
        Ok(&self.boards[available - 1 - offset])
    }

    /// Up to `depth` most recent `(move, snapshot)` pairs, oldest first.
    ///
    /// # Panics
    /// If the move and board records have drifted apart.
    pub fn entries(&self, depth: usize) -> Vec<(Move, &Snapshot)> {
        assert_eq!(
            self.moves.len(),
            self.boards.len(),
            "move and board history out of step"
        );
        let skip = self.boards.len().saturating_sub(depth);
        self.moves
            .iter()
            .copied()
            .zip(self.boards.iter())
            .skip(skip)
            .collect()
    }
}
