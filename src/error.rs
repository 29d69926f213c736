//! Error types for board construction, coordinate lookups and history access.
//!
//! Rule violations (occupied point, suicide, ko) are not errors: they are
//! reported as [`MoveOutcome`](crate::board::MoveOutcome) values.

use derive_more::{Display, Error};

/// Input errors raised before any board mutation takes place.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// A board must have at least one point.
    #[display("board size must be positive, got {size}")]
    InvalidSize { size: usize },

    /// Coordinates outside `[0, size)`.
    #[display("({x}, {y}) is outside the {size}x{size} board")]
    OutOfBounds { x: usize, y: usize, size: usize },

    /// Fewer snapshots recorded than the lookup needs.
    #[display("history holds {available} snapshot(s), {requested} needed")]
    InsufficientHistory { requested: usize, available: usize },
}
