//! Defaults for board geometry, history depth and the network front end.

/// Default board size (NxN) when none is given on the command line.
pub const DEFAULT_SIZE: usize = 9;

/// Number of board snapshots and moves the history keeps.
pub const HISTORY_DEPTH: usize = 3;

/// Default komi (compensation points). Stored, never scored.
pub const DEFAULT_KOMI: f32 = 4.5;

/// Default TCP port for `goban serve`.
pub const DEFAULT_PORT: u16 = 9060;

/// Default port for `goban http`.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Orthogonal neighbor offsets as `(dx, dy)`.
/// Order: left, right, down, up. Traversals depend on this order being fixed.
pub const DELTA: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, 1), (0, -1)];

// =============================================================================
// Rendering
// =============================================================================

/// White stone.
pub const STONE_WHITE: char = 'O';

/// Black stone.
pub const STONE_BLACK: char = 'X';

/// Empty point.
pub const EMPTY: char = '.';
