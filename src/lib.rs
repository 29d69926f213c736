//! Goban: a rule engine for the board game Go.
//!
//! The engine tracks stones on an N×N grid, keeps a cached liberty count per
//! point, captures groups that run out of liberties, rejects suicide, and
//! rejects a move that recreates the board from two moves earlier (ko).
//!
//! ## Modules
//!
//! - [`grid`] - Cells, stones and the N×N grid
//! - [`group`] - Group traversal, capture detection and removal
//! - [`history`] - Recent moves and board snapshots
//! - [`board`] - Move validation and application
//! - [`game`] - Turn order
//! - [`lobby`] - Pairing players into games
//! - [`protocol`] - Text line protocol
//! - [`server`] - TCP server
//! - [`http`] - HTTP/JSON server
//!
//! ## Example
//!
//! ```
//! use goban::board::{MoveOutcome, apply_move, board_snapshot, create_board};
//! use goban::grid::{Color, Move};
//!
//! let mut board = create_board(9).unwrap();
//! let outcome = apply_move(&mut board, Move::new(4, 4, Color::White));
//! assert_eq!(outcome, MoveOutcome::Committed { captured: 0 });
//! println!("{}", board_snapshot(&board));
//! ```

pub mod board;
pub mod constants;
pub mod error;
pub mod game;
pub mod grid;
pub mod group;
pub mod history;
pub mod http;
pub mod lobby;
pub mod protocol;
pub mod server;
