//! Plain-text line protocol for playing over a terminal or a socket.
//!
//! A request is one line holding two integers, `"<x> <y>"`. Replies are
//! single lines prefixed with a status code:
//!
//! - `0, <message>` - information or success
//! - `1, <message>` - the request was refused
//!
//! The board is sent as its text rendering before every turn.
//!
//! ## Example session (local)
//!
//! ```text
//! Move #1
//!    0 1 2
//!  0 . . .
//!  1 . . .
//!  2 . . .
//! White's turn: 1 1
//! ```

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use derive_more::{Display, Error};
use tracing::debug;

use crate::board::MoveOutcome;
use crate::game::Game;
use crate::grid::Color;

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ProtocolError {
    #[display("should be 'x y', got: {input}")]
    Malformed { input: String },
    #[display("({x}, {y}) is outside the board")]
    Negative { x: i64, y: i64 },
}

/// Parse a `"<x> <y>"` request line.
pub fn parse_position(line: &str) -> Result<(usize, usize), ProtocolError> {
    let malformed = || ProtocolError::Malformed {
        input: line.trim().to_string(),
    };
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [x, y] = parts.as_slice() else {
        return Err(malformed());
    };
    let x: i64 = x.parse().map_err(|_| malformed())?;
    let y: i64 = y.parse().map_err(|_| malformed())?;
    match (usize::try_from(x), usize::try_from(y)) {
        (Ok(x), Ok(y)) => Ok((x, y)),
        _ => Err(ProtocolError::Negative { x, y }),
    }
}

/// One status line sent back to a player.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Reply {
    #[display("0, {_0}")]
    Info(String),
    #[display("1, {_0}")]
    Refused(String),
}

impl Reply {
    pub fn invalid(reason: impl std::fmt::Display) -> Self {
        Reply::Refused(format!("Invalid move: {reason}"))
    }

    /// Reply for a resolved move.
    pub fn for_outcome(outcome: MoveOutcome) -> Self {
        match outcome {
            MoveOutcome::Committed { captured: 0 } => Reply::Info("Ok".to_string()),
            MoveOutcome::Committed { captured } => {
                Reply::Info(format!("Ok, captured {captured} stone(s)"))
            }
            rejected => Reply::invalid(rejected),
        }
    }
}

fn render(game: &Game, show_liberties: bool) -> String {
    let board = game.board();
    format!(
        "Move #{}\n{}",
        board.moves() + 1,
        board.grid().render(show_liberties)
    )
}

/// Hot-seat play: both colors take turns on the same input.
///
/// Ends on end of input or a `quit` line.
pub fn run_local<R: BufRead, W: Write>(
    game: &mut Game,
    input: R,
    mut output: W,
    show_liberties: bool,
) -> Result<()> {
    let mut lines = input.lines();
    loop {
        write!(output, "{}", render(game, show_liberties))?;
        write!(output, "{}'s turn: ", game.turn())?;
        output.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("reading move")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = match parse_position(line) {
            Ok((x, y)) => Reply::for_outcome(game.play_here(x, y)),
            Err(e) => Reply::invalid(e),
        };
        writeln!(output, "{reply}")?;
    }
    Ok(())
}

/// One side of a networked match.
pub struct Player<R, W> {
    pub reader: R,
    pub writer: W,
}

impl<R: BufRead, W: Write> Player<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn send(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn reply(&mut self, reply: &Reply) -> Result<()> {
        self.send(&format!("{reply}\n"))
    }

    /// Next request line, or `None` once the player is gone.
    fn request(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") {
            return Ok(None);
        }
        Ok(Some(line.to_string()))
    }
}

/// Run a two-player match until one side leaves. Returns the color that left.
///
/// A player leaves by sending `quit`, closing the connection, or failing a
/// read or write. The remaining player is told with `1, Opponent left`.
pub fn play_match<R: BufRead, W: Write>(
    game: &mut Game,
    white: &mut Player<R, W>,
    black: &mut Player<R, W>,
    show_liberties: bool,
) -> Color {
    loop {
        let board = render(game, show_liberties);
        if let Err(e) = white.send(&board) {
            return opponent_left(Color::White, black, &e);
        }
        if let Err(e) = black.send(&board) {
            return opponent_left(Color::Black, white, &e);
        }

        let turn = game.turn();
        let (current, other) = match turn {
            Color::White => (&mut *white, &mut *black),
            Color::Black => (&mut *black, &mut *white),
        };
        if let Err(e) = current.reply(&Reply::Info(format!("{turn}'s turn"))) {
            return opponent_left(turn, other, &e);
        }
        if let Err(e) = other.reply(&Reply::Info("Wait for your turn".to_string())) {
            return opponent_left(turn.opponent(), current, &e);
        }

        let line = match current.request() {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!(%turn, "player quit");
                let _ = other.reply(&Reply::Refused("Opponent left".to_string()));
                return turn;
            }
            Err(e) => return opponent_left(turn, other, &e),
        };
        let reply = match parse_position(&line) {
            Ok((x, y)) => {
                let outcome = game.play_here(x, y);
                debug!(%turn, x, y, %outcome, "match move");
                (!outcome.is_committed()).then(|| Reply::for_outcome(outcome))
            }
            Err(e) => Some(Reply::invalid(e)),
        };
        if let Some(reply) = reply {
            if let Err(e) = current.reply(&reply) {
                return opponent_left(turn, other, &e);
            }
        }
    }
}

/// `color` dropped out; tell the remaining player, who may be gone as well.
fn opponent_left<R: BufRead, W: Write>(
    color: Color,
    remaining: &mut Player<R, W>,
    cause: &anyhow::Error,
) -> Color {
    debug!(%color, "player connection lost: {cause:#}");
    let _ = remaining.reply(&Reply::Refused("Opponent left".to_string()));
    color
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("3 4"), Ok((3, 4)));
        assert_eq!(parse_position("  0\t8 \n"), Ok((0, 8)));
        assert_eq!(
            parse_position("-1 2"),
            Err(ProtocolError::Negative { x: -1, y: 2 })
        );
        assert!(matches!(
            parse_position("a b"),
            Err(ProtocolError::Malformed { .. })
        ));
        assert!(parse_position("1").is_err());
        assert!(parse_position("1 2 3").is_err());
    }

    #[test]
    fn test_reply_format() {
        assert_eq!(Reply::Info("Wait for your turn".into()).to_string(), "0, Wait for your turn");
        assert_eq!(
            Reply::for_outcome(MoveOutcome::RejectedKo).to_string(),
            "1, Invalid move: ko: repeats the position from two moves ago"
        );
        assert_eq!(
            Reply::for_outcome(MoveOutcome::Committed { captured: 2 }).to_string(),
            "0, Ok, captured 2 stone(s)"
        );
        assert_eq!(
            Reply::invalid(ProtocolError::Malformed { input: "x".into() }).to_string(),
            "1, Invalid move: should be 'x y', got: x"
        );
    }

    #[test]
    fn test_run_local() {
        let mut game = Game::new(3, 4.5).unwrap();
        let input = Cursor::new("1 1\n\n1 1\nfoo\n0 9\n0 0\nquit\n2 2\n");
        let mut output = Vec::new();
        run_local(&mut game, input, &mut output, false).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("White's turn: 0, Ok"));
        assert!(text.contains("1, Invalid move: point is occupied"));
        assert!(text.contains("1, Invalid move: should be 'x y', got: foo"));
        assert!(text.contains("1, Invalid move: point is outside the board"));
        assert_eq!(game.board().moves(), 2);
        assert_eq!(game.turn(), Color::White);
    }

    #[test]
    fn test_match_until_player_leaves() {
        let mut game = Game::new(3, 4.5).unwrap();
        let mut white = Player::new(Cursor::new(b"0 0\n1 1\n".to_vec()), Vec::new());
        let mut black = Player::new(Cursor::new(b"0 0\nbad\n2 2\n".to_vec()), Vec::new());

        let left = play_match(&mut game, &mut white, &mut black, false);
        // White: 0 0, 1 1. Black: 0 0 (occupied), bad, 2 2, then nothing left.
        assert_eq!(left, Color::Black);
        assert_eq!(game.board().moves(), 3);

        let black_out = String::from_utf8(black.writer).unwrap();
        assert!(black_out.contains("1, Invalid move: point is occupied"));
        assert!(black_out.contains("1, Invalid move: should be 'x y', got: bad"));
        assert!(black_out.contains("0, Black's turn"));

        let white_out = String::from_utf8(white.writer).unwrap();
        assert!(white_out.contains("0, White's turn"));
        assert!(white_out.contains("0, Wait for your turn"));
        assert!(white_out.ends_with("1, Opponent left\n"));
    }

    /// Accepts `budget` writes, then fails like a reset connection.
    struct HangUp {
        budget: usize,
        written: Vec<u8>,
    }

    impl Write for HangUp {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.budget == 0 {
                return Err(std::io::ErrorKind::BrokenPipe.into());
            }
            self.budget -= 1;
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_match_ends_when_a_write_fails() {
        let mut game = Game::new(3, 4.5).unwrap();
        let mut white = Player::new(
            Cursor::new(b"0 0\n1 1\n".to_vec()),
            HangUp { budget: usize::MAX, written: Vec::new() },
        );
        // Black's connection breaks after the first board and its wait line.
        let mut black = Player::new(
            Cursor::new(b"2 2\n".to_vec()),
            HangUp { budget: 2, written: Vec::new() },
        );

        let left = play_match(&mut game, &mut white, &mut black, false);
        assert_eq!(left, Color::Black);

        let white_out = String::from_utf8(white.writer.written).unwrap();
        assert!(white_out.ends_with("1, Opponent left\n"));
        // White's first move landed before Black's second board failed.
        assert_eq!(game.board().moves(), 1);
    }

    #[test]
    fn test_match_ends_when_both_connections_fail() {
        let mut game = Game::new(3, 4.5).unwrap();
        let mut white = Player::new(
            Cursor::new(Vec::<u8>::new()),
            HangUp { budget: 0, written: Vec::new() },
        );
        let mut black = Player::new(
            Cursor::new(Vec::<u8>::new()),
            HangUp { budget: 0, written: Vec::new() },
        );
        assert_eq!(
            play_match(&mut game, &mut white, &mut black, false),
            Color::White
        );
        assert!(black.writer.written.is_empty());
    }
}
