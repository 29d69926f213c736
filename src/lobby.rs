//! Pairing players into games.
//!
//! The lobby owns every game that has not been handed to a transport.
//! [`Lobby::seat`] pairs connections in arrival order: the first joins a
//! fresh game as White, the next fills that game as Black. A game can also
//! be opened explicitly with [`Lobby::create`] and filled by id with
//! [`Lobby::join`].
//!
//! A full game is either taken out with [`Lobby::start`] and played by its
//! transport, or left in place and played through [`Lobby::game_mut`].
//!
//! The lobby is generic over the connection type so that transports and
//! tests can seat whatever they use to talk to a player.

use std::collections::HashMap;

use derive_more::{Display, Error};
use tracing::debug;

use crate::error::BoardError;
use crate::game::Game;
use crate::grid::Color;

pub type GameId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum LobbyError {
    #[display("game {game_id} not found")]
    NotFound { game_id: GameId },
    #[display("game {game_id} is still waiting for a player")]
    NotReady { game_id: GameId },
    #[display("game {game_id} has already started")]
    Full { game_id: GameId },
}

/// Where a connection was seated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Seat {
    pub game_id: GameId,
    /// Random token identifying the player within the game.
    pub token: u32,
    pub color: Color,
}

/// A full game taken out of the lobby, ready to be played.
pub struct Match<C> {
    pub game_id: GameId,
    pub game: Game,
    pub white: C,
    pub black: C,
}

struct Session<C> {
    game: Game,
    white: (u32, C),
    black: Option<(u32, C)>,
}

pub struct Lobby<C> {
    template: Game,
    next_id: GameId,
    open: Option<GameId>,
    sessions: HashMap<GameId, Session<C>>,
}

impl<C> Lobby<C> {
    /// A lobby whose games are `size`×`size` with the given komi.
    pub fn new(size: usize, komi: f32) -> Result<Self, BoardError> {
        Ok(Self {
            template: Game::new(size, komi)?,
            next_id: 1,
            open: None,
            sessions: HashMap::new(),
        })
    }

    /// Seat a connection in the waiting game, or open a new one.
    pub fn seat(&mut self, conn: C) -> Seat {
        let conn = match self.open.take() {
            Some(game_id) => match self.join(game_id, conn) {
                Ok(seat) => return seat,
                Err((_, conn)) => conn,
            },
            None => conn,
        };
        let seat = self.create(conn);
        self.open = Some(seat.game_id);
        seat
    }

    /// Open a new game with `conn` as White. The game is only reachable
    /// through [`Lobby::join`], never through [`Lobby::seat`].
    pub fn create(&mut self, conn: C) -> Seat {
        let token = fastrand::u32(..);
        let game_id = self.next_id;
        self.next_id += 1;
        self.sessions.insert(
            game_id,
            Session {
                game: self.template.clone(),
                white: (token, conn),
                black: None,
            },
        );
        debug!(game_id, "new game opened");
        Seat {
            game_id,
            token,
            color: Color::White,
        }
    }

    /// Seat `conn` as Black in `game_id`. On failure the connection is
    /// handed back with the error.
    pub fn join(&mut self, game_id: GameId, conn: C) -> Result<Seat, (LobbyError, C)> {
        let Some(session) = self.sessions.get_mut(&game_id) else {
            return Err((LobbyError::NotFound { game_id }, conn));
        };
        if session.black.is_some() {
            return Err((LobbyError::Full { game_id }, conn));
        }
        // Tokens must tell the two players apart.
        let token = loop {
            let token = fastrand::u32(..);
            if token != session.white.0 {
                break token;
            }
        };
        session.black = Some((token, conn));
        if self.open == Some(game_id) {
            self.open = None;
        }
        debug!(game_id, "second player seated");
        Ok(Seat {
            game_id,
            token,
            color: Color::Black,
        })
    }

    /// The game [`Lobby::seat`] would fill next, with its waiting connection.
    pub fn waiting(&self) -> Option<(GameId, &C)> {
        let game_id = self.open?;
        let session = self.sessions.get(&game_id)?;
        Some((game_id, &session.white.1))
    }

    pub fn is_ready(&self, game_id: GameId) -> bool {
        self.sessions
            .get(&game_id)
            .is_some_and(|s| s.black.is_some())
    }

    /// Which color holds `token` in `game_id`, if any.
    pub fn color_of(&self, game_id: GameId, token: u32) -> Option<Color> {
        let session = self.sessions.get(&game_id)?;
        if session.white.0 == token {
            return Some(Color::White);
        }
        match &session.black {
            Some((t, _)) if *t == token => Some(Color::Black),
            _ => None,
        }
    }

    pub fn game(&self, game_id: GameId) -> Option<&Game> {
        self.sessions.get(&game_id).map(|s| &s.game)
    }

    pub fn game_mut(&mut self, game_id: GameId) -> Option<&mut Game> {
        self.sessions.get_mut(&game_id).map(|s| &mut s.game)
    }

    /// Take a full game out of the lobby.
    pub fn start(&mut self, game_id: GameId) -> Result<Match<C>, LobbyError> {
        if !self.sessions.contains_key(&game_id) {
            return Err(LobbyError::NotFound { game_id });
        }
        if !self.is_ready(game_id) {
            return Err(LobbyError::NotReady { game_id });
        }
        let Some(Session {
            game,
            white: (_, white),
            black: Some((_, black)),
        }) = self.sessions.remove(&game_id)
        else {
            return Err(LobbyError::NotFound { game_id });
        };
        Ok(Match {
            game_id,
            game,
            white,
            black,
        })
    }

    /// Drop a waiting game, returning its lone connection.
    pub fn abandon(&mut self, game_id: GameId) -> Result<C, LobbyError> {
        if self.is_ready(game_id) {
            return Err(LobbyError::NotReady { game_id });
        }
        let session = self
            .sessions
            .remove(&game_id)
            .ok_or(LobbyError::NotFound { game_id })?;
        if self.open == Some(game_id) {
            self.open = None;
        }
        Ok(session.white.1)
    }

    /// Number of games waiting or ready but not yet started.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
