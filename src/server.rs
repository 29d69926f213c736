//! TCP front end for the line protocol.
//!
//! Connections are seated through a [`Lobby`]; once a game has both players
//! it is taken out of the lobby and played to the end on its own thread. The
//! game is owned by that thread alone, so moves are applied one at a time.
//!
//! A player still waiting for a partner is checked before the next
//! connection is seated; if the waiting connection has closed, its game is
//! abandoned and the newcomer opens a fresh one.

use std::io::{self, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::lobby::{Lobby, Match};
use crate::protocol::{Player, Reply, play_match};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Port to listen on; 0 picks a free one.
    pub port: u16,
    pub size: usize,
    pub komi: f32,
    pub show_liberties: bool,
}

pub struct Server {
    config: ServerConfig,
    listener: TcpListener,
    lobby: Lobby<TcpStream>,
}

impl Server {
    pub fn bind(config: ServerConfig) -> Result<Self> {
        let lobby = Lobby::new(config.size, config.komi).context("invalid board size")?;
        let listener = TcpListener::bind(("0.0.0.0", config.port))
            .with_context(|| format!("failed to listen on port {}", config.port))?;
        Ok(Self {
            config,
            listener,
            lobby,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever. A failed accept is logged and skipped.
    pub fn run(&mut self) -> Result<()> {
        info!(addr = %self.local_addr()?, "listening");
        loop {
            let stream = match self.listener.accept() {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!("connection issue: {e}");
                    continue;
                }
            };
            if let Err(e) = self.admit(stream) {
                warn!("could not admit player: {e:#}");
            }
        }
    }

    fn admit(&mut self, mut stream: TcpStream) -> Result<()> {
        let peer = stream.peer_addr()?;
        writeln!(stream, "{}", Reply::Info("Welcome player! Waiting for partner".into()))?;
        self.drop_hung_up_waiter();

        let mut notice = stream.try_clone()?;
        let seat = self.lobby.seat(stream);
        info!(%peer, game_id = seat.game_id, color = %seat.color, "player seated");
        let seated = Reply::Info(format!(
            "Seated in game {} as {}, token {}",
            seat.game_id, seat.color, seat.token
        ));
        if let Err(e) = writeln!(notice, "{seated}") {
            debug!(%peer, "could not send seat: {e}");
        }
        if !self.lobby.is_ready(seat.game_id) {
            return Ok(());
        }

        let started = self.lobby.start(seat.game_id)?;
        let show_liberties = self.config.show_liberties;
        thread::spawn(move || {
            let game_id = started.game_id;
            match run_match(started, show_liberties) {
                Ok(()) => info!(game_id, "match over"),
                Err(e) => warn!(game_id, "match aborted: {e:#}"),
            }
        });
        Ok(())
    }

    /// Abandon the waiting game if its player has disconnected.
    fn drop_hung_up_waiter(&mut self) {
        let stale = self
            .lobby
            .waiting()
            .filter(|(_, stream)| hung_up(stream))
            .map(|(game_id, _)| game_id);
        if let Some(game_id) = stale {
            if self.lobby.abandon(game_id).is_ok() {
                info!(game_id, "waiting player left");
            }
        }
    }
}

/// Whether the peer has closed `stream`. Unread data counts as alive.
fn hung_up(stream: &TcpStream) -> bool {
    if stream.set_nonblocking(true).is_err() {
        return true;
    }
    let mut buf = [0u8; 1];
    let closed = match stream.peek(&mut buf) {
        Ok(0) => true,
        Ok(_) => false,
        Err(e) => e.kind() != io::ErrorKind::WouldBlock,
    };
    stream.set_nonblocking(false).is_err() || closed
}

fn run_match(started: Match<TcpStream>, show_liberties: bool) -> Result<()> {
    let Match {
        game_id,
        mut game,
        white,
        black,
    } = started;
    info!(
        game_id,
        white = %white.peer_addr()?,
        black = %black.peer_addr()?,
        "match started"
    );
    let mut white = Player::new(BufReader::new(white.try_clone()?), white);
    let mut black = Player::new(BufReader::new(black.try_clone()?), black);
    let left = play_match(&mut game, &mut white, &mut black, show_liberties);
    info!(game_id, %left, moves = game.board().moves(), "player left");
    Ok(())
}
