//! HTTP/JSON front end.
//!
//! Games live in a shared [`Lobby`] and are played in place, one request at a
//! time under the lobby lock.
//!
//! | Route | Action |
//! |---|---|
//! | `GET /health` | `{"health": "OK"}` |
//! | `POST /game` | open a game as White |
//! | `GET /game/{id}` | game state, for its players only |
//! | `POST /game/{id}` | join an open game as Black |
//! | `POST /game/{id}/move` | play `{"x": .., "y": ..}` for the caller's color |
//!
//! Opening or joining a game returns the seat in the body and in the
//! `gameID`/`sessionID` headers. Later requests prove who they are with the
//! `sessionID` header. Errors are `{"message": ...}` bodies.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::board::MoveOutcome;
use crate::error::BoardError;
use crate::game::{Game, GameError};
use crate::grid::{Color, Grid, Move};
use crate::lobby::{GameId, Lobby, LobbyError, Seat};

pub const GAME_HEADER: &str = "gameid";
pub const SESSION_HEADER: &str = "sessionid";

#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub port: u16,
    pub size: usize,
    pub komi: f32,
}

#[derive(Debug, Display, Error)]
pub enum ApiError {
    #[display("Game {game_id} not found")]
    NotFound { game_id: GameId },
    #[display("Not allowed to access the game")]
    Forbidden,
    #[display("Game has already started")]
    Started,
    #[display("Waiting for an opponent")]
    NotReady,
    #[display("{source}")]
    Turn { source: GameError },
    #[display("lobby is unavailable")]
    Poisoned,
}

impl From<LobbyError> for ApiError {
    fn from(e: LobbyError) -> Self {
        match e {
            LobbyError::NotFound { game_id } => ApiError::NotFound { game_id },
            LobbyError::NotReady { .. } => ApiError::NotReady,
            LobbyError::Full { .. } => ApiError::Started,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            // A foreign token looks the same as an unknown game.
            ApiError::NotFound { .. } | ApiError::Forbidden => StatusCode::NOT_FOUND,
            ApiError::Started => StatusCode::BAD_REQUEST,
            ApiError::NotReady | ApiError::Turn { .. } => StatusCode::CONFLICT,
            ApiError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    lobby: Arc<Mutex<Lobby<()>>>,
}

impl AppState {
    pub fn new(size: usize, komi: f32) -> Result<Self, BoardError> {
        Ok(Self {
            lobby: Arc::new(Mutex::new(Lobby::new(size, komi)?)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Lobby<()>>, ApiError> {
        self.lobby.lock().map_err(|_| ApiError::Poisoned)
    }
}

#[derive(Debug, Serialize)]
struct SeatView {
    game_id: GameId,
    token: u32,
    color: Color,
}

#[derive(Debug, Serialize)]
struct GameView {
    game_id: GameId,
    color: Color,
    ready: bool,
    turn: Color,
    komi: f32,
    moves: usize,
    last_move: Option<Move>,
    board: Grid,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Serialize)]
struct MoveView {
    outcome: MoveOutcome,
    turn: Color,
    board: Grid,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/game", post(create_game))
        .route("/game/{id}", get(get_game).post(join_game))
        .route("/game/{id}/move", post(play_move))
        .with_state(state)
}

/// Listen on the configured port and serve until the listener fails.
pub async fn serve(config: HttpConfig) -> Result<()> {
    let state = AppState::new(config.size, config.komi).context("invalid board size")?;
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to listen on port {}", config.port))?;
    info!(addr = %listener.local_addr()?, "http listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "health": "OK" }))
}

fn seated(seat: Seat) -> impl IntoResponse {
    (
        [
            (GAME_HEADER, seat.game_id.to_string()),
            (SESSION_HEADER, seat.token.to_string()),
        ],
        Json(SeatView {
            game_id: seat.game_id,
            token: seat.token,
            color: seat.color,
        }),
    )
}

async fn create_game(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let seat = state.lock()?.create(());
    info!(game_id = seat.game_id, "game opened");
    Ok(seated(seat))
}

async fn join_game(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
) -> Result<impl IntoResponse, ApiError> {
    let seat = state.lock()?.join(game_id, ()).map_err(|(e, ())| e)?;
    info!(game_id, "game joined");
    Ok(seated(seat))
}

/// The caller's color in `game_id`, from the session header.
fn authorize(lobby: &Lobby<()>, game_id: GameId, headers: &HeaderMap) -> Result<Color, ApiError> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u32>().ok())
        .and_then(|token| lobby.color_of(game_id, token))
        .ok_or(ApiError::Forbidden)
}

fn find(lobby: &Lobby<()>, game_id: GameId) -> Result<&Game, ApiError> {
    lobby.game(game_id).ok_or(ApiError::NotFound { game_id })
}

async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
    headers: HeaderMap,
) -> Result<Json<GameView>, ApiError> {
    let lobby = state.lock()?;
    let game = find(&lobby, game_id)?;
    let color = authorize(&lobby, game_id, &headers)?;
    let board = game.board();
    Ok(Json(GameView {
        game_id,
        color,
        ready: lobby.is_ready(game_id),
        turn: game.turn(),
        komi: game.komi(),
        moves: board.moves(),
        last_move: board.last_move(),
        board: board.grid().clone(),
    }))
}

async fn play_move(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
    headers: HeaderMap,
    Json(request): Json<MoveRequest>,
) -> Result<(StatusCode, Json<MoveView>), ApiError> {
    let mut lobby = state.lock()?;
    find(&lobby, game_id)?;
    let color = authorize(&lobby, game_id, &headers)?;
    if !lobby.is_ready(game_id) {
        return Err(ApiError::NotReady);
    }
    let game = lobby
        .game_mut(game_id)
        .ok_or(ApiError::NotFound { game_id })?;

    let mv = Move::new(request.x, request.y, color);
    let outcome = game.play(mv).map_err(|source| ApiError::Turn { source })?;
    debug!(game_id, %mv, %outcome, "http move");
    let status = if outcome.is_committed() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((
        status,
        Json(MoveView {
            outcome,
            turn: game.turn(),
            board: game.board().grid().clone(),
        }),
    ))
}
