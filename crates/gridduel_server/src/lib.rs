//! HTTP transport for the gridduel session engine.
//!
//! Every route maps onto one [`GameManager`] operation and answers with the
//! resulting session snapshot as JSON, which the caller pushes to both
//! players.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cli;

pub use cli::Cli;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gridduel::{GameError, GameErrorKind, GameManager, GameSession, SessionId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Request for joining matchmaking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    /// Opaque player id.
    pub player_id: String,
    /// Display name.
    pub nickname: String,
}

/// Request for playing a cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRequest {
    /// Player making the move.
    pub player_id: String,
    /// Flat cell index, row-major from 0.
    pub cell: usize,
}

/// Request naming the acting player (resign, rematch).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest {
    /// Acting player.
    pub player_id: String,
}

/// Error body returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
}

/// Engine error rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(GameError);

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            GameErrorKind::SessionNotFound(_) => StatusCode::NOT_FOUND,
            GameErrorKind::InvalidMove(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GameErrorKind::InvalidState(_) => StatusCode::CONFLICT,
        };
        warn!(status = %status, error = %self.0.kind(), "Request refused");
        let body = ErrorBody {
            error: self.0.kind().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Builds the router over a shared manager.
#[instrument(skip(games))]
pub fn router(games: GameManager) -> Router {
    info!("Building HTTP routes");
    Router::new()
        .route("/games", get(list_games))
        .route("/games/join", post(join))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/play", post(play))
        .route("/games/{id}/resign", post(resign))
        .route("/games/{id}/rematch", post(rematch))
        .route("/games/{id}/reset", post(reset))
        .with_state(games)
}

#[instrument(skip(games))]
async fn list_games(State(games): State<GameManager>) -> Json<Vec<GameSession>> {
    Json(games.list_sessions())
}

#[instrument(skip(games, req), fields(player_id = %req.player_id))]
async fn join(
    State(games): State<GameManager>,
    Json(req): Json<JoinRequest>,
) -> ApiResult<GameSession> {
    let session = games.join(&req.player_id, &req.nickname)?;
    info!(session_id = %session.id(), "Join handled");
    Ok(Json(session))
}

#[instrument(skip(games))]
async fn get_game(
    State(games): State<GameManager>,
    Path(id): Path<SessionId>,
) -> ApiResult<GameSession> {
    debug!(session_id = %id, "Fetching session");
    games
        .get_by_id(id)
        .map(Json)
        .ok_or_else(|| GameError::session_not_found(id).into())
}

#[instrument(skip(games, req), fields(player_id = %req.player_id, cell = req.cell))]
async fn play(
    State(games): State<GameManager>,
    Path(id): Path<SessionId>,
    Json(req): Json<PlayRequest>,
) -> ApiResult<GameSession> {
    Ok(Json(games.play(id, &req.player_id, req.cell)?))
}

#[instrument(skip(games, req), fields(player_id = %req.player_id))]
async fn resign(
    State(games): State<GameManager>,
    Path(id): Path<SessionId>,
    Json(req): Json<PlayerRequest>,
) -> ApiResult<GameSession> {
    Ok(Json(games.resign(id, &req.player_id)?))
}

#[instrument(skip(games, req), fields(player_id = %req.player_id))]
async fn rematch(
    State(games): State<GameManager>,
    Path(id): Path<SessionId>,
    Json(req): Json<PlayerRequest>,
) -> ApiResult<GameSession> {
    Ok(Json(games.rematch(id, &req.player_id)?))
}

#[instrument(skip(games))]
async fn reset(
    State(games): State<GameManager>,
    Path(id): Path<SessionId>,
) -> ApiResult<GameSession> {
    Ok(Json(games.reset(id)?))
}
