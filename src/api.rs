//! HTTP API endpoints for room management.
//!
//! Every ledger operation is exposed per room code. Confirmation of destructive
//! calls (deleting rounds, removing players) is left to the client.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::ledger::{parse_score, LedgerError, LedgerExport, ScoreLedger};
use crate::state::{AppState, RoomError};
use crate::types::*;

/// Snapshot of a room as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub room_code: RoomCode,
    pub current_round: u32,
    /// Players in the order they joined
    pub players: Vec<Player>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl From<&ScoreLedger> for RoomView {
    fn from(ledger: &ScoreLedger) -> Self {
        Self {
            room_code: ledger.room_code().to_string(),
            current_round: ledger.current_round(),
            players: ledger.players().to_vec(),
            leaderboard: ledger.leaderboard(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddPlayerRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordRoundRequest {
    /// Scores by player ID; players left out score 0
    #[serde(default)]
    pub scores: HashMap<PlayerId, ScoreInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditRoundRequest {
    pub score: ScoreInput,
}

/// Error body sent to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub msg: String,
}

/// Error wrapper mapping room errors onto HTTP responses
#[derive(Debug)]
pub struct ApiError(RoomError);

impl From<RoomError> for ApiError {
    fn from(e: RoomError) -> Self {
        ApiError(e)
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        ApiError(RoomError::Ledger(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            RoomError::Ledger(LedgerError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT")
            }
            RoomError::Ledger(LedgerError::EmptyRoom) => (StatusCode::BAD_REQUEST, "EMPTY_ROOM"),
            RoomError::Ledger(LedgerError::InvalidRoundIndex { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_ROUND")
            }
            RoomError::Ledger(LedgerError::PlayerNotFound(_)) => {
                (StatusCode::NOT_FOUND, "PLAYER_NOT_FOUND")
            }
            RoomError::Store(e) => {
                tracing::error!("Store failure: {}", e);
                (StatusCode::BAD_GATEWAY, "STORE_ERROR")
            }
        };

        let body = ErrorBody {
            code: code.to_string(),
            msg: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/rooms", post(create_room))
        .route("/api/rooms/{code}", get(get_room))
        .route("/api/rooms/{code}/leaderboard", get(leaderboard))
        .route("/api/rooms/{code}/players", post(add_player))
        .route(
            "/api/rooms/{code}/players/{player_id}",
            get(get_player).delete(remove_player),
        )
        .route("/api/rooms/{code}/rounds", post(record_round))
        .route(
            "/api/rooms/{code}/players/{player_id}/rounds/{index}",
            put(edit_round).delete(delete_round),
        )
        .route("/api/rooms/{code}/export", get(export_room))
        .route("/api/rooms/{code}/import", post(import_room))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Create a room with a fresh code.
///
/// POST /api/rooms
pub async fn create_room(
    State(state): State<Arc<AppState>>,
) -> ApiResult<(StatusCode, Json<RoomView>)> {
    let ledger = state.create_room().await?;
    Ok((StatusCode::CREATED, Json(RoomView::from(&ledger))))
}

/// Open a room; unknown codes start an empty ledger.
///
/// GET /api/rooms/{code}
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> ApiResult<Json<RoomView>> {
    let ledger = state.open_room(&code).await?;
    Ok(Json(RoomView::from(&ledger)))
}

/// GET /api/rooms/{code}/leaderboard
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    Ok(Json(state.leaderboard(&code).await?))
}

/// POST /api/rooms/{code}/players
pub async fn add_player(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(req): Json<AddPlayerRequest>,
) -> ApiResult<(StatusCode, Json<Player>)> {
    let player = state.add_player(&code, &req.name).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// Round history of one player.
///
/// GET /api/rooms/{code}/players/{player_id}
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path((code, player_id)): Path<(String, String)>,
) -> ApiResult<Json<PlayerDetail>> {
    let ledger = state.open_room(&code).await?;
    let detail = ledger
        .player_detail(&player_id)
        .ok_or(LedgerError::PlayerNotFound(player_id))?;
    Ok(Json(detail))
}

/// Remove a player. Unknown players are ignored.
///
/// DELETE /api/rooms/{code}/players/{player_id}
pub async fn remove_player(
    State(state): State<Arc<AppState>>,
    Path((code, player_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    if state.remove_player(&code, &player_id).await?.is_none() {
        tracing::debug!("Remove of unknown player {} in room {}", player_id, code);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Record a round for all players.
///
/// POST /api/rooms/{code}/rounds
pub async fn record_round(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(req): Json<RecordRoundRequest>,
) -> ApiResult<Json<RoomView>> {
    let (_, ledger) = state.record_round(&code, &req.scores).await?;
    Ok(Json(RoomView::from(&ledger)))
}

/// Replace one historical score.
///
/// PUT /api/rooms/{code}/players/{player_id}/rounds/{index}
pub async fn edit_round(
    State(state): State<Arc<AppState>>,
    Path((code, player_id, index)): Path<(String, String, usize)>,
    Json(req): Json<EditRoundRequest>,
) -> ApiResult<Json<RoomView>> {
    let score = parse_score(&req.score).ok_or_else(|| {
        LedgerError::InvalidInput("Score is not a whole number".to_string())
    })?;
    let (_, ledger) = state.edit_round(&code, &player_id, index, score).await?;
    Ok(Json(RoomView::from(&ledger)))
}

/// Delete one historical score.
///
/// DELETE /api/rooms/{code}/players/{player_id}/rounds/{index}
pub async fn delete_round(
    State(state): State<Arc<AppState>>,
    Path((code, player_id, index)): Path<(String, String, usize)>,
) -> ApiResult<Json<RoomView>> {
    let (_, ledger) = state.delete_round(&code, &player_id, index).await?;
    Ok(Json(RoomView::from(&ledger)))
}

/// Export a room as its serialized ledger.
///
/// GET /api/rooms/{code}/export
pub async fn export_room(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> ApiResult<Json<LedgerExport>> {
    let ledger = state.open_room(&code).await?;
    Ok(Json(ledger.export()))
}

/// Replace a room's state with a snapshot.
///
/// POST /api/rooms/{code}/import
pub async fn import_room(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(export): Json<LedgerExport>,
) -> ApiResult<Json<RoomView>> {
    match state.import_room(&code, export).await {
        Ok(ledger) => Ok(Json(RoomView::from(&ledger))),
        Err(e) => {
            tracing::warn!("Import into room {} failed: {}", code, e);
            Err(e.into())
        }
    }
}
