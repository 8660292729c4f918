use crate::domain::entities::{PlayerId, SessionId};
use crate::domain::level::LevelId;
use crate::interface_adapters::http::{ApiError, map_session_error};
use crate::interface_adapters::input::intents;
use crate::interface_adapters::protocol::{
    InputDto, LevelDto, PlayerProfileDto, SessionDto, StartSessionRequest, StartSessionResponse,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::SessionEvent;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

// Handler for starting a new session.
pub async fn start_session(
    State(state): State<AppState>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<StartSessionResponse>), ApiError> {
    let level_id = payload.level_id.unwrap_or(state.default_level_id);
    let handle = state
        .registry
        .start_session(&payload.player_name, level_id)
        .await
        .map_err(map_session_error)?;

    Ok((
        StatusCode::CREATED,
        Json(StartSessionResponse {
            session_id: handle.session_id,
            player_id: handle.player_id,
            level_id: handle.level_id,
        }),
    ))
}

// Handler for reading the latest persisted session state.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<SessionDto>, ApiError> {
    let record = state
        .registry
        .load_session(session_id)
        .await
        .map_err(map_session_error)?;
    let running = state.registry.get_session(session_id).await.is_some();

    Ok(Json(SessionDto::new(&record, running)))
}

// Handler for replacing the held input of a running session.
pub async fn submit_input(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Json(payload): Json<InputDto>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .send_event(session_id, SessionEvent::Input(intents(&payload)))
        .await
        .map_err(map_session_error)?;
    Ok(StatusCode::ACCEPTED)
}

// Handler for toggling pause on a running session.
pub async fn toggle_pause(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .send_event(session_id, SessionEvent::TogglePause)
        .await
        .map_err(map_session_error)?;
    Ok(StatusCode::ACCEPTED)
}

// Handler for abandoning a running session.
pub async fn stop_session(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .send_event(session_id, SessionEvent::Stop)
        .await
        .map_err(map_session_error)?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn get_level(
    State(state): State<AppState>,
    Path(level_id): Path<LevelId>,
) -> Result<Json<LevelDto>, ApiError> {
    let (level, objects) = state
        .registry
        .load_level(level_id)
        .await
        .map_err(map_session_error)?;
    Ok(Json(LevelDto::new(level, &objects)))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<PlayerProfileDto>, ApiError> {
    let player = state
        .registry
        .load_player(player_id)
        .await
        .map_err(map_session_error)?;
    Ok(Json(PlayerProfileDto::from(player)))
}
