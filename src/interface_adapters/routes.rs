use crate::interface_adapters::handlers::{
    get_level, get_player, get_session, start_session, stop_session, submit_input, toggle_pause,
};
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/input", post(submit_input))
        .route("/sessions/{id}/pause", post(toggle_pause))
        .route("/sessions/{id}/stop", post(stop_session))
        .route("/sessions/{id}/ws", get(ws_handler))
        .route("/levels/{id}", get(get_level))
        .route("/players/{id}", get(get_player))
        .with_state(state)
}
