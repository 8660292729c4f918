use crate::domain::entities::SessionId;
use crate::domain::errors::SessionError;
use crate::interface_adapters::http::map_session_error;
use crate::interface_adapters::input::intents;
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage, SessionUpdateDto};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{RunState, SessionEvent, SessionHandle, SessionUpdate};

use axum::{
    Error,
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> impl IntoResponse {
    let Some(session) = state.registry.get_session(session_id).await else {
        // Keep not-found responses consistent with the JSON error schema.
        return map_session_error(SessionError::SessionNotFound).into_response();
    };

    // Separate connection id for correlating logs when a session has several viewers.
    let span = info_span!("conn", conn_id = next_conn_id(), session_id);
    ws.on_upgrade(move |socket| handle_socket(socket, session).instrument(span))
}

fn next_conn_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

async fn handle_socket(mut socket: WebSocket, session: SessionHandle) {
    // Subscribe before any await so no update is missed.
    let mut ctx = ConnCtx::new(&session);
    info!("client connected");

    // The registry keeps its own handle; holding ours would keep the channels open.
    drop(session);

    // Tell the client where the run stands before the first snapshot arrives.
    let initial = *ctx.run_state_rx.borrow_and_update();
    if let Err(e) = send_message(&mut socket, &ServerMessage::RunState(initial.into())).await {
        warn!(error = ?e, "failed to send initial run state");
        return;
    }
    ctx.msgs_out += 1;

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }

    debug!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        invalid_json = ctx.invalid_json,
        "connection stats"
    );
    info!("client disconnected");
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

struct ConnCtx {
    event_tx: mpsc::Sender<SessionEvent>,
    update_rx: broadcast::Receiver<SessionUpdate>,
    run_state_rx: watch::Receiver<RunState>,

    msgs_in: u64,
    msgs_out: u64,
    invalid_json: u32,

    last_input_full_log: Instant,
    last_update_lag_log: Instant,
    last_invalid_input_log: Instant,

    close_frame: Option<CloseFrame>,
}

impl ConnCtx {
    fn new(session: &SessionHandle) -> Self {
        let now = Instant::now()
            .checked_sub(LOG_THROTTLE)
            .unwrap_or_else(Instant::now);
        Self {
            event_tx: session.event_tx.clone(),
            update_rx: session.update_tx.subscribe(),
            run_state_rx: session.run_state_tx.subscribe(),
            msgs_in: 0,
            msgs_out: 0,
            invalid_json: 0,
            last_input_full_log: now,
            last_update_lag_log: now,
            last_invalid_input_log: now,
            close_frame: None,
        }
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming_ws(incoming, ctx).await {
                    LoopControl::Continue => false,
                    LoopControl::Disconnect => true,
                }
            }

            update = ctx.update_rx.recv() => {
                match update {
                    Ok(update) => match forward_update(socket, ctx, update).await {
                        Ok(()) => false,
                        Err(err) => {
                            fatal = Some(err);
                            true
                        }
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Every update is a full snapshot, so skipping ahead is enough.
                        if should_log(&mut ctx.last_update_lag_log) {
                            warn!(missed = n, "session updates lagged; skipping to latest");
                        }
                        false
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        ctx.close_frame = Some(session_ended());
                        true
                    }
                }
            }

            changed = ctx.run_state_rx.changed() => {
                match changed {
                    Ok(()) => match forward_run_state(socket, ctx).await {
                        Ok(LoopControl::Continue) => false,
                        Ok(LoopControl::Disconnect) => true,
                        Err(err) => {
                            fatal = Some(err);
                            true
                        }
                    },
                    Err(_) => {
                        ctx.close_frame = Some(session_ended());
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn session_ended() -> CloseFrame {
    CloseFrame {
        code: close_code::NORMAL,
        reason: "session ended".into(),
    }
}

async fn forward_update(
    socket: &mut WebSocket,
    ctx: &mut ConnCtx,
    update: SessionUpdate,
) -> Result<(), NetError> {
    let msg = ServerMessage::SessionUpdate(SessionUpdateDto::from(update));
    send_message(socket, &msg).await?;
    ctx.msgs_out += 1;
    Ok(())
}

async fn forward_run_state(
    socket: &mut WebSocket,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let state = *ctx.run_state_rx.borrow_and_update();

    if state.is_finished() {
        // Flush the snapshots published before the final transition.
        while let Ok(update) = ctx.update_rx.try_recv() {
            forward_update(socket, ctx, update).await?;
        }
    }

    send_message(socket, &ServerMessage::RunState(state.into())).await?;
    ctx.msgs_out += 1;

    if state.is_finished() {
        ctx.close_frame = Some(session_ended());
        return Ok(LoopControl::Disconnect);
    }
    Ok(LoopControl::Continue)
}

async fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> LoopControl {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.msgs_in += 1;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Input(input)) => {
                        forward_event(ctx, SessionEvent::Input(intents(&input))).await
                    }
                    Ok(ClientMessage::TogglePause) => {
                        forward_event(ctx, SessionEvent::TogglePause).await
                    }
                    Err(parse_err) => {
                        ctx.invalid_json += 1;
                        if should_log(&mut ctx.last_invalid_input_log) {
                            warn!(
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if ctx.invalid_json > MAX_INVALID_JSON {
                            ctx.close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return LoopControl::Disconnect;
                        }

                        LoopControl::Continue
                    }
                }
            }
            Message::Binary(_) => {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                LoopControl::Disconnect
            }
            Message::Ping(_) | Message::Pong(_) => LoopControl::Continue,
            Message::Close(_) => LoopControl::Disconnect,
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            LoopControl::Disconnect
        }
        None => LoopControl::Disconnect,
    }
}

// Input is latest-wins, so a full queue just drops it. Control events wait for room;
// the driver drains the queue every tick.
async fn forward_event(ctx: &mut ConnCtx, event: SessionEvent) -> LoopControl {
    let sent = match event {
        SessionEvent::Input(_) => match ctx.event_tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                if should_log(&mut ctx.last_input_full_log) {
                    warn!("session event channel full; dropping input");
                }
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(()),
        },
        control => ctx.event_tx.send(control).await.map_err(|_| ()),
    };

    match sent {
        Ok(()) => LoopControl::Continue,
        Err(()) => {
            ctx.close_frame = Some(session_ended());
            LoopControl::Disconnect
        }
    }
}
