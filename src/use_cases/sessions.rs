// Session orchestration: validating, creating and tracking running drivers.

use super::game::{SessionContext, SessionLimits, session_task};
use super::types::{RunState, SessionEvent, SessionUpdate};
use crate::domain::entities::{NewSession, Player, PlayerId, SessionId, SessionRecord};
use crate::domain::errors::SessionError;
use crate::domain::level::{Level, LevelId, LevelObject, validate_level};
use crate::domain::ports::{Clock, GameStore};
use crate::domain::{GameConfig, SessionState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, mpsc, watch};
use tracing::{info, warn};

pub const DEFAULT_PLAYER_NAME: &str = "Mario";
const MAX_PLAYER_NAME_LEN: usize = 50;

/// Shared configuration for spawning session drivers.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Capacity for inbound input and control events.
    pub input_channel_capacity: usize,
    /// Capacity for broadcast render updates.
    pub update_broadcast_capacity: usize,
    /// Fixed tick interval for the session loop.
    pub tick_interval: Duration,
    /// Pause and lifetime caps applied to every driver.
    pub limits: SessionLimits,
}

/// Channels for talking to one running session driver.
#[derive(Clone)]
pub struct SessionHandle {
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub level_id: LevelId,
    /// Sender for input and control events into the driver.
    pub event_tx: mpsc::Sender<SessionEvent>,
    /// Broadcast sender for per-tick render updates.
    pub update_tx: broadcast::Sender<SessionUpdate>,
    /// Watch sender for run state transitions.
    pub run_state_tx: watch::Sender<RunState>,
}

/// Thread-safe registry of running sessions.
pub struct SessionRegistry {
    settings: SessionSettings,
    store: Arc<dyn GameStore>,
    config: Arc<GameConfig>,
    clock: Arc<dyn Clock>,
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(
        settings: SessionSettings,
        store: Arc<dyn GameStore>,
        config: Arc<GameConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            store,
            config,
            clock,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    /// Creates a session for `player_name` on `level_id` and spawns its driver.
    pub async fn start_session(
        self: &Arc<Self>,
        player_name: &str,
        level_id: LevelId,
    ) -> Result<SessionHandle, SessionError> {
        let player_name = normalize_player_name(player_name)?;

        let (level, objects) = self.load_level(level_id).await?;
        let spawn = validate_level(&level, &objects)?;

        let player = self
            .store
            .get_or_create_player(&player_name)
            .await
            .map_err(storage_failure)?;

        let record = self
            .store
            .create_session(NewSession {
                player_id: player.id,
                level_id,
                state: SessionState::new(spawn, self.config.starting_lives, level.time_limit),
                started_at: self.clock.now_epoch_seconds(),
            })
            .await
            .map_err(storage_failure)?;
        let session_id = record.id;

        // Channel wiring for the session driver.
        let (event_tx, event_rx) = mpsc::channel(self.settings.input_channel_capacity);
        let (update_tx, _update_rx) = broadcast::channel(self.settings.update_broadcast_capacity);
        let (run_state_tx, _run_state_rx) = watch::channel(RunState::Running);

        let handle = SessionHandle {
            session_id,
            player_id: player.id,
            level_id,
            event_tx,
            update_tx: update_tx.clone(),
            run_state_tx: run_state_tx.clone(),
        };

        // Register before spawning so a run that ends immediately still unregisters.
        self.sessions
            .write()
            .await
            .insert(session_id, handle.clone());

        let ctx = SessionContext {
            record,
            level: Arc::new(level),
            objects: objects.into(),
            config: Arc::clone(&self.config),
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            tick_interval: self.settings.tick_interval,
            limits: self.settings.limits,
        };
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            session_task(ctx, event_rx, update_tx, run_state_tx).await;
            registry.remove_session(session_id).await;
        });

        info!(
            session_id,
            player_id = player.id,
            player_name = %player_name,
            level_id,
            "session created"
        );
        Ok(handle)
    }

    /// Returns the handle of a running session, if any.
    pub async fn get_session(&self, session_id: SessionId) -> Option<SessionHandle> {
        self.sessions.read().await.get(&session_id).cloned()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Forwards an event to a running session's driver.
    pub async fn send_event(
        &self,
        session_id: SessionId,
        event: SessionEvent,
    ) -> Result<(), SessionError> {
        let handle = self
            .get_session(session_id)
            .await
            .ok_or(SessionError::SessionNotFound)?;
        // A closed channel means the driver already finished.
        handle
            .event_tx
            .send(event)
            .await
            .map_err(|_| SessionError::SessionNotFound)
    }

    /// Latest persisted state of a session, running or finished.
    pub async fn load_session(&self, session_id: SessionId) -> Result<SessionRecord, SessionError> {
        self.store
            .get_session(session_id)
            .await
            .map_err(storage_failure)?
            .ok_or(SessionError::SessionNotFound)
    }

    pub async fn load_player(&self, player_id: PlayerId) -> Result<Player, SessionError> {
        self.store
            .get_player(player_id)
            .await
            .map_err(storage_failure)?
            .ok_or(SessionError::PlayerNotFound)
    }

    /// Level metadata plus its objects in storage order.
    pub async fn load_level(
        &self,
        level_id: LevelId,
    ) -> Result<(Level, Vec<LevelObject>), SessionError> {
        let level = self
            .store
            .get_level(level_id)
            .await
            .map_err(storage_failure)?
            .ok_or(SessionError::LevelNotFound)?;
        let objects = self
            .store
            .get_level_objects(level_id)
            .await
            .map_err(storage_failure)?;
        Ok((level, objects))
    }

    async fn remove_session(&self, session_id: SessionId) {
        self.sessions.write().await.remove(&session_id);
    }
}

fn normalize_player_name(value: &str) -> Result<String, SessionError> {
    let name = value.trim();
    if name.is_empty() {
        return Ok(DEFAULT_PLAYER_NAME.to_string());
    }
    if name.chars().count() > MAX_PLAYER_NAME_LEN || name.chars().any(char::is_control) {
        return Err(SessionError::InvalidPlayerName);
    }
    Ok(name.to_string())
}

fn storage_failure(error: String) -> SessionError {
    warn!(%error, "session storage failure");
    SessionError::StorageFailure
}
