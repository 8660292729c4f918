// Use-case level inputs/outputs for the session loop.

use crate::domain::entities::SessionId;
use crate::domain::{
    HudSnapshot, Level, LevelObject, LevelSnapshot, ObjectSnapshot, PlayerInput, PlayerSnapshot,
    SessionState,
};

#[derive(Debug, Clone)]
pub enum SessionEvent {
    Input(PlayerInput),
    TogglePause,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    Completed,
    GameOver,
    Stopped,
}

impl RunState {
    pub fn is_finished(self) -> bool {
        matches!(self, RunState::Completed | RunState::GameOver | RunState::Stopped)
    }
}

// Flat render snapshot published after every simulated tick.
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub session_id: SessionId,
    pub tick: u64,
    pub player: PlayerSnapshot,
    pub camera_x: f64,
    pub hud: HudSnapshot,
    pub level: LevelSnapshot,
    pub objects: Vec<ObjectSnapshot>,
    pub is_completed: bool,
    pub is_game_over: bool,
}

impl SessionUpdate {
    pub fn new(
        session_id: SessionId,
        tick: u64,
        state: &SessionState,
        camera_x: f64,
        level: &Level,
        objects: &[LevelObject],
    ) -> Self {
        Self {
            session_id,
            tick,
            player: PlayerSnapshot::from(state),
            camera_x,
            hud: HudSnapshot::from(state),
            level: LevelSnapshot::from(level),
            objects: objects
                .iter()
                .map(|o| ObjectSnapshot::new(o, state))
                .collect(),
            is_completed: state.is_completed,
            is_game_over: state.is_game_over,
        }
    }
}
