// Per-run session state, player input intents and render snapshot types.

use super::geometry::Vec2;
use super::level::{Level, LevelObject, ObjectId, ObjectKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// Pose derived from contact and velocity at the end of each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    #[default]
    Idle,
    Running,
    Jumping,
    Falling,
    // Display-only; never produced by the engine.
    Dead,
}

// The three intents the engine understands, already mapped from raw keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
}

// Mutable state of one player's run through one level.
//
// Owned by exactly one driver; the engine consumes a reference and returns the
// next value, so the previous tick's state stays intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing_right: bool,
    pub on_ground: bool,
    player_state: PlayerState,
    pub score: u32,
    pub coins_collected: u32,
    pub lives_remaining: i32,
    pub time_remaining: u32,
    pub collected_object_ids: HashSet<ObjectId>,
    pub is_completed: bool,
    pub is_game_over: bool,
}

impl SessionState {
    // Fresh state at the given spawn point, at rest and facing right.
    pub fn new(spawn: Vec2, lives: i32, time_limit: u32) -> Self {
        Self {
            position: spawn,
            velocity: Vec2::ZERO,
            facing_right: true,
            on_ground: false,
            player_state: PlayerState::Idle,
            score: 0,
            coins_collected: 0,
            lives_remaining: lives,
            time_remaining: time_limit,
            collected_object_ids: HashSet::new(),
            is_completed: false,
            is_game_over: false,
        }
    }

    pub fn player_state(&self) -> PlayerState {
        self.player_state
    }

    pub(crate) fn set_player_state(&mut self, state: PlayerState) {
        self.player_state = state;
    }

    // Once either latch is set the run is over for gameplay purposes.
    pub fn is_terminal(&self) -> bool {
        self.is_completed || self.is_game_over
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub facing_right: bool,
    pub on_ground: bool,
    pub state: PlayerState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSnapshot {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub collected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub score: u32,
    pub coins_collected: u32,
    pub lives_remaining: i32,
    pub time_remaining: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelSnapshot {
    pub width: f64,
    pub height: f64,
    pub background_color: String,
}

impl From<&SessionState> for PlayerSnapshot {
    fn from(s: &SessionState) -> Self {
        Self {
            x: s.position.x,
            y: s.position.y,
            vx: s.velocity.x,
            vy: s.velocity.y,
            facing_right: s.facing_right,
            on_ground: s.on_ground,
            state: s.player_state,
        }
    }
}

impl From<&SessionState> for HudSnapshot {
    fn from(s: &SessionState) -> Self {
        Self {
            score: s.score,
            coins_collected: s.coins_collected,
            lives_remaining: s.lives_remaining,
            time_remaining: s.time_remaining,
        }
    }
}

impl From<&Level> for LevelSnapshot {
    fn from(level: &Level) -> Self {
        Self {
            width: level.width,
            height: level.height,
            background_color: level.background_color.clone(),
        }
    }
}

impl ObjectSnapshot {
    pub fn new(object: &LevelObject, session: &SessionState) -> Self {
        Self {
            id: object.id,
            kind: object.kind,
            x: object.position.x,
            y: object.position.y,
            width: object.size.x,
            height: object.size.y,
            color: object.color.clone(),
            collected: session.collected_object_ids.contains(&object.id),
        }
    }
}
