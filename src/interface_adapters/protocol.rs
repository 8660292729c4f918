// Wire protocol DTOs and conversions for the public session API.

use crate::domain::entities::{Player, PlayerId, SessionId, SessionRecord};
use crate::domain::level::{Level, LevelId, LevelObject, ObjectId, ObjectKind};
use crate::domain::{HudSnapshot, LevelSnapshot, ObjectSnapshot, PlayerSnapshot, PlayerState, Vec2};
use crate::use_cases::{RunState, SessionUpdate};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Render snapshot for a given tick.
    SessionUpdate(SessionUpdateDto),
    // Run lifecycle transitions (pause, completion, game over).
    RunState(RunStateDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    Input(InputDto),
    TogglePause,
}

/// Raw controller state: pressed key names and/or explicit intent flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputDto {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub jump: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    // Blank names fall back to the default player.
    #[serde(default)]
    pub player_name: String,
    // Defaults to the seeded first level.
    #[serde(default)]
    pub level_id: Option<LevelId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartSessionResponse {
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub level_id: LevelId,
}

/// Persisted view of one session, running or finished.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDto {
    pub id: SessionId,
    pub player_id: PlayerId,
    pub level_id: LevelId,
    pub started_at: u64,
    pub completed_at: Option<u64>,
    // Whether a driver is still attached to the session.
    pub running: bool,
    pub player: PlayerStateDto,
    pub hud: HudDto,
    pub collected_object_ids: Vec<ObjectId>,
    pub is_completed: bool,
    pub is_game_over: bool,
}

impl SessionDto {
    pub fn new(record: &SessionRecord, running: bool) -> Self {
        let mut collected: Vec<ObjectId> =
            record.state.collected_object_ids.iter().copied().collect();
        collected.sort_unstable();

        Self {
            id: record.id,
            player_id: record.player_id,
            level_id: record.level_id,
            started_at: record.started_at,
            completed_at: record.completed_at,
            running,
            player: PlayerStateDto::from(&PlayerSnapshot::from(&record.state)),
            hud: HudDto::from(&HudSnapshot::from(&record.state)),
            collected_object_ids: collected,
            is_completed: record.state.is_completed,
            is_game_over: record.state.is_game_over,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerProfileDto {
    pub id: PlayerId,
    pub name: String,
    pub total_score: u64,
    pub total_coins_collected: u64,
    pub highest_level: u32,
}

impl From<Player> for PlayerProfileDto {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            name: player.name,
            total_score: player.total_score,
            total_coins_collected: player.total_coins_collected,
            highest_level: player.highest_level,
        }
    }
}

/// Full level layout for renderers and editors.
#[derive(Debug, Clone, Serialize)]
pub struct LevelDto {
    pub id: LevelId,
    pub name: String,
    pub level_number: u32,
    pub width: f64,
    pub height: f64,
    pub background_color: String,
    pub gravity: f64,
    pub spawn: Option<Vec2>,
    pub time_limit: u32,
    pub objects: Vec<LevelObjectDto>,
}

impl LevelDto {
    pub fn new(level: Level, objects: &[LevelObject]) -> Self {
        Self {
            id: level.id,
            name: level.name,
            level_number: level.level_number,
            width: level.width,
            height: level.height,
            background_color: level.background_color,
            gravity: level.gravity,
            spawn: level.spawn,
            time_limit: level.time_limit,
            objects: objects.iter().map(LevelObjectDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelObjectDto {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub is_solid: bool,
    pub is_collectible: bool,
    pub points_value: u32,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl From<&LevelObject> for LevelObjectDto {
    fn from(object: &LevelObject) -> Self {
        Self {
            id: object.id,
            kind: object.kind,
            x: object.position.x,
            y: object.position.y,
            width: object.size.x,
            height: object.size.y,
            color: object.color.clone(),
            is_solid: object.is_solid,
            is_collectible: object.is_collectible,
            points_value: object.points_value,
            properties: object.properties.clone(),
        }
    }
}

/// Render snapshot sent to clients on each tick.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUpdateDto {
    pub session_id: SessionId,
    pub tick: u64,
    pub player: PlayerStateDto,
    pub camera_x: f64,
    pub hud: HudDto,
    pub level: ViewportDto,
    pub objects: Vec<ObjectStateDto>,
    pub is_completed: bool,
    pub is_game_over: bool,
}

impl From<SessionUpdate> for SessionUpdateDto {
    fn from(update: SessionUpdate) -> Self {
        Self {
            session_id: update.session_id,
            tick: update.tick,
            player: PlayerStateDto::from(&update.player),
            camera_x: update.camera_x,
            hud: HudDto::from(&update.hud),
            level: ViewportDto::from(update.level),
            objects: update.objects.iter().map(ObjectStateDto::from).collect(),
            is_completed: update.is_completed,
            is_game_over: update.is_game_over,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStateDto {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub facing_right: bool,
    pub on_ground: bool,
    pub state: PlayerState,
}

impl From<&PlayerSnapshot> for PlayerStateDto {
    fn from(player: &PlayerSnapshot) -> Self {
        Self {
            x: player.x,
            y: player.y,
            vx: player.vx,
            vy: player.vy,
            facing_right: player.facing_right,
            on_ground: player.on_ground,
            state: player.state,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HudDto {
    pub score: u32,
    pub coins: u32,
    pub lives: i32,
    pub time: u32,
}

impl From<&HudSnapshot> for HudDto {
    fn from(hud: &HudSnapshot) -> Self {
        Self {
            score: hud.score,
            coins: hud.coins_collected,
            lives: hud.lives_remaining,
            time: hud.time_remaining,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewportDto {
    pub width: f64,
    pub height: f64,
    pub background_color: String,
}

impl From<LevelSnapshot> for ViewportDto {
    fn from(level: LevelSnapshot) -> Self {
        Self {
            width: level.width,
            height: level.height,
            background_color: level.background_color,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectStateDto {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub collected: bool,
}

impl From<&ObjectSnapshot> for ObjectStateDto {
    fn from(object: &ObjectSnapshot) -> Self {
        Self {
            id: object.id,
            kind: object.kind,
            x: object.x,
            y: object.y,
            width: object.width,
            height: object.height,
            color: object.color.clone(),
            collected: object.collected,
        }
    }
}

/// Run lifecycle state sent to clients for UI flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStateDto {
    Running,
    Paused,
    Completed,
    GameOver,
    Stopped,
}

impl From<RunState> for RunStateDto {
    fn from(state: RunState) -> Self {
        match state {
            RunState::Running => RunStateDto::Running,
            RunState::Paused => RunStateDto::Paused,
            RunState::Completed => RunStateDto::Completed,
            RunState::GameOver => RunStateDto::GameOver,
            RunState::Stopped => RunStateDto::Stopped,
        }
    }
}
