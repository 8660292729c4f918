// Static level layout: world bounds, spawn point and placed objects.

use super::errors::SessionError;
use super::geometry::{Aabb, Vec2};
use super::tuning::GameConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type LevelId = u64;
pub type ObjectId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Platform,
    Coin,
    // Data-only kinds: the engine treats them purely through their flags.
    Enemy,
    PowerUp,
    Flag,
}

// A placed object. Immutable once the level is authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub position: Vec2,
    // Width in `x`, height in `y`.
    pub size: Vec2,
    pub color: String,
    pub is_solid: bool,
    pub is_collectible: bool,
    pub points_value: u32,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl LevelObject {
    pub fn platform(id: ObjectId, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id,
            kind: ObjectKind::Platform,
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
            color: "#8B4513".to_string(),
            is_solid: true,
            is_collectible: false,
            points_value: 0,
            properties: Map::new(),
        }
    }

    pub fn coin(id: ObjectId, x: f64, y: f64, points_value: u32) -> Self {
        Self {
            id,
            kind: ObjectKind::Coin,
            position: Vec2::new(x, y),
            size: Vec2::new(24.0, 24.0),
            color: "#FFD700".to_string(),
            is_solid: false,
            is_collectible: true,
            points_value,
            properties: Map::new(),
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    pub level_number: u32,
    // World bounds in pixels.
    pub width: f64,
    pub height: f64,
    pub background_color: String,
    // Downward acceleration per second.
    pub gravity: f64,
    pub spawn: Option<Vec2>,
    // Seconds available to finish the level.
    pub time_limit: u32,
    pub is_active: bool,
}

// Number of objects a session must collect to complete the level.
pub fn collectible_count(objects: &[LevelObject]) -> usize {
    objects.iter().filter(|o| o.is_collectible).count()
}

// Checks the invariants a session relies on before it can start.
pub fn validate_level(level: &Level, objects: &[LevelObject]) -> Result<Vec2, SessionError> {
    let spawn = level.spawn.ok_or(SessionError::MissingSpawn)?;

    if let Some(bad) = objects
        .iter()
        .find(|o| !(o.size.x >= 0.0 && o.size.y >= 0.0))
    {
        return Err(SessionError::InvalidObjectSize { object_id: bad.id });
    }

    Ok(spawn)
}

// Layout for "World 1-1". Object ids are local to the level (1-based, in order).
pub fn default_level(config: &GameConfig) -> (Level, Vec<LevelObject>) {
    let level = Level {
        id: 0,
        name: "World 1-1".to_string(),
        level_number: 1,
        width: 2400.0,
        height: 600.0,
        background_color: "#87CEEB".to_string(),
        gravity: 0.8,
        spawn: Some(Vec2::new(100.0, 400.0)),
        time_limit: 400,
        is_active: true,
    };

    let platforms = [
        // Ground, a gap, then stepping platforms towards the final stretch.
        (0.0, 550.0, 800.0, 50.0),
        (900.0, 550.0, 500.0, 50.0),
        (600.0, 450.0, 200.0, 32.0),
        (1000.0, 400.0, 150.0, 32.0),
        (1300.0, 350.0, 200.0, 32.0),
        (1500.0, 550.0, 900.0, 50.0),
    ];
    let coins = [
        (200.0, 300.0),
        (300.0, 250.0),
        (650.0, 400.0),
        (700.0, 400.0),
        (1050.0, 350.0),
        (1400.0, 300.0),
        (1800.0, 400.0),
        (2000.0, 350.0),
    ];

    let mut objects = Vec::with_capacity(platforms.len() + coins.len());
    for (x, y, w, h) in platforms {
        objects.push(LevelObject::platform(objects.len() as ObjectId + 1, x, y, w, h));
    }
    for (x, y) in coins {
        objects.push(LevelObject::coin(
            objects.len() as ObjectId + 1,
            x,
            y,
            config.coin_value,
        ));
    }

    (level, objects)
}
