use serde::{Deserialize, Serialize};

// Gameplay tuning shared read-only by every session.
//
// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // Horizontal acceleration per second while a direction is held.
    pub player_speed: f64,

    // Upward velocity applied on jump.
    pub jump_strength: f64,

    // Horizontal velocity cap in either direction.
    pub max_velocity_x: f64,

    // Downward velocity cap (terminal velocity).
    pub max_velocity_y: f64,

    // Per-tick horizontal damping while grounded, in (0, 1].
    pub friction: f64,

    // Per-tick horizontal damping while airborne, in (0, 1].
    pub air_resistance: f64,

    // Points a coin is worth when a level is authored.
    pub coin_value: u32,

    // Every multiple of this score awards one extra life.
    pub extra_life_score: u32,

    // Lives a fresh session starts with.
    pub starting_lives: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_speed: 5.0,
            jump_strength: 15.0,
            max_velocity_x: 8.0,
            max_velocity_y: 20.0,
            friction: 0.8,
            air_resistance: 0.95,
            coin_value: 100,
            extra_life_score: 10_000,
            starting_lives: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    // The named tuning field is outside its allowed range.
    OutOfRange(&'static str),
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("player_speed", self.player_speed),
            ("jump_strength", self.jump_strength),
            ("max_velocity_x", self.max_velocity_x),
            ("max_velocity_y", self.max_velocity_y),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::OutOfRange(field));
            }
        }

        for (field, value) in [
            ("friction", self.friction),
            ("air_resistance", self.air_resistance),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::OutOfRange(field));
            }
        }

        if self.starting_lives < 1 {
            return Err(ConfigError::OutOfRange("starting_lives"));
        }

        Ok(())
    }
}
