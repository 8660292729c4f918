use crate::domain::geometry::Vec2;
use crate::domain::state::{PlayerInput, SessionState};
use crate::domain::tuning::GameConfig;

// Fixed visual scale between velocity units and pixels per second.
pub const POSITION_SCALE: f64 = 10.0;

// Speeds below this are treated as standing still.
pub const VELOCITY_EPSILON: f64 = 0.1;

// Accelerates towards the held direction, or damps when nothing is held.
//
// Left is checked first, so holding both directions moves left.
pub fn apply_horizontal_input(s: &mut SessionState, input: PlayerInput, cfg: &GameConfig, dt: f64) {
    if input.move_left {
        s.velocity.x = (s.velocity.x - cfg.player_speed * dt).max(-cfg.max_velocity_x);
        s.facing_right = false;
    } else if input.move_right {
        s.velocity.x = (s.velocity.x + cfg.player_speed * dt).min(cfg.max_velocity_x);
        s.facing_right = true;
    } else {
        let damping = if s.on_ground {
            cfg.friction
        } else {
            cfg.air_resistance
        };
        s.velocity.x *= damping;

        if s.velocity.x.abs() < VELOCITY_EPSILON {
            s.velocity.x = 0.0;
        }
    }
}

// Launches upward only from the ground; airborne presses are ignored.
pub fn apply_jump(s: &mut SessionState, input: PlayerInput, cfg: &GameConfig) {
    if input.jump && s.on_ground {
        s.velocity.y = -cfg.jump_strength;
        s.on_ground = false;
    }
}

// Gravity only acts while airborne, capped at terminal velocity.
pub fn apply_gravity(s: &mut SessionState, gravity: f64, cfg: &GameConfig, dt: f64) {
    if !s.on_ground {
        s.velocity.y = (s.velocity.y + gravity * dt).min(cfg.max_velocity_y);
    }
}

// Position after integrating the current velocity over `dt`.
pub fn integrate(s: &SessionState, dt: f64) -> Vec2 {
    Vec2::new(
        s.position.x + s.velocity.x * dt * POSITION_SCALE,
        s.position.y + s.velocity.y * dt * POSITION_SCALE,
    )
}
