use super::collision::{self, PLAYER_WIDTH};
use super::movement::{self, VELOCITY_EPSILON};
use crate::domain::geometry::Vec2;
use crate::domain::level::{Level, LevelObject};
use crate::domain::state::{PlayerInput, PlayerState, SessionState};
use crate::domain::tuning::GameConfig;
use tracing::debug;

// Advances one session by one tick and returns the next state.
//
// `session` is left untouched; the returned value is authoritative. Level, objects
// and tuning are only read, so they can be shared across sessions. A terminal
// session is returned unchanged.
pub fn advance(
    session: &SessionState,
    level: &Level,
    objects: &[LevelObject],
    config: &GameConfig,
    input: PlayerInput,
    dt: f64,
) -> SessionState {
    if session.is_terminal() {
        return session.clone();
    }

    let mut s = session.clone();

    movement::apply_horizontal_input(&mut s, input, config, dt);
    movement::apply_jump(&mut s, input, config);
    movement::apply_gravity(&mut s, level.gravity, config, dt);

    let mut target = movement::integrate(&s, dt);

    let touched = collision::resolve_collisions(&mut s, &mut target, objects);
    collision::apply_collected(&mut s, &touched);

    s.set_player_state(derive_player_state(&s));

    if target.y > level.height {
        lose_life(&mut s, level, &mut target);
    }

    // Clamp without `f64::clamp`, which panics for levels narrower than the player.
    target.x = target.x.min(level.width - PLAYER_WIDTH).max(0.0);

    s.position = target;
    s
}

pub fn derive_player_state(s: &SessionState) -> PlayerState {
    match (s.on_ground, s.velocity.x.abs() > VELOCITY_EPSILON) {
        (true, true) => PlayerState::Running,
        (true, false) => PlayerState::Idle,
        (false, _) if s.velocity.y < 0.0 => PlayerState::Jumping,
        (false, _) => PlayerState::Falling,
    }
}

// The game-ending fall leaves the player where it fell.
fn lose_life(s: &mut SessionState, level: &Level, target: &mut Vec2) {
    s.lives_remaining -= 1;

    if s.lives_remaining <= 0 {
        s.is_game_over = true;
        debug!(y = target.y, "fell out of the world; no lives left");
        return;
    }

    // A validated level always has a spawn; fall back to the origin otherwise.
    *target = level.spawn.unwrap_or_default();
    s.velocity = Vec2::ZERO;
    debug!(lives = s.lives_remaining, "fell out of the world; respawning");
}
