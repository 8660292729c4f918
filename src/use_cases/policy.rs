// Win/loss policy applied by the driver after each engine tick.

use crate::domain::level::{Level, LevelObject, collectible_count};
use crate::domain::{GameConfig, SessionState};
use tracing::info;

#[derive(Debug, Clone)]
pub struct OutcomePolicy {
    collectibles: usize,
    extra_life_score: u32,
    // A zero time limit disables the countdown.
    timed: bool,
    // Simulated seconds not yet taken off the timer.
    carry: f64,
}

impl OutcomePolicy {
    pub fn new(level: &Level, objects: &[LevelObject], config: &GameConfig) -> Self {
        Self {
            collectibles: collectible_count(objects),
            extra_life_score: config.extra_life_score,
            timed: level.time_limit > 0,
            carry: 0.0,
        }
    }

    // Applies extra lives, completion and the level timer to `next`.
    //
    // Nothing happens once `prev` was already terminal.
    pub fn apply(&mut self, prev: &SessionState, next: &mut SessionState, dt: f64) {
        if prev.is_terminal() || next.is_game_over {
            return;
        }

        let awarded = extra_lives_between(prev.score, next.score, self.extra_life_score);
        if awarded > 0 {
            next.lives_remaining = next.lives_remaining.saturating_add(awarded);
            info!(
                lives = next.lives_remaining,
                score = next.score,
                "extra life awarded"
            );
        }

        if next.coins_collected as usize >= self.collectibles {
            next.is_completed = true;
            return;
        }

        if self.timed {
            self.count_down(next, dt);
        }
    }

    fn count_down(&mut self, next: &mut SessionState, dt: f64) {
        self.carry += dt;
        // Tolerate float drift from summing 1/60 steps.
        while self.carry + 1e-9 >= 1.0 {
            self.carry -= 1.0;
            next.time_remaining = next.time_remaining.saturating_sub(1);
        }

        if next.time_remaining == 0 {
            next.is_game_over = true;
            info!("level timer expired");
        }
    }
}

// Number of `threshold` multiples crossed when the score moves from `old` to `new`.
pub fn extra_lives_between(old: u32, new: u32, threshold: u32) -> i32 {
    if threshold == 0 || new <= old {
        return 0;
    }
    let crossed = new / threshold - old / threshold;
    i32::try_from(crossed).unwrap_or(i32::MAX)
}
