// Horizontal follow camera for the renderer; lives outside the engine.

pub const VIEWPORT_WIDTH: f64 = 800.0;
// Fraction of the remaining distance covered per tick.
pub const CAMERA_SMOOTHING: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera {
    pub x: f64,
}

impl Camera {
    // Eases towards centring the player, never showing past the level edges.
    pub fn follow(&mut self, player_x: f64, level_width: f64) {
        let target = player_x - VIEWPORT_WIDTH / 2.0;
        self.x += (target - self.x) * CAMERA_SMOOTHING;

        let max_x = level_width - VIEWPORT_WIDTH;
        self.x = self.x.min(max_x).max(0.0);
    }
}
