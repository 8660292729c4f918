use crate::domain::GameConfig;
use std::{env, fs, io, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("PLATFORMER_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

// Gameplay tuning from `GAME_CONFIG_PATH`, or the defaults when unset.
pub fn game_config() -> io::Result<GameConfig> {
    let Ok(path) = env::var("GAME_CONFIG_PATH") else {
        return Ok(GameConfig::default());
    };

    let text = fs::read_to_string(&path)
        .map_err(|e| io::Error::other(format!("failed to read game config {path}: {e}")))?;
    let config = parse_game_config(&text)
        .map_err(|e| io::Error::other(format!("invalid game config {path}: {e}")))?;
    tracing::info!(%path, "loaded game config");
    Ok(config)
}

// Missing keys fall back to their defaults; out-of-range values are rejected.
fn parse_game_config(text: &str) -> Result<GameConfig, String> {
    let config: GameConfig = toml::from_str(text).map_err(|e| e.to_string())?;
    config
        .validate()
        .map_err(|e| format!("{e:?}"))?;
    Ok(config)
}

pub const INPUT_CHANNEL_CAPACITY: usize = 64;
pub const UPDATE_BROADCAST_CAPACITY: usize = 128;

// 60 Hz, rounded up so sixty ticks never add up to less than a second.
pub const TICK_INTERVAL: Duration = Duration::from_nanos(16_666_667);

// Drivers nobody resumes or finishes are stopped after these.
pub const MAX_PAUSED_DURATION: Duration = Duration::from_secs(15 * 60);
pub const MAX_RUN_DURATION: Duration = Duration::from_secs(2 * 60 * 60);

// Finished and running session records kept in memory before the oldest are evicted.
pub const SESSION_RECORD_RETENTION: usize = 10_000;
