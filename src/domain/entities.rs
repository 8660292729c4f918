use super::level::LevelId;
use super::state::SessionState;
use serde::{Deserialize, Serialize};

pub type PlayerId = u64;
pub type SessionId = u64;

// Persistent player profile with lifetime totals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub total_coins_collected: u64,
    pub total_score: u64,
    pub highest_level: u32,
}

// One run through one level, as stored by the persistence layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub player_id: PlayerId,
    pub level_id: LevelId,
    pub state: SessionState,
    pub started_at: u64,
    pub completed_at: Option<u64>,
}

// Session fields known before the store assigns an id.
#[derive(Clone, Debug)]
pub struct NewSession {
    pub player_id: PlayerId,
    pub level_id: LevelId,
    pub state: SessionState,
    pub started_at: u64,
}

// Final tallies folded into a player's totals when a run ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunResult {
    pub score: u32,
    pub coins_collected: u32,
    // Level number reached when the run completed the level.
    pub completed_level: Option<u32>,
}
