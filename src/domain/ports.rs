use async_trait::async_trait;

use crate::domain::entities::{NewSession, Player, PlayerId, RunResult, SessionId, SessionRecord};
use crate::domain::level::{Level, LevelId, LevelObject};

// Port for authored levels. Levels never change once inserted.
#[async_trait]
pub trait LevelStore: Send + Sync {
    async fn insert_level(&self, level: Level, objects: Vec<LevelObject>)
    -> Result<LevelId, String>;
    async fn get_level(&self, level_id: LevelId) -> Result<Option<Level>, String>;
    async fn get_level_objects(&self, level_id: LevelId) -> Result<Vec<LevelObject>, String>;
    async fn find_level_by_number(&self, level_number: u32) -> Result<Option<Level>, String>;
}

// Port for session progress.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: NewSession) -> Result<SessionRecord, String>;
    async fn get_session(&self, session_id: SessionId) -> Result<Option<SessionRecord>, String>;
    async fn save_session(&self, session: SessionRecord) -> Result<(), String>;
}

// Port for player profiles.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    async fn get_or_create_player(&self, name: &str) -> Result<Player, String>;
    async fn get_player(&self, player_id: PlayerId) -> Result<Option<Player>, String>;
    async fn record_result(&self, player_id: PlayerId, result: RunResult) -> Result<(), String>;
}

// Everything the session use cases need from persistence.
pub trait GameStore: LevelStore + SessionStore + PlayerStore {}

impl<T> GameStore for T where T: LevelStore + SessionStore + PlayerStore {}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}
