// In-memory persistence adapter for levels, sessions and players.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::entities::{NewSession, Player, PlayerId, RunResult, SessionId, SessionRecord};
use crate::domain::level::{Level, LevelId, LevelObject};
use crate::domain::ports::{LevelStore, PlayerStore, SessionStore};

// Session records kept by `InMemoryStore::new`.
pub const DEFAULT_SESSION_RETENTION: usize = 10_000;

#[derive(Default)]
struct Tables {
    levels: HashMap<LevelId, StoredLevel>,
    sessions: HashMap<SessionId, SessionRecord>,
    // Stored session ids, oldest first.
    session_order: VecDeque<SessionId>,
    players: HashMap<PlayerId, Player>,
    last_level_id: LevelId,
    last_session_id: SessionId,
    last_player_id: PlayerId,
}

struct StoredLevel {
    level: Level,
    // Kept in insertion order; the engine resolves collisions in this order.
    objects: Vec<LevelObject>,
}

impl Tables {
    // Stores `record`, then evicts the oldest records beyond `retention`.
    fn store_session(&mut self, record: SessionRecord, retention: usize) {
        let id = record.id;
        if self.sessions.insert(id, record).is_none() {
            self.session_order.push_back(id);
        }

        while self.sessions.len() > retention.max(1) {
            let Some(oldest) = self.session_order.pop_front() else {
                break;
            };
            self.sessions.remove(&oldest);
        }
    }
}

// Process-local store; everything is lost on restart.
//
// Session records are capped: once more than the configured retention are stored,
// the oldest are evicted. A running session whose record was evicted is stored
// again on its next save.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    session_retention: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_session_retention(DEFAULT_SESSION_RETENTION)
    }

    pub fn with_session_retention(session_retention: usize) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            session_retention,
        }
    }
}

#[async_trait]
impl LevelStore for InMemoryStore {
    async fn insert_level(
        &self,
        mut level: Level,
        objects: Vec<LevelObject>,
    ) -> Result<LevelId, String> {
        let mut tables = self.tables.lock().await;
        tables.last_level_id += 1;
        let id = tables.last_level_id;
        level.id = id;
        tables.levels.insert(id, StoredLevel { level, objects });
        Ok(id)
    }

    async fn get_level(&self, level_id: LevelId) -> Result<Option<Level>, String> {
        let tables = self.tables.lock().await;
        Ok(tables
            .levels
            .get(&level_id)
            .map(|stored| stored.level.clone()))
    }

    async fn get_level_objects(&self, level_id: LevelId) -> Result<Vec<LevelObject>, String> {
        let tables = self.tables.lock().await;
        Ok(tables
            .levels
            .get(&level_id)
            .map(|stored| stored.objects.clone())
            .unwrap_or_default())
    }

    async fn find_level_by_number(&self, level_number: u32) -> Result<Option<Level>, String> {
        let tables = self.tables.lock().await;
        // Lowest id wins when several active levels share a number.
        Ok(tables
            .levels
            .values()
            .map(|stored| &stored.level)
            .filter(|level| level.is_active && level.level_number == level_number)
            .min_by_key(|level| level.id)
            .cloned())
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn create_session(&self, session: NewSession) -> Result<SessionRecord, String> {
        let mut tables = self.tables.lock().await;
        if !tables.players.contains_key(&session.player_id) {
            return Err(format!("unknown player {}", session.player_id));
        }
        if !tables.levels.contains_key(&session.level_id) {
            return Err(format!("unknown level {}", session.level_id));
        }

        tables.last_session_id += 1;
        let record = SessionRecord {
            id: tables.last_session_id,
            player_id: session.player_id,
            level_id: session.level_id,
            state: session.state,
            started_at: session.started_at,
            completed_at: None,
        };
        tables.store_session(record.clone(), self.session_retention);
        Ok(record)
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Option<SessionRecord>, String> {
        let tables = self.tables.lock().await;
        Ok(tables.sessions.get(&session_id).cloned())
    }

    async fn save_session(&self, session: SessionRecord) -> Result<(), String> {
        let mut tables = self.tables.lock().await;
        // Ids never handed out are rejected; evicted ones are stored again.
        if session.id == 0 || session.id > tables.last_session_id {
            return Err(format!("unknown session {}", session.id));
        }
        tables.store_session(session, self.session_retention);
        Ok(())
    }
}

#[async_trait]
impl PlayerStore for InMemoryStore {
    async fn get_or_create_player(&self, name: &str) -> Result<Player, String> {
        let mut tables = self.tables.lock().await;
        if let Some(player) = tables.players.values().find(|player| player.name == name) {
            return Ok(player.clone());
        }

        tables.last_player_id += 1;
        let player = Player {
            id: tables.last_player_id,
            name: name.to_string(),
            total_coins_collected: 0,
            total_score: 0,
            highest_level: 0,
        };
        tables.players.insert(player.id, player.clone());
        Ok(player)
    }

    async fn get_player(&self, player_id: PlayerId) -> Result<Option<Player>, String> {
        let tables = self.tables.lock().await;
        Ok(tables.players.get(&player_id).cloned())
    }

    async fn record_result(&self, player_id: PlayerId, result: RunResult) -> Result<(), String> {
        let mut tables = self.tables.lock().await;
        let Some(player) = tables.players.get_mut(&player_id) else {
            return Err(format!("unknown player {player_id}"));
        };

        player.total_score = player.total_score.saturating_add(u64::from(result.score));
        player.total_coins_collected = player
            .total_coins_collected
            .saturating_add(u64::from(result.coins_collected));
        if let Some(level_number) = result.completed_level {
            player.highest_level = player.highest_level.max(level_number);
        }
        Ok(())
    }
}
