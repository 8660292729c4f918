use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::Vec2;
use crate::domain::entities::{NewSession, Player, PlayerId, RunResult, SessionId, SessionRecord};
use crate::domain::level::{Level, LevelId, LevelObject};
use crate::domain::ports::{Clock, LevelStore, PlayerStore, SessionStore};

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub create_session: bool,
    pub save_session: bool,
    pub get_level: bool,
    pub record_result: bool,
}

#[derive(Default)]
struct Tables {
    next_id: u64,
    levels: HashMap<LevelId, (Level, Vec<LevelObject>)>,
    sessions: HashMap<SessionId, SessionRecord>,
    players: HashMap<PlayerId, Player>,
    saves: usize,
}

impl Tables {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone)]
pub(crate) struct RecordingStore {
    tables: Arc<Mutex<Tables>>,
    failures: FailureFlags,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    // Number of successful `save_session` calls so far.
    pub(crate) fn save_count(&self) -> usize {
        self.tables.lock().expect("tables mutex poisoned").saves
    }

    pub(crate) fn level_count(&self) -> usize {
        self.tables.lock().expect("tables mutex poisoned").levels.len()
    }
}

#[async_trait]
impl LevelStore for RecordingStore {
    async fn insert_level(
        &self,
        mut level: Level,
        objects: Vec<LevelObject>,
    ) -> Result<LevelId, String> {
        let mut guard = self.tables.lock().expect("tables mutex poisoned");
        let id = guard.allocate();
        level.id = id;
        guard.levels.insert(id, (level, objects));
        Ok(id)
    }

    async fn get_level(&self, level_id: LevelId) -> Result<Option<Level>, String> {
        if self.failures.get_level {
            return Err("get level failed".to_string());
        }

        let guard = self.tables.lock().expect("tables mutex poisoned");
        Ok(guard.levels.get(&level_id).map(|(level, _)| level.clone()))
    }

    async fn get_level_objects(&self, level_id: LevelId) -> Result<Vec<LevelObject>, String> {
        let guard = self.tables.lock().expect("tables mutex poisoned");
        Ok(guard
            .levels
            .get(&level_id)
            .map(|(_, objects)| objects.clone())
            .unwrap_or_default())
    }

    async fn find_level_by_number(&self, level_number: u32) -> Result<Option<Level>, String> {
        let guard = self.tables.lock().expect("tables mutex poisoned");
        Ok(guard
            .levels
            .values()
            .map(|(level, _)| level)
            .find(|level| level.level_number == level_number)
            .cloned())
    }
}

#[async_trait]
impl SessionStore for RecordingStore {
    async fn create_session(&self, session: NewSession) -> Result<SessionRecord, String> {
        if self.failures.create_session {
            return Err("create session failed".to_string());
        }

        let mut guard = self.tables.lock().expect("tables mutex poisoned");
        let record = SessionRecord {
            id: guard.allocate(),
            player_id: session.player_id,
            level_id: session.level_id,
            state: session.state,
            started_at: session.started_at,
            completed_at: None,
        };
        guard.sessions.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Option<SessionRecord>, String> {
        let guard = self.tables.lock().expect("tables mutex poisoned");
        Ok(guard.sessions.get(&session_id).cloned())
    }

    async fn save_session(&self, session: SessionRecord) -> Result<(), String> {
        if self.failures.save_session {
            return Err("save session failed".to_string());
        }

        let mut guard = self.tables.lock().expect("tables mutex poisoned");
        guard.sessions.insert(session.id, session);
        guard.saves += 1;
        Ok(())
    }
}

#[async_trait]
impl PlayerStore for RecordingStore {
    async fn get_or_create_player(&self, name: &str) -> Result<Player, String> {
        let mut guard = self.tables.lock().expect("tables mutex poisoned");
        if let Some(player) = guard.players.values().find(|player| player.name == name) {
            return Ok(player.clone());
        }

        let player = Player {
            id: guard.allocate(),
            name: name.to_string(),
            total_coins_collected: 0,
            total_score: 0,
            highest_level: 0,
        };
        guard.players.insert(player.id, player.clone());
        Ok(player)
    }

    async fn get_player(&self, player_id: PlayerId) -> Result<Option<Player>, String> {
        let guard = self.tables.lock().expect("tables mutex poisoned");
        Ok(guard.players.get(&player_id).cloned())
    }

    async fn record_result(&self, player_id: PlayerId, result: RunResult) -> Result<(), String> {
        if self.failures.record_result {
            return Err("record result failed".to_string());
        }

        let mut guard = self.tables.lock().expect("tables mutex poisoned");
        let player = guard
            .players
            .get_mut(&player_id)
            .ok_or_else(|| "player missing".to_string())?;
        player.total_score += u64::from(result.score);
        player.total_coins_collected += u64::from(result.coins_collected);
        if let Some(level_number) = result.completed_level {
            player.highest_level = player.highest_level.max(level_number);
        }
        Ok(())
    }
}

// Flat 800x600 level: ground under the spawn point and one coin out of reach.
pub(crate) fn flat_level() -> (Level, Vec<LevelObject>) {
    let level = Level {
        id: 0,
        name: "Flat".to_string(),
        level_number: 1,
        width: 800.0,
        height: 600.0,
        background_color: "#87CEEB".to_string(),
        gravity: 0.8,
        spawn: Some(Vec2::new(100.0, 400.0)),
        time_limit: 400,
        is_active: true,
    };
    let objects = vec![
        LevelObject::platform(1, 0.0, 550.0, 800.0, 50.0),
        LevelObject::coin(2, 700.0, 100.0, 100),
    ];
    (level, objects)
}
