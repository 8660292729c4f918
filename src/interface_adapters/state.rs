use crate::domain::level::LevelId;
use crate::domain::ports::Clock;
use crate::use_cases::SessionRegistry;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    // Level used when a start request names none.
    pub default_level_id: LevelId,
}

// System clock adapter used by session use cases.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
