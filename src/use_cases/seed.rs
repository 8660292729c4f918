// Startup seeding of the built-in level and default player.

use super::sessions::DEFAULT_PLAYER_NAME;
use crate::domain::errors::SessionError;
use crate::domain::level::{LevelId, default_level};
use crate::domain::ports::GameStore;
use crate::domain::GameConfig;
use tracing::{info, warn};

// Ensures the default player and level number 1 exist, returning the level id.
//
// Safe to call on every boot: existing rows are left as is.
pub async fn seed_defaults(
    store: &dyn GameStore,
    config: &GameConfig,
) -> Result<LevelId, SessionError> {
    let player = store
        .get_or_create_player(DEFAULT_PLAYER_NAME)
        .await
        .map_err(|error| {
            warn!(%error, "failed to seed default player");
            SessionError::StorageFailure
        })?;
    info!(player_id = player.id, name = %player.name, "default player ready");

    let existing = store.find_level_by_number(1).await.map_err(|error| {
        warn!(%error, "level lookup failed while seeding");
        SessionError::StorageFailure
    })?;
    if let Some(level) = existing {
        info!(level_id = level.id, name = %level.name, "default level already present");
        return Ok(level.id);
    }

    let (level, objects) = default_level(config);
    let name = level.name.clone();
    let object_count = objects.len();
    let level_id = store.insert_level(level, objects).await.map_err(|error| {
        warn!(%error, "failed to insert default level");
        SessionError::StorageFailure
    })?;

    info!(level_id, %name, object_count, "seeded default level");
    Ok(level_id)
}
