// Domain layer: core simulation types, rules and persistence ports.

pub mod entities;
pub mod errors;
pub mod geometry;
pub mod level;
pub mod ports;
pub mod state;
pub mod systems;
pub mod tuning;

pub use geometry::{Aabb, Vec2};
pub use level::{Level, LevelId, LevelObject, ObjectId, ObjectKind};
pub use state::{
    HudSnapshot, LevelSnapshot, ObjectSnapshot, PlayerInput, PlayerSnapshot, PlayerState,
    SessionState,
};
pub use systems::advance;
pub use tuning::GameConfig;
