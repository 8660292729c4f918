// Use cases layer: application workflows for the platformer server.

pub mod camera;
pub mod game;
pub mod policy;
pub mod seed;
pub mod sessions;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use game::SessionLimits;
pub use seed::seed_defaults;
pub use sessions::{SessionHandle, SessionRegistry, SessionSettings};
pub use types::{RunState, SessionEvent, SessionUpdate};
