use super::level::ObjectId;

// Domain-level errors for session workflows.
#[derive(Debug)]
pub enum SessionError {
    // NotFound family: the referenced record has no backing entry.
    LevelNotFound,
    SessionNotFound,
    PlayerNotFound,
    // InvariantViolation family: fail fast, never retried.
    MissingSpawn,
    InvalidObjectSize { object_id: ObjectId },
    // Rejected input.
    InvalidPlayerName,
    // Persistence collaborator failed.
    StorageFailure,
}
