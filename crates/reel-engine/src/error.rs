/// Result alias carrying [`ReelError`].
pub type Result<T> = std::result::Result<T, ReelError>;

/// Errors surfaced by the engine.
///
/// Only construction and configuration can fail. Once a show is running,
/// missing entities, late assets and repeated teardown are absorbed as
/// no-ops so the frame loop never stops.
#[derive(Debug, thiserror::Error)]
pub enum ReelError {
    #[error("stage schedule has no stages")]
    EmptySchedule,

    #[error("stage '{stage}' has invalid duration {duration} (must be finite and > 0)")]
    InvalidDuration { stage: String, duration: f32 },

    #[error("schedule has {stages} stages but {handlers} stage handlers were supplied")]
    HandlerMismatch { stages: usize, handlers: usize },

    #[error("unknown show: {0}")]
    UnknownShow(String),

    #[error("show already registered: {0}")]
    DuplicateShow(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
