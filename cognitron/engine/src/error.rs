use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the thinking engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration rejected during validation or load.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// Input rejected before processing.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Referenced context does not exist.
    #[error("unknown context {0}")]
    UnknownContext(Uuid),
    /// Referenced thought does not exist.
    #[error("unknown thought {0}")]
    UnknownThought(Uuid),
    /// Referenced work item does not exist.
    #[error("unknown work item {0}")]
    UnknownWorkItem(Uuid),
}
