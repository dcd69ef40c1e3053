use crate::agent::error::AgentError;

/// Failures of a task invocation. Every variant is the collaborator's error
/// unchanged; `Display` and `source` forward to it.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// The structured input could not be encoded.
    #[error(transparent)]
    Encode(serde_json::Error),

    /// The aggregated reply was not a valid encoding of the requested type.
    #[error(transparent)]
    Decode(serde_json::Error),
}

pub type TaskResult<T> = Result<T, TaskError>;
