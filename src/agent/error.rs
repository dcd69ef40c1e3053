use crate::llm::error::LLMError;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LLMExecutionError(#[from] LLMError),

    #[error("Thread error: {0}")]
    Thread(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Invocation cancelled")]
    Cancelled,
}
