pub mod traits;
pub mod ollama;
pub mod tokens;
pub mod error;


use serde::{Serialize, Deserialize};
use serde_json::Value as JsonValue;
use tokens::TokenUsage;

/// One chunk of a streamed LLM generation.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StreamData {
    /// Raw backend payload for this chunk.
    pub value: JsonValue,
    /// Usage reported with this chunk. Backends usually only attach it to the last one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenUsage>,
    pub content: String,
}

impl StreamData {
    pub fn new(value: JsonValue, tokens: Option<TokenUsage>, content: impl Into<String>) -> Self {
        Self {
            value,
            tokens,
            content: content.into(),
        }
    }
}

/// Result type for LLM operations.
pub type LLMResult<T> = std::result::Result<T, error::LLMError>;
