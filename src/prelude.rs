pub use crate::agent::{
    error::AgentError,
    thread::ChatHistoryThread,
    traits::{Agent, AgentThread},
    types::{AgentInvokeOptions, ChatCompletionAgent, KernelArguments, StreamingContent},
};
pub use crate::config::{AgentConfig, TaskConfig};
pub use crate::llm::{ollama::Ollama, tokens::TokenUsage, traits::LLM};
pub use crate::message::{Message, MessageRole};
pub use crate::task::{AgentTask, TaskResponse, error::TaskError};
pub use tokio_util::sync::CancellationToken;
