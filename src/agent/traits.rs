use futures::stream::BoxStream;

use crate::message::Message;
use super::types::{AgentInvokeOptions, AgentResult, StreamingContent};

/// Streaming entry point of an agent runtime.
///
/// Implementations receive the new messages for this turn, the thread the turn
/// belongs to and the per-call options. They are responsible for recording the
/// turn in `thread`; callers only drain the returned stream.
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    /// Invoke the agent. The stream is lazy and yields fragments in generation order.
    fn invoke_stream<'a>(
        &'a self,
        messages: &'a [Message],
        thread: &'a dyn AgentThread,
        options: &'a AgentInvokeOptions,
    ) -> BoxStream<'a, AgentResult<StreamingContent>>;
}

/// Handle to a conversation's accumulated history. Owned outside of any task
/// and shared between invocations through `Arc`.
#[async_trait::async_trait]
pub trait AgentThread: Send + Sync {
    fn id(&self) -> &str;

    /// Snapshot of the history in arrival order.
    async fn messages(&self) -> AgentResult<Vec<Message>>;

    async fn append(&self, message: Message) -> AgentResult<()>;
}
