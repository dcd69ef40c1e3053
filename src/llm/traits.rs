use std::sync::Arc;
use crate::message::Message;
use crate::llm::{LLMResult, StreamData};
use futures::stream::BoxStream;

/// Convert a concrete L into an `Arc<dyn LLM>`.
/// Convenience so callers can do `llm_to_arc_dyn(MyLlm::new(...))`.
pub fn llm_to_arc_dyn<L>(llm: L) -> Arc<dyn LLM>
where
    L: 'static + LLM,
{
    Arc::new(llm)
}

/// Chat completion backend used by `ChatCompletionAgent`.
///
/// The stream borrows `messages` for `'a`, so implementations can avoid cloning
/// the history. Implementations that spawn background tasks must make the data
/// `'static` first.
pub trait LLM: Send + Sync {
    /// Return the generation as an ordered stream of chunks.
    fn stream<'a>(&'a self, messages: &'a [Message]) -> BoxStream<'a, LLMResult<StreamData>>;
}
