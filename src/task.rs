//! A description, an agent and a thread bundled into a reusable call.
//!
//! ```rust,ignore
//! let task = AgentTask::new("Score this essay as JSON {\"score\": n}", thread, agent);
//! let graded: Grade = task.invoke_as(&essay).await?;
//! ```

use std::sync::Arc;
use futures::StreamExt;
use serde::{Serialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;

use crate::agent::{
    error::AgentError,
    traits::{Agent, AgentThread},
    types::{AgentInvokeOptions, KernelArguments},
};
use crate::llm::tokens::TokenUsage;
use crate::message::Message;

pub mod error;

use error::{TaskError, TaskResult};

/// Fixed instruction plus the context it runs in.
///
/// The task owns none of its collaborators: the thread and agent are shared
/// handles and only the thread's history changes as a side effect of a call.
#[derive(Clone)]
pub struct AgentTask {
    pub description: String,
    pub thread: Arc<dyn AgentThread>,
    pub agent: Arc<dyn Agent>,
    pub arguments: KernelArguments,
}

/// Aggregated reply of one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskResponse {
    pub generation: String,
    pub tokens: TokenUsage,
    /// Number of fragments the agent yielded.
    pub fragments: usize,
}

impl AgentTask {
    pub fn new(description: impl Into<String>, thread: Arc<dyn AgentThread>, agent: Arc<dyn Agent>) -> Self {
        Self {
            description: description.into(),
            thread,
            agent,
            arguments: KernelArguments::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: KernelArguments) -> Self {
        self.arguments = arguments;
        self
    }

    /// Messages sent for `input`: the description, then the input if one was given.
    /// `Some("")` is a real (empty) message, only `None` is omitted.
    pub fn messages(&self, input: Option<&str>) -> Vec<Message> {
        let mut msgs = vec![Message::user(self.description.clone())];
        if let Some(input) = input {
            msgs.push(Message::user(input));
        }
        msgs
    }

    fn options(&self) -> AgentInvokeOptions {
        AgentInvokeOptions::with_arguments(self.arguments.clone())
    }

    /// Invoke the agent and return the concatenated reply.
    pub async fn invoke(&self, input: Option<&str>) -> TaskResult<String> {
        Ok(self.invoke_detailed(input).await?.generation)
    }

    /// Like `invoke`, also reporting token usage and the fragment count.
    pub async fn invoke_detailed(&self, input: Option<&str>) -> TaskResult<TaskResponse> {
        let messages = self.messages(input);
        let options = self.options();
        tracing::debug!(agent = self.agent.name(), thread = self.thread.id(), messages = messages.len(), "invoking task");

        let mut response = TaskResponse::default();
        let mut stream = self.agent.invoke_stream(&messages, &*self.thread, &options);
        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            tracing::trace!(len = fragment.content.len(), "fragment");
            response.generation.push_str(&fragment.content);
            if let Some(tokens) = fragment.tokens.as_ref() {
                response.tokens.add(tokens);
            }
            response.fragments += 1;
        }

        tracing::debug!(fragments = response.fragments, total_tokens = response.tokens.total_tokens, "task finished");
        Ok(response)
    }

    /// `invoke` that gives up when `cancel` fires. Nothing is returned for a
    /// cancelled call, even if fragments had already arrived.
    pub async fn invoke_with_cancellation(&self, input: Option<&str>, cancel: &CancellationToken) -> TaskResult<String> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TaskError::Agent(AgentError::Cancelled)),
            result = self.invoke(input) => result,
        }
    }

    /// Invoke with a text input and decode the reply as JSON.
    pub async fn invoke_as<T: DeserializeOwned>(&self, input: &str) -> TaskResult<T> {
        let response = self.invoke(Some(input)).await?;
        serde_json::from_str(&response).map_err(TaskError::Decode)
    }

    /// Invoke with a structured input encoded as JSON and decode the reply as JSON.
    /// `None` sends the description alone; it is never encoded as `null`.
    /// Name `()` as the input type in that case: `invoke_with::<(), T>(None)`.
    pub async fn invoke_with<I, T>(&self, input: Option<&I>) -> TaskResult<T>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let encoded = input
            .map(serde_json::to_string)
            .transpose()
            .map_err(TaskError::Encode)?;
        let response = self.invoke(encoded.as_deref()).await?;
        serde_json::from_str(&response).map_err(TaskError::Decode)
    }
}
