use crate::llm::traits::LLM;
use crate::llm::tokens::TokenUsage;
use crate::llm::StreamData;
use std::sync::Arc;
use std::collections::HashMap;
use super::error::AgentError;
use serde::{Serialize, Deserialize};
use serde_json::Value as JsonValue;

/// Agent backed by a chat completion LLM.
pub struct ChatCompletionAgent {
    /// A short, human-friendly name, also used as the author of its replies.
    pub name: String,

    /// The LLM implementation used to generate replies.
    pub llm: Arc<dyn LLM>,

    /// Optional instructions sent as the system message. May reference
    /// arguments with `{{$name}}` placeholders.
    pub instructions: Option<String>,

    /// Default arguments, overridden per call by `AgentInvokeOptions::kernel_arguments`.
    pub arguments: KernelArguments,
}

/// Named parameters passed through to an agent invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KernelArguments(HashMap<String, JsonValue>);

impl KernelArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `insert`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace an argument, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Option<JsonValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    /// Copy of `self` with every entry of `overrides` applied on top.
    pub fn merged(&self, overrides: Option<&KernelArguments>) -> KernelArguments {
        let mut merged = self.clone();
        if let Some(overrides) = overrides {
            for (name, value) in overrides.iter() {
                merged.0.insert(name.clone(), value.clone());
            }
        }
        merged
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for KernelArguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<HashMap<String, JsonValue>> for KernelArguments {
    fn from(map: HashMap<String, JsonValue>) -> Self {
        Self(map)
    }
}

/// Per-call options handed to `Agent::invoke_stream`.
#[derive(Debug, Clone, Default)]
pub struct AgentInvokeOptions {
    pub kernel_arguments: Option<KernelArguments>,
    /// Extra instructions for this call only, sent after the agent's own.
    pub additional_instructions: Option<String>,
}

impl AgentInvokeOptions {
    pub fn with_arguments(arguments: KernelArguments) -> Self {
        Self {
            kernel_arguments: Some(arguments),
            additional_instructions: None,
        }
    }
}

/// One fragment of a streamed agent reply.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StreamingContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenUsage>,
}

impl StreamingContent {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            author: None,
            content: content.into(),
            tokens: None,
        }
    }

    pub(crate) fn from_chunk(author: &str, chunk: StreamData) -> Self {
        Self {
            author: Some(author.to_string()),
            content: chunk.content,
            tokens: chunk.tokens,
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
