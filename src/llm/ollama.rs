
use std::sync::Arc;
use url::Url;
use async_stream::stream as async_stream;
use futures::stream::BoxStream;
#[cfg(feature = "ollama_stream")]
use futures::StreamExt;


use crate::message::Message;
use crate::message::MessageRole as MsgRole;

use crate::llm::{
    traits::LLM,
    tokens::TokenUsage,
    error::LLMError,
    LLMResult,
    StreamData,
};

/// Default model name used when no model is specified.
/// Adjust this to match the model name you have installed in your local Ollama.
/// Common names: "llama3.2", "llama3", "llama2", or custom names from `ollama list`.
pub const DEFAULT_MODEL: &str = "llama3.2";

pub use ollama_rs::{
    error::OllamaError,
    Ollama as OllamaClient,
    models::ModelOptions,
    generation::chat::{request::ChatMessageRequest, ChatMessage, MessageRole},
};


#[derive(Debug, Clone)]
pub struct Ollama {
    pub(crate) client: Arc<OllamaClient>,
    pub(crate) model: String,
    pub(crate) options: Option<ModelOptions>,
}
impl Ollama {
    /// Create an `Ollama` wrapper using the provided client and the default model.
    ///
    /// If your local Ollama uses a different default model name, change
    /// `DEFAULT_MODEL` or call `Ollama::with_model`.
    pub fn new(client: Arc<OllamaClient>) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            options: None,
        }
    }

    /// Connect to an Ollama server at `host` (scheme included) and `port`.
    pub fn from_host(host: impl Into<String>, port: u16) -> LLMResult<Self> {
        let host = host.into();
        endpoint_url(&host, port)?;
        Ok(Self::new(Arc::new(OllamaClient::new(host, port))))
    }

    /// Use an explicit model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Attach generation options to every request.
    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_request(&self, messages: &[Message]) -> ChatMessageRequest {
        let mapped_messages = messages.iter().map(|message| message.into()).collect();
        let request = ChatMessageRequest::new(self.model.clone(), mapped_messages);
        match &self.options {
            Some(options) => request.options(options.clone()),
            None => request,
        }
    }
}

impl Default for Ollama {
    fn default() -> Self {
        let client = Arc::new(OllamaClient::default());
        Ollama::new(client)
    }
}


impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            MsgRole::System | MsgRole::Developer => MessageRole::System,
            MsgRole::User => MessageRole::User,
            MsgRole::Assistant => MessageRole::Assistant,
        };
        ChatMessage::new(role, message.content.clone())
    }
}

/// Server URL for `host` and `port`. Fails on anything the ollama client
/// would refuse: unparsable hosts, schemes other than http(s), empty hosts.
pub fn endpoint_url(host: &str, port: u16) -> LLMResult<Url> {
    let invalid = |reason: String| LLMError::InvalidEndpoint(format!("'{}': {}", host, reason));
    let mut url = Url::parse(host).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    url.set_port(Some(port)).map_err(|_| invalid("cannot carry a port".to_string()))?;
    Ok(url)
}

fn usage(prompt_eval_count: u64, eval_count: u64) -> TokenUsage {
    TokenUsage::new(
        u32::try_from(prompt_eval_count).unwrap_or(u32::MAX),
        u32::try_from(eval_count).unwrap_or(u32::MAX),
    )
}


impl LLM for Ollama {
    fn stream<'a>(&'a self, messages: &'a [Message]) -> BoxStream<'a, LLMResult<StreamData>> {
        let this = self;
        let msgs = messages;

        let s = async_stream! {
            let request = this.chat_request(msgs);
            tracing::debug!(model = %this.model, messages = msgs.len(), "sending ollama chat request");

            // Relay upstream chunks when the streaming feature is on
            #[cfg(feature = "ollama_stream")]
            {
                let upstream = match this.client.send_chat_messages_stream(request).await {
                    Ok(s) => s,
                    Err(e) => {
                        yield Err(LLMError::OllamaError(e));
                        return;
                    }
                };

                futures::pin_mut!(upstream);
                while let Some(item_res) = upstream.next().await {
                    match item_res {
                        Ok(item) => {
                            let value = match serde_json::to_value(&item.message) {
                                Ok(value) => value,
                                Err(e) => {
                                    yield Err(LLMError::from(e));
                                    return;
                                }
                            };
                            let content = item.message.content.clone();
                            let tokens = item
                                .final_data
                                .map(|data| usage(data.prompt_eval_count as u64, data.eval_count as u64));
                            yield Ok(StreamData::new(value, tokens, content));
                        }
                        Err(_) => {
                            yield Err(LLMError::InvalidResponse("ollama stream chunk could not be decoded".to_string()));
                            return;
                        }
                    }
                }
            }

            // Otherwise call the non-streaming endpoint and yield a single chunk
            #[cfg(not(feature = "ollama_stream"))]
            {
                match this.client.send_chat_messages(request).await {
                    Ok(response) => {
                        let content = response.message.content.clone();
                        let value = match serde_json::to_value(&response.message) {
                            Ok(value) => value,
                            Err(e) => {
                                yield Err(LLMError::from(e));
                                return;
                            }
                        };
                        let tokens = response
                            .final_data
                            .map(|data| usage(data.prompt_eval_count as u64, data.eval_count as u64));
                        yield Ok(StreamData::new(value, tokens, content));
                    }
                    Err(e) => {
                        yield Err(LLMError::OllamaError(e));
                    }
                }
            }
        };

        Box::pin(s)
    }
}
