use std::sync::Arc;
use async_stream::stream as async_stream;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde_json::Value as JsonValue;
use crate::llm::traits::LLM;
use crate::message::Message;


pub mod types;
pub mod error;
pub mod traits;
pub mod thread;

use traits::{Agent, AgentThread};
use types::{AgentInvokeOptions, AgentResult, ChatCompletionAgent, KernelArguments, StreamingContent};
use error::AgentError;


impl ChatCompletionAgent {
    /// Create a new agent with the provided name and LLM. Instructions and arguments start empty.
    pub fn new(name: impl Into<String>, llm: Arc<dyn LLM>) -> Self {
        Self {
            name: name.into(),
            llm,
            instructions: None,
            arguments: KernelArguments::new(),
        }
    }

    /// Set or replace the agent's instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Set the default arguments used to render instructions.
    pub fn with_arguments(mut self, arguments: KernelArguments) -> Self {
        self.arguments = arguments;
        self
    }

    // instructions, per-call instructions, then the thread so far
    async fn build_history(
        &self,
        thread: &dyn AgentThread,
        options: &AgentInvokeOptions,
    ) -> AgentResult<Vec<Message>> {
        let arguments = self.arguments.merged(options.kernel_arguments.as_ref());
        let mut msgs = Vec::new();
        if let Some(instructions) = self.instructions.as_deref() {
            msgs.push(Message::system(render_template(instructions, &arguments)?));
        }
        if let Some(additional) = options.additional_instructions.as_deref() {
            msgs.push(Message::system(render_template(additional, &arguments)?));
        }
        msgs.extend(thread.messages().await?);
        Ok(msgs)
    }
}

impl Agent for ChatCompletionAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke_stream<'a>(
        &'a self,
        messages: &'a [Message],
        thread: &'a dyn AgentThread,
        options: &'a AgentInvokeOptions,
    ) -> BoxStream<'a, AgentResult<StreamingContent>> {
        let s = async_stream! {
            let mut history = match self.build_history(thread, options).await {
                Ok(history) => history,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            for message in messages {
                if let Err(e) = thread.append(message.clone()).await {
                    yield Err(e);
                    return;
                }
            }
            history.extend(messages.iter().cloned());
            tracing::debug!(agent = %self.name, thread = thread.id(), history = history.len(), "invoking chat completion agent");

            let mut reply = String::new();
            let mut chunks = self.llm.stream(&history);
            while let Some(chunk) = chunks.next().await {
                match chunk {
                    Ok(chunk) => {
                        reply.push_str(&chunk.content);
                        yield Ok(StreamingContent::from_chunk(&self.name, chunk));
                    }
                    Err(e) => {
                        yield Err(AgentError::from(e));
                        return;
                    }
                }
            }

            // the reply is only recorded once the LLM stream completed
            if let Err(e) = thread.append(Message::assistant(reply).with_name(self.name.clone())).await {
                yield Err(e);
            }
        };

        Box::pin(s)
    }
}

/// Replace `{{$name}}` placeholders with argument values. Strings are inserted
/// verbatim, other values as JSON. Anything else between braces is left alone.
pub fn render_template(template: &str, arguments: &KernelArguments) -> AgentResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let inner = rest[start + 2..start + 2 + len].trim();
        out.push_str(&rest[..start]);
        match inner.strip_prefix('$') {
            Some(name) => {
                let name = name.trim();
                match arguments.get(name) {
                    Some(JsonValue::String(s)) => out.push_str(s),
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        return Err(AgentError::InvalidArguments(format!("missing argument '{}'", name)));
                    }
                }
            }
            None => out.push_str(&rest[start..start + 2 + len + 2]),
        }
        rest = &rest[start + 2 + len + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use futures::stream;
    use serde_json::json;
    use crate::llm::{LLMResult, StreamData, error::LLMError};
    use crate::message::MessageRole;
    use thread::ChatHistoryThread;

    /// Replays fixed chunks and records the history it was called with.
    struct ScriptedLlm {
        chunks: Vec<&'static str>,
        fail_after: Option<usize>,
        seen: Mutex<Vec<Message>>,
    }

    impl ScriptedLlm {
        fn new(chunks: Vec<&'static str>) -> Self {
            Self { chunks, fail_after: None, seen: Mutex::new(Vec::new()) }
        }
    }

    impl LLM for ScriptedLlm {
        fn stream<'a>(&'a self, messages: &'a [Message]) -> BoxStream<'a, LLMResult<StreamData>> {
            *self.seen.lock().unwrap() = messages.to_vec();
            let mut items: Vec<LLMResult<StreamData>> = self
                .chunks
                .iter()
                .map(|c| Ok(StreamData::new(json!({}), None, *c)))
                .collect();
            if let Some(n) = self.fail_after {
                items.truncate(n);
                items.push(Err(LLMError::InvalidResponse("model went away".into())));
            }
            stream::iter(items).boxed()
        }
    }

    async fn drain(agent: &ChatCompletionAgent, messages: &[Message], thread: &ChatHistoryThread, options: &AgentInvokeOptions) -> Vec<AgentResult<StreamingContent>> {
        agent.invoke_stream(messages, thread, options).collect().await
    }

    #[tokio::test]
    async fn streams_chunks_and_records_turn() {
        let llm = Arc::new(ScriptedLlm::new(vec!["Hel", "lo"]));
        let agent = ChatCompletionAgent::new("greeter", llm.clone()).with_instructions("Be {{$tone}}.");
        let thread = ChatHistoryThread::new();
        let options = AgentInvokeOptions::with_arguments(KernelArguments::new().with("tone", "kind"));

        let items = drain(&agent, &[Message::user("hi")], &thread, &options).await;
        let contents: Vec<String> = items.into_iter().map(|i| i.unwrap().content).collect();
        assert_eq!(contents, vec!["Hel", "lo"]);

        let seen = llm.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![Message::system("Be kind."), Message::user("hi")]);

        let history = thread.messages().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, "Hello");
        assert_eq!(history[1].name.as_deref(), Some("greeter"));
    }

    #[tokio::test]
    async fn second_turn_sees_previous_history() {
        let llm = Arc::new(ScriptedLlm::new(vec!["ok"]));
        let agent = ChatCompletionAgent::new("a", llm.clone());
        let thread = ChatHistoryThread::new();
        let options = AgentInvokeOptions::default();

        drain(&agent, &[Message::user("one")], &thread, &options).await;
        drain(&agent, &[Message::user("two")], &thread, &options).await;

        let seen = llm.seen.lock().unwrap().clone();
        let roles: Vec<MessageRole> = seen.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]);
        assert_eq!(seen[2].content, "two");
    }

    #[tokio::test]
    async fn failed_stream_does_not_record_reply() {
        let mut scripted = ScriptedLlm::new(vec!["partial", "never"]);
        scripted.fail_after = Some(1);
        let agent = ChatCompletionAgent::new("a", Arc::new(scripted));
        let thread = ChatHistoryThread::new();

        let items = drain(&agent, &[Message::user("q")], &thread, &AgentInvokeOptions::default()).await;
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(AgentError::LLMExecutionError(_))));

        let history = thread.messages().await.unwrap();
        assert_eq!(history, vec![Message::user("q")]);
    }

    #[tokio::test]
    async fn missing_argument_fails_before_calling_llm() {
        let llm = Arc::new(ScriptedLlm::new(vec!["x"]));
        let agent = ChatCompletionAgent::new("a", llm.clone()).with_instructions("Use {{$lang}}");
        let thread = ChatHistoryThread::new();

        let items = drain(&agent, &[Message::user("q")], &thread, &AgentInvokeOptions::default()).await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(AgentError::InvalidArguments(_))));
        assert!(llm.seen.lock().unwrap().is_empty());
        assert!(thread.messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn additional_instructions_follow_agent_instructions() {
        let llm = Arc::new(ScriptedLlm::new(vec!["ok"]));
        let agent = ChatCompletionAgent::new("a", llm.clone()).with_instructions("You translate.");
        let thread = ChatHistoryThread::new();
        let options = AgentInvokeOptions {
            kernel_arguments: Some(KernelArguments::new().with("lang", "fr")),
            additional_instructions: Some("Reply in {{$lang}}".to_string()),
        };

        drain(&agent, &[Message::user("hello")], &thread, &options).await;

        let seen = llm.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                Message::system("You translate."),
                Message::system("Reply in fr"),
                Message::user("hello"),
            ]
        );
    }

    #[test]
    fn invocation_arguments_override_agent_defaults() {
        let defaults = KernelArguments::new().with("a", 1).with("b", "x");
        let merged = defaults.merged(Some(&KernelArguments::new().with("b", "y")));
        assert_eq!(merged.get("a"), Some(&json!(1)));
        assert_eq!(merged.get("b"), Some(&json!("y")));
    }

    #[test]
    fn render_template_handles_values_and_literals() {
        let args = KernelArguments::new().with("name", "Ada").with("n", 3);
        let rendered = render_template("{{ $name }} has {{$n}} items {{literal}} {{", &args).unwrap();
        assert_eq!(rendered, "Ada has 3 items {{literal}} {{");
    }
}
