use tokio::sync::Mutex;

use crate::message::Message;
use super::traits::AgentThread;
use super::types::AgentResult;

/// Thread that keeps its history in memory for the lifetime of the value.
#[derive(Debug)]
pub struct ChatHistoryThread {
    id: String,
    history: Mutex<Vec<Message>>,
}

impl ChatHistoryThread {
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Seed the thread with existing messages.
    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = Mutex::new(history);
        self
    }
}

impl Default for ChatHistoryThread {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AgentThread for ChatHistoryThread {
    fn id(&self) -> &str {
        &self.id
    }

    async fn messages(&self) -> AgentResult<Vec<Message>> {
        Ok(self.history.lock().await.clone())
    }

    async fn append(&self, message: Message) -> AgentResult<()> {
        self.history.lock().await.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_in_order() {
        let thread = ChatHistoryThread::with_id("t-1");
        thread.append(Message::user("first")).await.unwrap();
        thread.append(Message::assistant("second")).await.unwrap();

        let history = thread.messages().await.unwrap();
        assert_eq!(thread.id(), "t-1");
        assert_eq!(history, vec![Message::user("first"), Message::assistant("second")]);
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(ChatHistoryThread::new().id(), ChatHistoryThread::new().id());
    }

    #[tokio::test]
    async fn seeded_history_is_returned() {
        let thread = ChatHistoryThread::new().with_history(vec![Message::system("be brief")]);
        assert_eq!(thread.messages().await.unwrap().len(), 1);
    }
}
