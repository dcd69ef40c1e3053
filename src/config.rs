use std::path::Path;
use std::sync::Arc;
use serde::{Serialize, Deserialize};

use crate::agent::types::{ChatCompletionAgent, KernelArguments};
use crate::agent::thread::ChatHistoryThread;
use crate::llm::ollama::{endpoint_url, Ollama, DEFAULT_MODEL};
use crate::llm::traits::llm_to_arc_dyn;
use crate::task::AgentTask;


#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Task definition as written in a TOML file.
///
/// ```toml
/// description = "Summarize the document in one sentence."
///
/// [arguments]
/// audience = "engineers"
///
/// [agent]
/// name = "summarizer"
/// instructions = "You write for {{$audience}}."
/// model = "llama3.2"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    pub description: String,
    #[serde(default)]
    pub arguments: KernelArguments,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_host() -> String {
    "http://localhost".to_string()
}

fn default_port() -> u16 {
    11434
}

impl TaskConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: TaskConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.description.trim().is_empty() {
            return Err(ConfigError::MissingConfig("description".to_string()));
        }
        if self.agent.name.trim().is_empty() {
            return Err(ConfigError::MissingConfig("agent.name".to_string()));
        }
        self.agent.validate_endpoint()
    }

    /// Build a task running on a fresh in-memory thread.
    pub fn build_task(&self) -> Result<AgentTask, ConfigError> {
        let agent = self.agent.build_ollama_agent()?;
        Ok(AgentTask::new(self.description.clone(), Arc::new(ChatHistoryThread::new()), Arc::new(agent))
            .with_arguments(self.arguments.clone()))
    }
}

impl AgentConfig {
    fn validate_endpoint(&self) -> Result<(), ConfigError> {
        endpoint_url(&self.host, self.port)
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidConfig(format!("agent.host: {}", e)))
    }

    pub fn build_ollama_agent(&self) -> Result<ChatCompletionAgent, ConfigError> {
        let llm = Ollama::from_host(self.host.clone(), self.port)
            .map_err(|e| ConfigError::InvalidConfig(format!("agent.host: {}", e)))?
            .with_model(self.model.clone());
        let agent = ChatCompletionAgent::new(self.name.clone(), llm_to_arc_dyn(llm));
        Ok(match &self.instructions {
            Some(instructions) => agent.with_instructions(instructions.clone()),
            None => agent,
        })
    }
}
