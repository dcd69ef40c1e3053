pub mod llm;
pub mod agent;
pub mod message;
pub mod task;
pub mod config;
pub mod error;
pub mod prelude;

pub use error::{Error, Result};
pub use task::AgentTask;
