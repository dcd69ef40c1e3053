use agent_task::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct Rating {
    score: u8,
    reason: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Adjust model name to one available in your Ollama server.
    let ollama = Ollama::default().with_model("qwen3:8b");
    let agent = ChatCompletionAgent::new("critic", Arc::new(ollama))
        .with_instructions("You are a strict {{$field}} reviewer. Answer with JSON only.");
    let thread = Arc::new(ChatHistoryThread::new());

    let summarize = AgentTask::new("Summarize the following text in one sentence.", thread.clone(), Arc::new(agent))
        .with_arguments(KernelArguments::new().with("field", "literature"));

    let summary = summarize
        .invoke(Some("The sky appears blue because air scatters short wavelengths more than long ones."))
        .await?;
    println!("summary: {}", summary);

    // Same agent and thread, a different instruction and a typed reply.
    let mut rate = summarize.clone();
    rate.description = r#"Rate the summary you just wrote as {"score": 1-10, "reason": "..."}."#.to_string();
    let rating: Rating = rate.invoke_with::<(), _>(None).await?;
    println!("rating: {} ({})", rating.score, rating.reason);

    println!("thread {} now holds {} messages", thread.id(), thread.messages().await?.len());
    Ok(())
}
