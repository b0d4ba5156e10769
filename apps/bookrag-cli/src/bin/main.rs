use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bookrag_core::config::Settings;
use bookrag_core::types::AnswerResponse;
use bookrag_retrieval::{AnswerComposer, Retriever};

const DEMO_QUERIES: [&str; 5] = [
    "What is ROS2?",
    "Explain humanoid design principles",
    "How does VLA work?",
    "What are simulation techniques?",
    "Explain AI control systems",
];

#[derive(Parser)]
#[command(name = "bookrag", about = "Ask questions against the robotics textbook")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question from the top-ranked passage
    Ask {
        query: String,
        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print ranked passages as JSON
    Retrieve {
        query: String,
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// Run the sample questions
    Demo,
    /// List every chunk stored in the vector collection
    Dump,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter)))
        .with_target(false)
        .init();

    let retriever = Retriever::from_settings(&settings).context("failed to initialize retriever")?;
    match cli.command {
        Command::Ask { query, json } => {
            let response = AnswerComposer::new(retriever).compose(&query);
            if json { println!("{}", serde_json::to_string_pretty(&response)?); } else { print_answer(&response); }
        }
        Command::Retrieve { query, top_k, threshold } => {
            let defaults = retriever.settings();
            let result = retriever.retrieve(&query, top_k.unwrap_or(defaults.default_top_k), threshold.unwrap_or(defaults.default_threshold));
            println!("{}", result.to_json_pretty()?);
        }
        Command::Demo => run_demo(AnswerComposer::new(retriever)),
        Command::Dump => dump(&retriever)?,
    }
    Ok(())
}

fn run_demo(composer: AnswerComposer) {
    println!("📖 bookrag demo\n==============");
    if !composer.retriever().backend_available() { println!("(vector store unreachable: answering from the built-in sample corpus)"); }
    for (i, query) in DEMO_QUERIES.iter().enumerate() {
        println!("\nQuery {}: {}\n{}", i + 1, query, "-".repeat(30));
        print_answer(&composer.compose(query));
    }
}

fn print_answer(response: &AnswerResponse) {
    println!("Answer: {}", response.answer);
    if !response.sources.is_empty() {
        println!("Sources: {} documents", response.sources.len());
        for source in response.sources.iter().take(3) { println!("  - {}", source); }
    }
    if !response.matched_chunks.is_empty() {
        println!("Matched chunks: {}", response.matched_chunks.len());
        for (j, chunk) in response.matched_chunks.iter().take(2).enumerate() {
            println!("  Chunk {}: {}", j + 1, truncate(&chunk.content, 100));
            println!("    Source: {}", chunk.url);
            println!("    Score: {:.3}", chunk.similarity_score);
        }
    }
    println!("Query time: {:.2}ms", response.query_time_ms);
    println!("Confidence: {}", response.confidence);
    if let Some(error) = &response.error { println!("Error: {}", error); }
}

fn dump(retriever: &Retriever) -> anyhow::Result<()> {
    let chunks = retriever.stored_chunks().with_context(|| format!("cannot list collection '{}'", retriever.collection_name()))?;
    println!("📦 Stored chunks in '{}': {}\n{}", retriever.collection_name(), chunks.len(), "-".repeat(50));
    for (i, chunk) in chunks.iter().enumerate() {
        println!("Chunk {}:", i + 1);
        println!("  ID: {}", chunk.chunk_id);
        println!("  URL: {}", if chunk.url.is_empty() { "N/A" } else { &chunk.url });
        println!("  Position: {}", chunk.position);
        println!("  Content Preview: {}", truncate(&chunk.content, 200));
        println!("  Created At: {}", if chunk.created_at.is_empty() { "N/A" } else { &chunk.created_at });
        println!("{}", "-".repeat(30));
    }
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars { format!("{}...", text.chars().take(max_chars).collect::<String>()) } else { text.to_string() }
}
