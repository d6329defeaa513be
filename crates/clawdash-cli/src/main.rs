//! `clawdash`: terminal front end for the agent dashboard.

mod chat;
mod config;

use clap::{Parser, Subcommand};
use clawdash_chat::ChatSession;
use clawdash_dashboard::{MemoryClient, MemoryRecord, StatusProbe};
use config::ClawdashConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clawdash", about = "Dashboard client for the agent gateway")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "clawdash.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent; without MESSAGE, read messages from stdin
    Chat {
        /// Send a single message and exit
        message: Option<String>,
    },
    /// Show gateway and service status
    Health,
    /// Browse and manage stored memories
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
    /// Print the resolved configuration
    Settings,
}

#[derive(Subcommand)]
enum MemoryAction {
    /// List a user's memories
    List {
        user_id: String,
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Search a user's memories
    Search {
        user_id: String,
        query: String,
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Delete one memory
    Delete { memory_id: String },
    /// Delete every memory of a user
    Purge { user_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = ClawdashConfig::load(&cli.config).await?;
    config.apply_env(|key| std::env::var(key).ok());

    match cli.command {
        Commands::Chat { message } => {
            let session = ChatSession::from_config(config.gateway)?;
            info!(session_id = %session.id(), "Chat session started");
            match message {
                Some(message) => {
                    let mut updates = session.subscribe();
                    chat::run_turn(&session, &mut updates, &message).await?;
                }
                None => chat::repl(&session).await?,
            }
        }
        Commands::Health => {
            let probe = StatusProbe::new(config.gateway)?;
            println!("Gateway health: {}", probe.gateway_health().await);
            for report in probe.service_reports().await {
                println!("  {:<18} {:<9} {}", report.name, report.status, report.url);
                if let Some(note) = report.note {
                    println!("  {:<18} {:<9} {}", "", "", note);
                }
            }
        }
        Commands::Memory { action } => {
            let client = MemoryClient::new(config.memory)?;
            match action {
                MemoryAction::List { user_id, limit } => {
                    print_memories(&client.list(&user_id, limit).await?);
                }
                MemoryAction::Search {
                    user_id,
                    query,
                    limit,
                } => {
                    print_memories(&client.search(&user_id, &query, limit).await?);
                }
                MemoryAction::Delete { memory_id } => {
                    client.delete(&memory_id).await?;
                    println!("Deleted memory {memory_id}");
                }
                MemoryAction::Purge { user_id } => {
                    client.delete_all(&user_id).await?;
                    println!("Deleted all memories for user \"{user_id}\"");
                }
            }
        }
        Commands::Settings => {
            let gateway = &config.gateway;
            println!("Gateway URL:    {}", gateway.base_url);
            println!("Gateway token:  {}", gateway.masked_token());
            println!("Agent ID:       {}", gateway.agent_id);
            println!("Model:          {}", gateway.model_name());
            println!("User tag:       {}", gateway.user_tag);
            println!("Timeout:        {}s", gateway.timeout_secs);
            println!("Memory URL:     {}", config.memory.base_url);
            println!(
                "Memory limits:  list {}, search {}",
                config.memory.default_limit, config.memory.search_limit
            );
        }
    }

    Ok(())
}

fn print_memories(memories: &[MemoryRecord]) {
    if memories.is_empty() {
        println!("No memories found.");
        return;
    }
    for memory in memories {
        println!("{}  {}", memory.id, memory.memory);
        if let Some(created) = &memory.created_at {
            println!("    created {created}");
        }
        if let Some(score) = memory.metadata.get("score").and_then(serde_json::Value::as_f64) {
            println!("    score {score:.3}");
        }
    }
    println!("\nTotal: {} memor{}", memories.len(), if memories.len() == 1 { "y" } else { "ies" });
}
