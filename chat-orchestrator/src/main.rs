/// Chat service binary
///
/// Interactive console session against the perfume catalog. One
/// orchestrator instance per process; input is serialized by the
/// read-eval loop, so only one message is ever in flight.

use anyhow::Context;
use chat_orchestrator::{AssistantPolicy, GeminiClient, Orchestrator};
use scent_catalog::{Catalog, Matcher};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chat_orchestrator=info".parse().unwrap()),
        )
        .init();

    info!("Starting perfume chat service");

    // Load catalog
    let catalog = Arc::new(load_catalog().context("failed to load catalog")?);

    info!("Catalog ready: {} items", catalog.len());

    // Load behavioral policy (swappable via POLICY_PATH)
    let policy = match std::env::var("POLICY_PATH") {
        Ok(path) => AssistantPolicy::from_file(&path)
            .with_context(|| format!("failed to load policy from {path}"))?,
        Err(_) => AssistantPolicy::default(),
    };

    let model = GeminiClient::from_env();
    let matcher = Matcher::new(catalog);
    let mut session = Orchestrator::new(Box::new(model), matcher, policy);

    info!("Chat service ready (type /reset to clear, /quit to exit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await.ok();
        stdout.flush().await.ok();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" => break,
            "/reset" => {
                session.reset();
                println!("(conversation cleared)");
                continue;
            }
            _ => {}
        }

        let reply = session.process_message(input).await;

        println!("{}", reply.text);
        for item in &reply.items {
            println!(
                "  - {} by {} ({}, ${:.0})",
                item.name, item.brand, item.scent_type, item.price
            );
        }
    }

    info!("Shutting down chat service");
    Ok(())
}

/// Load the catalog from CATALOG_PATH, falling back to the embedded data
fn load_catalog() -> Result<Catalog, scent_catalog::CatalogError> {
    match std::env::var("CATALOG_PATH") {
        Ok(path) => {
            info!("Loading catalog from {}", path);
            Catalog::from_file(path)
        }
        Err(_) => Catalog::builtin(),
    }
}
