//! StockMate server binary
//!
//! Run with: cargo run -p stockmate --bin stockmate-server
//! Point `STOCKMATE_CONFIG` at a TOML file to override defaults.

use stockmate::{config::StockmateConfig, server::StockmateServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockmate=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                        StockMate                          ║
║       Inventory Q&A over your database and policies       ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config = StockmateConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Vector index: {}", config.retrieval.index_path.display());
    tracing::info!("  - Completion model: {}", config.completion.model);
    tracing::info!("  - Database backend: {:?}", config.database.backend);
    tracing::info!("  - Feedback log: {}", config.feedback.log_path.display());

    if config.completion.api_key.is_none() {
        tracing::warn!("No API key found; export TOGETHER_API_KEY before asking questions");
    }

    let server = StockmateServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/sessions                          - Start a session");
    println!("  POST /api/sessions/:id/chat                 - Ask a question");
    println!("  POST /api/sessions/:id/turns/:index/feedback - Rate an answer");
    println!("  GET  /api/feedback/export                   - Download feedback (XLSX)");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
