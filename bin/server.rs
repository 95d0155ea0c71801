// Bakery Pricing - Web Server
// REST API with Axum over the configured pantry store

use anyhow::{Context, Result};
use bakery_pricing::api::{router, ApiState};
use bakery_pricing::{logging, open_store, AppConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bakery-server", version, about = "HTTP API for the bakery pricing calculator")]
struct Cli {
    /// Configuration file (defaults to ./bakery.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides server.bind
    #[arg(long)]
    bind: Option<String>,
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    logging::init_stderr(&config.log);

    println!("🌐 Bakery Pricing - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = open_store(config.store.kind, &config.store.path);
    println!("✓ Pantry store: {}", store.describe());

    // Report a broken store up front; every request loads it again anyway
    match store.load() {
        Ok(catalog) => println!("✓ {} ingredients in the pantry", catalog.len()),
        Err(err) => eprintln!("⚠️  {}", err),
    }

    let app = router(ApiState::new(store, config.pricing));

    let addr = cli.bind.unwrap_or(config.server.bind);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;

    tracing::info!(%addr, "server listening");
    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/catalog", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
