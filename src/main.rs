use std::sync::Arc;

use clap::Parser;

use ecocollect_api::database::{MemoryStore, PgStore, Store};
use ecocollect_api::{app, AppState};

#[derive(Debug, Parser)]
#[command(name = "ecocollect-api", version, about = "Waste pickup and donation management REST API")]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on (falls back to PORT env, then 3000)
    #[arg(long)]
    port: Option<u16>,

    /// Run against the in-memory store instead of Postgres
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    let config = ecocollect_api::config::config();
    tracing::info!("Starting EcoCollect API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = if cli.memory {
        tracing::warn!("using in-memory store; data will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(PgStore::connect().await?)
    };

    let app = app(AppState::new(store));

    let port = cli
        .port
        .or_else(|| std::env::var("PORT").ok().and_then(|s| s.parse().ok()))
        .unwrap_or(3000);
    let bind_addr = format!("{}:{}", cli.bind, port);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("EcoCollect API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
