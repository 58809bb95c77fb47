use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use doc_gateway::config::{self, AppConfig};
use doc_gateway::database::DatabaseManager;
use doc_gateway::middleware::GatewayContext;

#[derive(Parser, Debug)]
#[command(name = "doc-gateway")]
#[command(about = "Schema-less REST gateway over a document store")]
#[command(version)]
struct Args {
    #[arg(long, env = "API_PORT", help = "Port to listen on")]
    port: Option<u16>,

    #[arg(long, env = "DATABASE_URL", help = "mongodb:// connection string, or memory:// for an in-process store")]
    database_url: Option<String>,

    #[arg(long, env = "DATABASE_NAME", help = "Database holding the collections")]
    database_name: Option<String>,
}

impl Args {
    fn apply(self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.api.port = port;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if let Some(name) = self.database_name {
            config.database.name = name;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, APP_ENV, etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = config::config().clone();
    args.apply(&mut config);

    tracing::info!("Starting doc-gateway in {:?} mode", config.environment);

    // Connect once; every request shares this handle
    let store = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to document store")?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("doc-gateway listening on http://{}", bind_addr);

    let app = doc_gateway::app(GatewayContext::new(store, config));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
