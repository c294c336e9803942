use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gemini_relay::client::HttpChatClient;
use gemini_relay::config::RelayConfig;
use gemini_relay::handler::{AppState, router};

#[derive(Debug, Parser)]
#[command(
    name = "gemini-relay",
    about = "Gemini-compatible gateway over OpenAI-style chat backends"
)]
struct Args {
    /// Path to a TOML config file; falls back to environment variables
    #[arg(short, long)]
    config: Option<String>,

    /// Override the listen address
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gemini_relay=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RelayConfig::from_file(path)?,
        None => RelayConfig::from_env()?,
    };
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }
    config.validate()?;

    info!("Starting gemini-relay");
    info!("  Listen: {}", config.server.listen_addr);
    info!(
        "  Upstream: {}{} ({:?} dialect)",
        config.upstream.endpoint, config.upstream.chat_path, config.upstream.dialect
    );
    info!(
        "  Tiers: {} -> {}",
        config.models.primary, config.models.fallback
    );

    let backend = Arc::new(HttpChatClient::new(config.upstream.clone())?);
    let state = Arc::new(AppState::new(backend, config.clone()));

    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
