//! Warden - per-guild Discord mention-guard and message-forwarding bot.
//!
//! Watches guild messages, deletes messages that ping protected
//! usernames, and republishes configured users' messages from monitored
//! channels into a target channel with attribution and a permalink.

mod common;
mod config;
mod discord;
mod forward;
mod guard;
mod routing;
mod settings;

use anyhow::Result;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Warden v{} starting...", env!("CARGO_PKG_VERSION"));

    let token = config::get_discord_token().ok_or_else(|| {
        error!("No Discord token found.");
        error!("Set WARDEN_DISCORD_TOKEN (or DISCORD_TOKEN) in the environment.");
        anyhow::anyhow!("missing Discord token")
    })?;

    let settings_dir = config::get_settings_dir();
    info!("Settings directory: {}", settings_dir.display());

    let mut client = discord::build_client(token, settings_dir).await?;
    let shard_manager = client.shard_manager.clone();

    info!("Starting Discord client...");
    tokio::select! {
        result = client.start() => {
            if let Err(e) = result {
                error!("Discord client error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received - disconnecting...");
            shard_manager.shutdown_all().await;
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
