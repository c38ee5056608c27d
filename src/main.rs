//! Oghma - D&D 5e reference bot for Discord
//!
//! Looks up spells, monsters, items and rules on the Open5e API, decorates
//! results with Scryfall art and rolls dice.

mod common;
mod config;
mod dice;
mod discord;
mod open5e;
mod scryfall;

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use config::{env::get_config_path, load_and_validate};
use discord::{CommandRunner, CommandScope, OghmaBotBuilder, OghmaHandler};
use open5e::{Open5eClient, ReqwestTransport, Transport};
use scryfall::ScryfallClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = get_config_path();
    let loaded = load_and_validate(&config_path);

    // Initialize logging
    init_logging(loaded.as_ref().ok().and_then(|c| c.log_directory()))?;

    info!("Oghma v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Loading configuration from {}...", config_path);

    let config = loaded.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        error!("See oghma.conf.example for reference.");
        e
    })?;

    let scope = match (config.is_production(), config.discord.testing_guild_id) {
        (false, Some(guild)) => CommandScope::Guild(guild),
        _ => CommandScope::Global,
    };

    info!("Configuration loaded successfully");
    info!("  Environment: {}", config.discord.environment.as_deref().unwrap_or("PRODUCTION"));
    info!("  Command scope: {:?}", scope);
    info!("  Open5e: {}", config.open5e_url());
    info!("  Scryfall: {}", if config.scryfall_enabled() { config.scryfall_url() } else { "disabled" });
    info!("  Text commands: {}", config.text_commands_enabled());

    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(config.request_timeout())?);
    let open5e = Open5eClient::new(
        transport.clone(),
        config.open5e_url(),
        config.filter_policy(),
        config.result_limit(),
    );
    let scryfall = config
        .scryfall_enabled()
        .then(|| ScryfallClient::new(transport.clone(), config.scryfall_url()));

    let runner = Arc::new(CommandRunner::new(
        open5e,
        scryfall,
        config.max_dice_value(),
        config.text_commands_enabled(),
    ));
    let handler = OghmaHandler::new(runner, scope, config.text_commands_enabled());

    let bot = OghmaBotBuilder::new(config.discord.token.clone(), handler)
        .build()
        .await?;

    info!("Starting Discord bot...");
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut discord_task = tokio::spawn(bot.run(shutdown_rx));

    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - disconnecting...");
            true
        }
        _ = &mut discord_task => false,
    };

    if shutdown {
        if let Err(e) = shutdown_tx.send(true) {
            debug!("Shutdown channel closed (Discord task already exited): {}", e);
        }
        let timeout = tokio::time::Duration::from_secs(5);
        match tokio::time::timeout(timeout, discord_task).await {
            Ok(Ok(())) => info!("Discord client stopped gracefully"),
            Ok(Err(e)) => warn!("Discord task panicked: {}", e),
            Err(_) => warn!("Discord shutdown timed out"),
        }
    }

    info!("Exiting...");
    Ok(())
}

/// Log to stdout, and to `<directory>/oghma-DD-MM-YYYY.log` when a
/// directory is configured.
fn init_logging(directory: Option<&str>) -> Result<()> {
    let file_layer = match directory {
        Some(directory) => {
            fs::create_dir_all(directory)?;
            let name = format!("oghma-{}.log", chrono::Local::now().format("%d-%m-%Y"));
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(Path::new(directory).join(name))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer())
        .with(file_layer)
        .init();
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
