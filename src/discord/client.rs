//! Discord bot client abstraction.
//!
//! Provides a high-level interface for creating and running the Discord bot,
//! hiding serenity implementation details from the rest of the application.

use std::time::Duration;

use backon::BackoffBuilder;
use serenity::http::HttpBuilder;
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::discord::handler::OghmaHandler;

/// Builder for creating the Discord bot.
pub struct OghmaBotBuilder {
    token: String,
    handler: OghmaHandler,
}

impl OghmaBotBuilder {
    pub fn new(token: String, handler: OghmaHandler) -> Self {
        Self { token, handler }
    }

    /// Build the Discord bot.
    pub async fn build(self) -> anyhow::Result<OghmaBot> {
        let client = build_client(&self.token, self.handler.clone()).await?;

        Ok(OghmaBot {
            client: Some(client),
            token: self.token,
            handler: self.handler,
        })
    }
}

fn intents(text_commands: bool) -> GatewayIntents {
    let intents = GatewayIntents::GUILDS;
    if text_commands {
        intents | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
    } else {
        intents
    }
}

async fn build_client(token: &str, handler: OghmaHandler) -> anyhow::Result<Client> {
    let intents = intents(handler.text_commands());

    // Build a custom reqwest client with timeout settings
    let reqwest_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    // Build the Serenity HTTP client with our custom reqwest client
    let http = HttpBuilder::new(token).client(reqwest_client).build();

    let client = serenity::client::ClientBuilder::new_with_http(http, intents)
        .event_handler(handler)
        .await?;
    Ok(client)
}

/// Create an exponential backoff iterator for Discord reconnection.
/// 5s initial, 5min max, factor 1.1, with jitter, unlimited retries.
fn discord_backoff() -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(5))
        .with_max_delay(Duration::from_secs(300))
        .with_factor(1.1)
        .with_jitter()
        .without_max_times()
        .build()
}

pub struct OghmaBot {
    client: Option<Client>,
    token: String,
    handler: OghmaHandler,
}

impl OghmaBot {
    /// Run until the gateway closes normally or `shutdown_rx` turns true.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        let shard_manager = self.client.as_ref().map(|c| c.shard_manager.clone());

        tokio::select! {
            _ = Self::run_connection(&mut self.client, &self.token, &self.handler) => {},
            _ = async {
                loop {
                    if shutdown_rx.changed().await.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                // Gracefully shutdown Discord gateway
                if let Some(ref manager) = shard_manager {
                    info!("Initiating graceful Discord shutdown...");
                    manager.shutdown_all().await;
                    info!("Discord shutdown complete");
                }
            } => {}
        }
        info!("Discord task ended");
    }

    async fn run_connection(client: &mut Option<Client>, token: &str, handler: &OghmaHandler) {
        let mut backoff = discord_backoff();

        loop {
            info!("Connecting to Discord...");

            let mut client = match client.take() {
                Some(client) => client,
                None => {
                    // serenity mostly handles reconnections itself.
                    match build_client(token, handler.clone()).await {
                        Ok(client) => {
                            backoff = discord_backoff();
                            client
                        }
                        Err(e) => {
                            error!("Failed to rebuild Discord client: {}", e);
                            let delay = backoff.next().unwrap_or(Duration::from_secs(300));
                            warn!("Retrying in {:.1}s...", delay.as_secs_f64());
                            sleep(delay).await;
                            continue;
                        }
                    }
                }
            };

            match client.start().await {
                Ok(()) => {
                    info!("Discord client disconnected normally");
                    break;
                }
                Err(e) => {
                    error!("Discord client error: {}", e);
                    let delay = backoff.next().unwrap_or(Duration::from_secs(300));
                    warn!(
                        "Discord disconnected. Reconnecting in {:.1}s...",
                        delay.as_secs_f64(),
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
