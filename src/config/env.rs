//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `OGHMA_DISCORD_TOKEN` - Discord bot token
//! - `OGHMA_ENVIRONMENT` - `PRODUCTION` or anything else for testing
//! - `OGHMA_TESTING_GUILD_ID` - Guild that receives commands outside production
//! - `OGHMA_OPEN5E_URL` - Open5e API root

use std::env;

use crate::config::types::{Config, Open5eConfig};

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "OGHMA";

/// Apply environment variable overrides to a config.
///
/// This allows the bot token to be provided via the environment instead
/// of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_DISCORD_TOKEN", ENV_PREFIX)) {
        config.discord.token = token;
    }

    if let Ok(environment) = env::var(format!("{}_ENVIRONMENT", ENV_PREFIX)) {
        config.discord.environment = Some(environment);
    }

    if let Ok(guild_id) = env::var(format!("{}_TESTING_GUILD_ID", ENV_PREFIX)) {
        if let Ok(id) = guild_id.parse() {
            config.discord.testing_guild_id = Some(id);
        }
    }

    if let Ok(url) = env::var(format!("{}_OPEN5E_URL", ENV_PREFIX)) {
        config
            .open5e
            .get_or_insert_with(|| Open5eConfig {
                base_url: None,
                result_limit: None,
                search_param_categories: None,
                timeout_secs: None,
            })
            .base_url = Some(url);
    }

    config
}

/// Check if any required environment variables are set but empty.
///
/// Returns a list of variable names that are set but empty.
pub fn check_empty_env_vars() -> Vec<String> {
    let vars = [format!("{}_DISCORD_TOKEN", ENV_PREFIX)];

    vars.into_iter()
        .filter(|var| env::var(var).map(|v| v.is_empty()).unwrap_or(false))
        .collect()
}

/// Get the config file path from environment or use default.
///
/// Checks `OGHMA_CONFIG` environment variable, otherwise returns "oghma.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "oghma.conf".to_string())
}
