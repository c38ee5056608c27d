//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use reqwest::Url;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Discord
    if config.discord.token.is_empty() {
        errors.push("discord.token is required".to_string());
    }
    if config.discord.token == "YOUR_DISCORD_TOKEN_HERE" {
        errors.push("discord.token has not been configured (still using placeholder)".to_string());
    }
    if !config.is_production() && config.discord.testing_guild_id.is_none() {
        errors.push(format!(
            "discord.testing_guild_id is required outside production (environment is '{}')",
            config.discord.environment.as_deref().unwrap_or_default()
        ));
    }

    // Remote APIs
    if let Err(e) = Url::parse(config.open5e_url()) {
        errors.push(format!("open5e.base_url '{}' is not a valid URL: {}", config.open5e_url(), e));
    }
    if config.result_limit() == 0 {
        errors.push("open5e.result_limit must be non-zero".to_string());
    }
    if config.request_timeout().is_zero() {
        errors.push("open5e.timeout_secs must be non-zero".to_string());
    }
    if let Some(categories) = config
        .open5e
        .as_ref()
        .and_then(|o| o.search_param_categories.as_ref())
    {
        for (i, category) in categories.iter().enumerate() {
            if category.trim().is_empty() {
                errors.push(format!("open5e.search_param_categories[{}] is empty", i));
            }
        }
    }
    if config.scryfall_enabled() {
        if let Err(e) = Url::parse(config.scryfall_url()) {
            errors.push(format!("scryfall.base_url '{}' is not a valid URL: {}", config.scryfall_url(), e));
        }
    }

    // Dice
    if config.max_dice_value() < 3 {
        errors.push(format!(
            "dice.max_value must be at least 3 (got {})",
            config.max_dice_value()
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}
