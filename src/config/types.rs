//! Configuration type definitions.

use std::time::Duration;

use serde::Deserialize;

use crate::dice::DEFAULT_MAX_VALUE;
use crate::open5e::filter::DEFAULT_SEARCH_CATEGORIES;
use crate::open5e::{FilterPolicy, DEFAULT_RESULT_LIMIT};
use crate::scryfall::DEFAULT_SCRYFALL_URL;

/// Default Open5e API root.
pub const DEFAULT_OPEN5E_URL: &str = "https://api.open5e.com/";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    pub open5e: Option<Open5eConfig>,
    pub scryfall: Option<ScryfallConfig>,
    pub dice: Option<DiceConfig>,
    pub logging: Option<LoggingConfig>,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    /// `PRODUCTION` registers commands globally, anything else registers
    /// them to the testing guild only.
    pub environment: Option<String>,
    pub testing_guild_id: Option<u64>,
    /// Also accept `!command` text messages.
    pub enable_text_commands: Option<bool>,
}

/// Open5e API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Open5eConfig {
    pub base_url: Option<String>,
    pub result_limit: Option<u32>,
    /// Categories filtered with `search` instead of `text`.
    pub search_param_categories: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

/// Scryfall thumbnail lookup settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ScryfallConfig {
    pub enabled: Option<bool>,
    pub base_url: Option<String>,
}

/// `/roll` limits.
#[derive(Debug, Clone, Deserialize)]
pub struct DiceConfig {
    pub max_value: Option<u32>,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Directory for daily log files. Stdout only when unset.
    pub directory: Option<String>,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.discord
            .environment
            .as_deref()
            .map_or(true, |env| env.eq_ignore_ascii_case("production"))
    }

    pub fn text_commands_enabled(&self) -> bool {
        self.discord.enable_text_commands.unwrap_or(true)
    }

    pub fn open5e_url(&self) -> &str {
        self.open5e
            .as_ref()
            .and_then(|o| o.base_url.as_deref())
            .unwrap_or(DEFAULT_OPEN5E_URL)
    }

    pub fn result_limit(&self) -> u32 {
        self.open5e
            .as_ref()
            .and_then(|o| o.result_limit)
            .unwrap_or(DEFAULT_RESULT_LIMIT)
    }

    pub fn filter_policy(&self) -> FilterPolicy {
        match self.open5e.as_ref().and_then(|o| o.search_param_categories.as_ref()) {
            Some(categories) => FilterPolicy::new(categories.iter().cloned()),
            None => FilterPolicy::new(DEFAULT_SEARCH_CATEGORIES.iter().copied()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.open5e.as_ref().and_then(|o| o.timeout_secs).unwrap_or(30))
    }

    pub fn scryfall_enabled(&self) -> bool {
        self.scryfall.as_ref().and_then(|s| s.enabled).unwrap_or(true)
    }

    pub fn scryfall_url(&self) -> &str {
        self.scryfall
            .as_ref()
            .and_then(|s| s.base_url.as_deref())
            .unwrap_or(DEFAULT_SCRYFALL_URL)
    }

    pub fn max_dice_value(&self) -> u32 {
        self.dice
            .as_ref()
            .and_then(|d| d.max_value)
            .unwrap_or(DEFAULT_MAX_VALUE)
    }

    pub fn log_directory(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.directory.as_deref())
    }
}
