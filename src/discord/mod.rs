//! Discord bot integration.
//!
//! Slash and `!` commands, their embeds and the gateway client.

pub mod client;
pub mod commands;
pub mod entities;
pub mod handler;
pub mod notices;
pub mod reply;

// Re-export main types for external use
pub use client::OghmaBotBuilder;
pub use commands::CommandRunner;
pub use handler::{CommandScope, OghmaHandler};
