//! Discord event handling.
//!
//! Registers the slash commands once connected and dispatches slash
//! commands and `!` messages to the [`CommandRunner`]. Serenity runs every
//! event in its own task, so commands never wait on each other.

use std::sync::Arc;

use serenity::all::{
    Command, CommandInteraction, CreateInteractionResponseFollowup, CreateMessage, GuildId,
    Interaction,
};
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, error, info, warn};

use crate::common::error::DiscordError;
use crate::discord::commands::{definitions, CommandRunner, OghmaCommand, Requester};
use crate::discord::reply::{Reply, TextFile};

/// Where slash commands are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    /// Every guild the bot is in.
    Global,
    /// A single testing guild, for non-production deployments.
    Guild(u64),
}

/// Discord event handler.
#[derive(Clone)]
pub struct OghmaHandler {
    runner: Arc<CommandRunner>,
    scope: CommandScope,
    text_commands: bool,
}

impl OghmaHandler {
    pub fn new(runner: Arc<CommandRunner>, scope: CommandScope, text_commands: bool) -> Self {
        Self {
            runner,
            scope,
            text_commands,
        }
    }

    pub fn text_commands(&self) -> bool {
        self.text_commands
    }

    async fn register_commands(&self, ctx: &Context) -> Result<usize, DiscordError> {
        let registered = match self.scope {
            CommandScope::Global => Command::set_global_commands(&ctx.http, definitions()).await?,
            CommandScope::Guild(id) => {
                info!("Non-production environment detected. Syncing with testing guild {}...", id);
                GuildId::new(id)
                    .set_commands(&ctx.http, definitions())
                    .await
                    .map_err(|e| DiscordError::RegistrationFailed {
                        message: format!("guild {}: {}", id, e),
                    })?
            }
        };
        Ok(registered.len())
    }

    async fn handle_slash(&self, ctx: &Context, interaction: &CommandInteraction) {
        let command = OghmaCommand::from_slash(&interaction.data.name, |key| {
            interaction
                .data
                .options
                .iter()
                .find(|option| option.name == key)
                .and_then(|option| option.value.as_str())
                .map(str::to_string)
        });
        let Some(command) = command else {
            warn!("Unknown slash command: {}", interaction.data.name);
            return;
        };

        if let Err(e) = interaction.defer(&ctx.http).await {
            error!("Failed to defer /{}: {}", interaction.data.name, e);
            return;
        }

        let requester = Requester {
            name: interaction.user.name.clone(),
            avatar_url: Some(interaction.user.face()),
        };
        let replies = self.runner.execute(&command, &requester).await;

        for reply in replies {
            if let Err(e) = send_followup(ctx, interaction, reply).await {
                error!("Failed to answer {}: {}", command.describe(), e);
            }
        }
    }

    async fn handle_text(&self, ctx: &Context, msg: &Message, command: OghmaCommand) {
        if let Err(e) = msg.channel_id.broadcast_typing(&ctx.http).await {
            debug!("Failed to send typing indicator: {}", e);
        }

        let requester = Requester {
            name: msg.author.name.clone(),
            avatar_url: Some(msg.author.face()),
        };
        let replies = self.runner.execute(&command, &requester).await;

        for reply in replies {
            if let Err(e) = send_message(ctx, msg, reply).await {
                error!("Failed to answer {}: {}", command.describe(), e);
            }
        }
    }
}

#[async_trait]
impl EventHandler for OghmaHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Logged in as {} ({})", ready.user.name, ready.user.id);

        match self.register_commands(&ctx).await {
            Ok(count) => info!("Registered {} commands ({:?})", count, self.scope),
            Err(e) => error!("Failed to register commands: {}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.handle_slash(&ctx, &command).await;
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if !self.text_commands || msg.author.bot {
            return;
        }

        let content = msg.content.trim();
        if !content.starts_with('!') {
            return;
        }

        match OghmaCommand::parse_text(content) {
            Some(command) => self.handle_text(&ctx, &msg, command).await,
            None => debug!("Ignoring unknown text command: {}", content),
        }
    }
}

async fn send_followup(
    ctx: &Context,
    interaction: &CommandInteraction,
    reply: Reply,
) -> Result<(), DiscordError> {
    for (card, files) in reply.into_messages() {
        let mut followup = CreateInteractionResponseFollowup::new()
            .add_files(files.iter().map(TextFile::to_attachment));
        if let Some(card) = card {
            followup = followup.embed(card.to_embed());
        }
        log_files(&files);

        interaction
            .create_followup(&ctx.http, followup)
            .await
            .map_err(|e| DiscordError::SendFailed {
                message: e.to_string(),
            })?;
    }
    Ok(())
}

async fn send_message(ctx: &Context, msg: &Message, reply: Reply) -> Result<(), DiscordError> {
    for (card, files) in reply.into_messages() {
        let mut message = CreateMessage::new().add_files(files.iter().map(TextFile::to_attachment));
        if let Some(card) = card {
            message = message.embed(card.to_embed());
        }
        log_files(&files);

        msg.channel_id
            .send_message(&ctx.http, message)
            .await
            .map_err(|e| DiscordError::SendFailed {
                message: e.to_string(),
            })?;
    }
    Ok(())
}

fn log_files(files: &[TextFile]) {
    if !files.is_empty() {
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        info!("Sending files - {:?}", names);
    }
}
