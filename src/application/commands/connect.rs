use serenity::all::{CommandInteraction, CommandOptionType, Permissions};
use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::prelude::Context;
use std::sync::Arc;
use tracing::{error, info};

use crate::application::commands::reply;
use crate::application::commands::utils::get_string_option;
use crate::domain::entities::Channel;
use crate::domain::repositories::ChannelRepository;

pub fn register_connect_command() -> CreateCommand {
    CreateCommand::new("connect")
        .description("Connect a channel so removals apply to it")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .add_option(
            // Ids exceed Discord's integer option range, so they travel as text.
            CreateCommandOption::new(CommandOptionType::String, "channel_id", "Channel id")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "name", "Display name")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "invite_link", "Join link")
                .required(true),
        )
}

pub fn register_disconnect_command() -> CreateCommand {
    CreateCommand::new("disconnect")
        .description("Disconnect a channel from the bot")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "channel_id", "Channel id")
                .required(true),
        )
}

pub async fn run_connect(
    ctx: &Context,
    command: &CommandInteraction,
    channels: &Arc<dyn ChannelRepository>,
) {
    let options = &command.data.options;
    let (id, name, invite_link) = match (
        get_string_option(options, 0).and_then(|s| s.parse::<u64>().ok()),
        get_string_option(options, 1),
        get_string_option(options, 2),
    ) {
        (Some(id), Some(name), Some(link)) => (id, name, link),
        _ => {
            reply(ctx, command, "Expected a numeric channel id, a name and an invite link.").await;
            return;
        }
    };

    let known = channels.exists(id).await;
    match channels.upsert(Channel::new(id, name.clone(), invite_link)).await {
        Ok(()) => {
            info!("channel {} ({}) connected", id, name);
            let verb = if known { "updated" } else { "connected" };
            reply(ctx, command, &format!("Channel **{}** {}.", name, verb)).await;
        }
        Err(e) => {
            error!("failed to connect channel {}: {}", id, e);
            reply(ctx, command, "Could not store the channel, please try again.").await;
        }
    }
}

pub async fn run_disconnect(
    ctx: &Context,
    command: &CommandInteraction,
    channels: &Arc<dyn ChannelRepository>,
) {
    let id = match get_string_option(&command.data.options, 0).and_then(|s| s.parse::<u64>().ok())
    {
        Some(id) => id,
        None => {
            reply(ctx, command, "Expected a numeric channel id.").await;
            return;
        }
    };

    if channels.delete(id).await {
        info!("channel {} disconnected", id);
        reply(ctx, command, &format!("Channel {} disconnected.", id)).await;
    } else {
        reply(ctx, command, &format!("Channel {} is not connected.", id)).await;
    }
}
