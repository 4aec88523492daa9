use serenity::all::CommandInteraction;
use serenity::builder::CreateCommand;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::application::commands::reply;
use crate::domain::repositories::ChannelRepository;

pub fn register_channels_command() -> CreateCommand {
    CreateCommand::new("channels").description("List the connected channels")
}

pub async fn run_channels(
    ctx: &Context,
    command: &CommandInteraction,
    channels: &Arc<dyn ChannelRepository>,
) {
    let all = channels.list_all().await;

    if all.is_empty() {
        reply(ctx, command, "No channels are connected.").await;
        return;
    }

    let mut lines = vec![format!("{} connected channel(s):", all.len())];
    for channel in all {
        lines.push(format!(
            "• **{}** (`{}`): {}",
            channel.name, channel.id, channel.invite_link
        ));
    }

    reply(ctx, command, &lines.join("\n")).await;
}
