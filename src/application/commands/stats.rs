use serenity::all::CommandInteraction;
use serenity::builder::CreateCommand;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::application::commands::reply;
use crate::domain::repositories::{ChannelRepository, TaskRepository, UserRepository};

pub fn register_stats_command() -> CreateCommand {
    CreateCommand::new("stats").description("Show bot statistics")
}

pub async fn run_stats(
    ctx: &Context,
    command: &CommandInteraction,
    users: &Arc<dyn UserRepository>,
    channels: &Arc<dyn ChannelRepository>,
    tasks: &Arc<dyn TaskRepository>,
) {
    let yours = tasks.list_by_user(command.user.id.get()).await.len();

    let text = format!(
        "Users: {}\nChannels: {}\nRemoval tasks: {} ({} pending, {} targeting you)",
        users.count().await,
        channels.count().await,
        tasks.count().await,
        tasks.count_pending().await,
        yours,
    );

    reply(ctx, command, &text).await;
}
