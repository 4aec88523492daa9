use anyhow::Context as AnyhowContext;
use serenity::model::{application::Interaction, gateway::Ready, id::GuildId};
use serenity::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use crate::application::commands::{
    register_channels_command, register_connect_command, register_disconnect_command,
    register_remove_user_command, register_start_command, register_stats_command, run_channels,
    run_connect, run_disconnect, run_remove_user, run_start, run_stats,
};
use crate::application::services::{BulkRemovalExecutor, RemovalScheduler};
use crate::application::transport::NotificationSink;
use crate::domain::repositories::{ChannelRepository, TaskRepository, UserRepository};
use crate::infrastructure::discord_bot::transport::{DiscordNotifier, DiscordTransport};
use crate::infrastructure::repositories::{
    SqliteChannelRepository, SqliteTaskRepository, SqliteUserRepository,
};

pub struct CommandHandler {
    pub users: Arc<dyn UserRepository>,
    pub channels: Arc<dyn ChannelRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub scheduler: Arc<RemovalScheduler>,
    resumed: AtomicBool,
}

#[serenity::async_trait]
impl EventHandler for CommandHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("bot ready as {}", ready.user.name);

        for guild_status in ready.guilds {
            let guild_id: GuildId = guild_status.id;

            for builder in [
                register_start_command(),
                register_remove_user_command(),
                register_connect_command(),
                register_disconnect_command(),
                register_channels_command(),
                register_stats_command(),
            ] {
                if let Err(e) = guild_id.create_command(&ctx.http, builder).await {
                    warn!("failed to register a command for guild {}: {}", guild_id, e);
                }
            }

            info!("commands registered for guild {}", guild_id.get());
        }

        // ready fires again on reconnect; only the first one re-arms waiters.
        if !self.resumed.swap(true, Ordering::SeqCst) {
            let handles = self.scheduler.resume_pending().await;
            if !handles.is_empty() {
                info!("resumed {} pending removal task(s)", handles.len());
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Some(command) = interaction.command() {
            info!("received command interaction: {}", command.data.name);
            match command.data.name.as_str() {
                "start" => run_start(&ctx, &command, &self.users).await,
                "remove_user" => run_remove_user(&ctx, &command, &self.scheduler).await,
                "connect" => run_connect(&ctx, &command, &self.channels).await,
                "disconnect" => run_disconnect(&ctx, &command, &self.channels).await,
                "channels" => run_channels(&ctx, &command, &self.channels).await,
                "stats" => {
                    run_stats(&ctx, &command, &self.users, &self.channels, &self.tasks).await
                }
                other => warn!("command not recognized: {}", other),
            }
        }
    }
}

pub async fn run_bot() -> anyhow::Result<()> {
    let token =
        std::env::var("DISCORD_TOKEN").context("DISCORD_TOKEN must be set in the environment")?;
    let db_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "warden.db".to_string());

    let users: Arc<dyn UserRepository> = Arc::new(
        SqliteUserRepository::new(&db_path).map_err(anyhow::Error::msg)?,
    );
    let channels: Arc<dyn ChannelRepository> = Arc::new(
        SqliteChannelRepository::new(&db_path).map_err(anyhow::Error::msg)?,
    );
    let tasks: Arc<dyn TaskRepository> = Arc::new(
        SqliteTaskRepository::new(&db_path).map_err(anyhow::Error::msg)?,
    );

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;

    let http = Arc::new(serenity::http::Http::new(&token));
    let sink: Arc<dyn NotificationSink> = Arc::new(DiscordNotifier::new(http.clone()));
    let executor = Arc::new(BulkRemovalExecutor::new(
        tasks.clone(),
        Arc::new(DiscordTransport::new(http)),
        sink.clone(),
    ));
    let scheduler = Arc::new(RemovalScheduler::new(
        tasks.clone(),
        channels.clone(),
        executor,
        sink,
    ));

    let handler = CommandHandler {
        users,
        channels,
        tasks,
        scheduler,
        resumed: AtomicBool::new(false),
    };

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await?;

    client.start().await?;
    Ok(())
}
