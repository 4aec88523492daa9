pub mod channels;
pub mod connect;
pub mod remove_user;
pub mod start;
pub mod stats;
pub mod utils;

pub use channels::{register_channels_command, run_channels};
pub use connect::{
    register_connect_command, register_disconnect_command, run_connect, run_disconnect,
};
pub use remove_user::{register_remove_user_command, run_remove_user};
pub use start::{register_start_command, run_start};
pub use stats::{register_stats_command, run_stats};

use serenity::all::CommandInteraction;
use serenity::builder::{CreateInteractionResponse, CreateInteractionResponseMessage};
use serenity::prelude::Context;
use tracing::error;

/// Answer a slash command with a plain text message.
pub(crate) async fn reply(ctx: &Context, command: &CommandInteraction, text: &str) {
    let builder = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::default().content(text),
    );

    if let Err(e) = command.create_response(&ctx.http, builder).await {
        error!("failed to respond to /{}: {}", command.data.name, e);
    }
}
