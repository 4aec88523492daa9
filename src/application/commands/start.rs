use serenity::all::CommandInteraction;
use serenity::builder::CreateCommand;
use serenity::prelude::Context;
use std::sync::Arc;
use tracing::error;

use crate::application::commands::reply;
use crate::domain::entities::User;
use crate::domain::repositories::UserRepository;

pub fn register_start_command() -> CreateCommand {
    CreateCommand::new("start").description("Register yourself with the bot")
}

pub async fn run_start(
    ctx: &Context,
    command: &CommandInteraction,
    users: &Arc<dyn UserRepository>,
) {
    let invoker = &command.user;
    let added = users
        .add(User::new(invoker.id.get(), invoker.name.clone()))
        .await;
    let total = users.count().await;

    let text = match added {
        Ok(true) => format!(
            "Hello {}! You are now registered. Total users: {}",
            invoker.name, total
        ),
        Ok(false) => format!(
            "Welcome back {}! You were already registered. Total users: {}",
            invoker.name, total
        ),
        Err(e) => {
            error!("failed to register user {}: {}", invoker.id, e);
            "Registration failed, please try again later.".to_string()
        }
    };

    reply(ctx, command, &text).await;
}
