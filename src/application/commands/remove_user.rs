use serenity::all::{CommandInteraction, CommandOptionType, Permissions};
use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::prelude::Context;
use std::sync::Arc;
use tracing::error;

use crate::application::commands::reply;
use crate::application::commands::utils::{
    get_integer_option, get_string_option, get_user_option,
};
use crate::application::services::{RemovalScheduler, ScheduleError};

pub fn register_remove_user_command() -> CreateCommand {
    CreateCommand::new("remove_user")
        .description("Schedule removal of a user from every connected channel")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .add_option(
            CreateCommandOption::new(CommandOptionType::User, "user", "User to remove")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "duration", "Delay amount")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "unit",
                "seconds, minutes, hours or days",
            )
            .required(true),
        )
}

pub async fn run_remove_user(
    ctx: &Context,
    command: &CommandInteraction,
    scheduler: &Arc<RemovalScheduler>,
) {
    let options = &command.data.options;
    let (target, duration, unit) = match (
        get_user_option(options, 0),
        get_integer_option(options, 1),
        get_string_option(options, 2),
    ) {
        (Some(t), Some(d), Some(u)) => (t, d, u),
        _ => {
            reply(ctx, command, "Missing or malformed command options.").await;
            return;
        }
    };

    let notify_chat_id = command.channel_id.get();

    match scheduler
        .schedule(target, duration, &unit, notify_chat_id)
        .await
    {
        Ok(handle) => {
            reply(
                ctx,
                command,
                &format!(
                    "Removal of <@{}> scheduled (task #{}), fires at {}.",
                    target,
                    handle.task_id,
                    handle.fire_time.format("%Y-%m-%d %H:%M:%S UTC")
                ),
            )
            .await;
        }
        Err(e @ (ScheduleError::InvalidRequest(_) | ScheduleError::NoTargets)) => {
            reply(ctx, command, &format!("{}", e)).await;
        }
        Err(e) => {
            error!("failed to schedule removal of {}: {}", target, e);
            reply(ctx, command, "Could not schedule the removal, please try again.").await;
        }
    }
}
