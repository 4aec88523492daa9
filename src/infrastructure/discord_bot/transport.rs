use async_trait::async_trait;
use serenity::all::{ChannelId, GuildId, MessageId, UserId};
use serenity::builder::{CreateMessage, EditMessage};
use serenity::http::Http;
use std::sync::Arc;

use crate::application::transport::{MessageHandle, NotificationSink, RemovalTransport};

/// Discord-backed removal transport. A connected channel record points at the
/// guild hosting it; a guild ban followed by an unban amounts to a kick that
/// leaves the user free to rejoin through the stored invite link.
pub struct DiscordTransport {
    http: Arc<Http>,
}

impl DiscordTransport {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl RemovalTransport for DiscordTransport {
    async fn ban(&self, channel_id: u64, user_id: u64) -> Result<(), String> {
        self.http
            .ban_user(
                GuildId::new(channel_id),
                UserId::new(user_id),
                0,
                Some("scheduled removal"),
            )
            .await
            .map_err(|e| format!("ban failed for user {} in {}: {}", user_id, channel_id, e))
    }

    async fn unban(&self, channel_id: u64, user_id: u64) -> Result<(), String> {
        self.http
            .remove_ban(
                GuildId::new(channel_id),
                UserId::new(user_id),
                Some("scheduled removal"),
            )
            .await
            .map_err(|e| format!("unban failed for user {} in {}: {}", user_id, channel_id, e))
    }
}

/// Discord-backed notification sink; countdown edits and final reports go
/// through plain channel messages.
pub struct DiscordNotifier {
    http: Arc<Http>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl NotificationSink for DiscordNotifier {
    async fn send(&self, chat_id: u64, text: &str) -> Result<MessageHandle, String> {
        let message = ChannelId::new(chat_id)
            .send_message(&self.http, CreateMessage::new().content(text))
            .await
            .map_err(|e| format!("send to chat {} failed: {}", chat_id, e))?;

        Ok(MessageHandle {
            chat_id,
            message_id: message.id.get(),
        })
    }

    async fn edit(&self, handle: &MessageHandle, text: &str) -> Result<(), String> {
        ChannelId::new(handle.chat_id)
            .edit_message(
                &self.http,
                MessageId::new(handle.message_id),
                EditMessage::new().content(text),
            )
            .await
            .map(|_| ())
            .map_err(|e| format!("edit of message {} failed: {}", handle.message_id, e))
    }

    async fn delete(&self, handle: &MessageHandle) -> Result<(), String> {
        ChannelId::new(handle.chat_id)
            .delete_message(&self.http, MessageId::new(handle.message_id))
            .await
            .map_err(|e| format!("delete of message {} failed: {}", handle.message_id, e))
    }
}
