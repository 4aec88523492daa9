use async_trait::async_trait;

/// Reference to a message the bot has posted, for later edits or deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub chat_id: u64,
    pub message_id: u64,
}

/// The platform action pair the removal sweep invokes per channel. Ban
/// followed by an immediate unban amounts to a kick. Both calls fail
/// independently (network, permissions, unknown user or channel).
#[async_trait]
pub trait RemovalTransport: Send + Sync {
    async fn ban(&self, channel_id: u64, user_id: u64) -> Result<(), String>;

    async fn unban(&self, channel_id: u64, user_id: u64) -> Result<(), String>;
}

/// Best-effort delivery of status text to a chat. Callers swallow failures;
/// a lost countdown edit or report never changes task state.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, chat_id: u64, text: &str) -> Result<MessageHandle, String>;

    async fn edit(&self, handle: &MessageHandle, text: &str) -> Result<(), String>;

    async fn delete(&self, handle: &MessageHandle) -> Result<(), String>;
}
