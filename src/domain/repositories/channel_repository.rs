use async_trait::async_trait;

use crate::domain::entities::Channel;

/// Persistence seam for the connected-channel registry.
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Insert the channel, or overwrite name/invite link if the id is known.
    async fn upsert(&self, channel: Channel) -> Result<(), String>;

    async fn get(&self, channel_id: u64) -> Option<Channel>;

    async fn list_all(&self) -> Vec<Channel>;

    async fn delete(&self, channel_id: u64) -> bool;

    async fn exists(&self, channel_id: u64) -> bool;

    async fn count(&self) -> u64;
}
