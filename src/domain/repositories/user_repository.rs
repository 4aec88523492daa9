use async_trait::async_trait;

use crate::domain::entities::User;

/// Persistence seam for registered users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Register a user. Returns false when the id was already registered.
    async fn add(&self, user: User) -> Result<bool, String>;

    async fn get(&self, user_id: u64) -> Option<User>;

    async fn list_all(&self) -> Vec<User>;

    async fn delete(&self, user_id: u64) -> bool;

    async fn count(&self) -> u64;
}
