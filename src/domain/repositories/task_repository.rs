use async_trait::async_trait;

use crate::domain::entities::{RemovalTask, TaskStatus};

/// Persistence seam for removal tasks. Lookup paths degrade gracefully
/// (`Option`, `bool`, zero counts) instead of surfacing storage errors.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persist a new task and return its assigned id.
    async fn create(&self, task: RemovalTask) -> Result<u64, String>;

    async fn get(&self, task_id: u64) -> Option<RemovalTask>;

    /// All tasks still in the Pending state.
    async fn list_pending(&self) -> Vec<RemovalTask>;

    async fn list_by_user(&self, user_id: u64) -> Vec<RemovalTask>;

    /// Move a task to a new status and refresh its `updated_at`.
    async fn set_status(&self, task_id: u64, status: TaskStatus) -> Result<(), String>;

    async fn delete(&self, task_id: u64) -> bool;

    async fn count(&self) -> u64;

    async fn count_pending(&self) -> u64;
}
