//! In-memory fakes for the repository and transport seams, used by the
//! service tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::transport::{MessageHandle, NotificationSink, RemovalTransport};
use crate::domain::entities::{Channel, RemovalTask, TaskStatus};
use crate::domain::repositories::{ChannelRepository, TaskRepository};

/// Build channel fixtures from bare ids.
pub fn channels(ids: &[u64]) -> Vec<Channel> {
    ids.iter()
        .map(|id| {
            Channel::new(
                *id,
                format!("channel-{}", id),
                format!("https://invite.example/{}", id),
            )
        })
        .collect()
}

#[derive(Default)]
pub struct MemoryTaskRepository {
    tasks: Mutex<HashMap<u64, RemovalTask>>,
    next_id: AtomicU64,
    fail_status_updates: AtomicBool,
}

impl MemoryTaskRepository {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            ..Self::default()
        })
    }

    pub fn fail_status_updates(&self, fail: bool) {
        self.fail_status_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn create(&self, mut task: RemovalTask) -> Result<u64, String> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        task.id = id;
        self.tasks.lock().unwrap().insert(id, task);
        Ok(id)
    }

    async fn get(&self, task_id: u64) -> Option<RemovalTask> {
        self.tasks.lock().unwrap().get(&task_id).cloned()
    }

    async fn list_pending(&self) -> Vec<RemovalTask> {
        self.tasks
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.status == TaskStatus::Pending)
            .cloned()
            .collect()
    }

    async fn list_by_user(&self, user_id: u64) -> Vec<RemovalTask> {
        self.tasks
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.target_user_id == user_id)
            .cloned()
            .collect()
    }

    async fn set_status(&self, task_id: u64, status: TaskStatus) -> Result<(), String> {
        if self.fail_status_updates.load(Ordering::SeqCst) {
            return Err("injected storage failure".to_string());
        }

        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .get_mut(&task_id)
            .ok_or_else(|| format!("no task with id {}", task_id))?;

        if task.status.is_terminal() && status == TaskStatus::Pending {
            return Err("terminal status cannot revert to pending".to_string());
        }

        task.status = status;
        task.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, task_id: u64) -> bool {
        self.tasks.lock().unwrap().remove(&task_id).is_some()
    }

    async fn count(&self) -> u64 {
        self.tasks.lock().unwrap().len() as u64
    }

    async fn count_pending(&self) -> u64 {
        self.list_pending().await.len() as u64
    }
}

#[derive(Default)]
pub struct MemoryChannelRepository {
    channels: Mutex<Vec<Channel>>,
}

impl MemoryChannelRepository {
    pub fn with_channels(channels: &[Channel]) -> Arc<Self> {
        Arc::new(Self {
            channels: Mutex::new(channels.to_vec()),
        })
    }
}

#[async_trait]
impl ChannelRepository for MemoryChannelRepository {
    async fn upsert(&self, channel: Channel) -> Result<(), String> {
        let mut channels = self.channels.lock().unwrap();
        match channels.iter_mut().find(|c| c.id == channel.id) {
            Some(existing) => *existing = channel,
            None => channels.push(channel),
        }
        Ok(())
    }

    async fn get(&self, channel_id: u64) -> Option<Channel> {
        self.channels
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == channel_id)
            .cloned()
    }

    async fn list_all(&self) -> Vec<Channel> {
        self.channels.lock().unwrap().clone()
    }

    async fn delete(&self, channel_id: u64) -> bool {
        let mut channels = self.channels.lock().unwrap();
        let before = channels.len();
        channels.retain(|c| c.id != channel_id);
        channels.len() != before
    }

    async fn exists(&self, channel_id: u64) -> bool {
        self.get(channel_id).await.is_some()
    }

    async fn count(&self) -> u64 {
        self.channels.lock().unwrap().len() as u64
    }
}

/// Transport fake that fails both calls for a chosen set of channel ids and
/// records every call it receives.
pub struct FlakyTransport {
    failing: HashSet<u64>,
    calls: Mutex<Vec<(String, u64, u64)>>,
}

impl FlakyTransport {
    pub fn reliable() -> Arc<Self> {
        Self::failing_for([])
    }

    pub fn failing_for(ids: impl IntoIterator<Item = u64>) -> Arc<Self> {
        Arc::new(Self {
            failing: ids.into_iter().collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, u64, u64)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, channel_id: u64, user_id: u64) -> Result<(), String> {
        self.calls
            .lock()
            .unwrap()
            .push((op.to_string(), channel_id, user_id));

        if self.failing.contains(&channel_id) {
            Err(format!("injected {} failure for channel {}", op, channel_id))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemovalTransport for FlakyTransport {
    async fn ban(&self, channel_id: u64, user_id: u64) -> Result<(), String> {
        self.record("ban", channel_id, user_id)
    }

    async fn unban(&self, channel_id: u64, user_id: u64) -> Result<(), String> {
        self.record("unban", channel_id, user_id)
    }
}

/// Sink fake that records sends and edits, optionally failing either.
#[derive(Default)]
pub struct RecordingSink {
    sends: Mutex<Vec<(u64, String)>>,
    edits: Mutex<Vec<(u64, String)>>,
    next_message_id: AtomicU64,
    fail_sends: AtomicBool,
    fail_edits: AtomicBool,
}

impl RecordingSink {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            next_message_id: AtomicU64::new(1),
            ..Self::default()
        })
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    pub fn sends(&self) -> Vec<(u64, String)> {
        self.sends.lock().unwrap().clone()
    }

    /// Recorded edits as (message_id, text) pairs.
    pub fn edits(&self) -> Vec<(u64, String)> {
        self.edits.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, chat_id: u64, text: &str) -> Result<MessageHandle, String> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err("injected send failure".to_string());
        }

        self.sends.lock().unwrap().push((chat_id, text.to_string()));
        Ok(MessageHandle {
            chat_id,
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
        })
    }

    async fn edit(&self, handle: &MessageHandle, text: &str) -> Result<(), String> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err("injected edit failure".to_string());
        }

        self.edits
            .lock()
            .unwrap()
            .push((handle.message_id, text.to_string()));
        Ok(())
    }

    async fn delete(&self, _handle: &MessageHandle) -> Result<(), String> {
        Ok(())
    }
}
