use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::application::services::countdown::{format_remaining, run_countdown};
use crate::application::services::removal_executor::BulkRemovalExecutor;
use crate::application::transport::NotificationSink;
use crate::domain::entities::{RemovalTask, TimeUnit};
use crate::domain::repositories::{ChannelRepository, TaskRepository};

/// Rejection or storage failure raised while accepting a removal request.
/// Once a request is accepted, nothing that happens later reaches the caller
/// through this type; progress is reported through the notification sink.
#[derive(Debug)]
pub enum ScheduleError {
    InvalidRequest(String),
    NoTargets,
    Storage(String),
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ScheduleError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ScheduleError::NoTargets => write!(f, "No channels are connected"),
            ScheduleError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Returned to the scheduling caller the moment a task is accepted.
pub struct TaskHandle {
    pub task_id: u64,
    pub fire_time: DateTime<Utc>,
    /// The detached waiter driving countdown and execution. Callers are free
    /// to drop it; the waiter keeps running either way.
    pub join: JoinHandle<()>,
}

/// Accepts removal requests, persists them and arms one detached waiter per
/// task. Waiters are tracked only by their task-store id; they share no state
/// with each other.
pub struct RemovalScheduler {
    tasks: Arc<dyn TaskRepository>,
    channels: Arc<dyn ChannelRepository>,
    executor: Arc<BulkRemovalExecutor>,
    sink: Arc<dyn NotificationSink>,
}

impl RemovalScheduler {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        channels: Arc<dyn ChannelRepository>,
        executor: Arc<BulkRemovalExecutor>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            tasks,
            channels,
            executor,
            sink,
        }
    }

    /// Validate and persist a removal request, then return immediately. The
    /// countdown and the sweep run in a background task of their own.
    pub async fn schedule(
        &self,
        target_user_id: u64,
        duration: i64,
        unit: &str,
        notify_chat_id: u64,
    ) -> Result<TaskHandle, ScheduleError> {
        if duration <= 0 {
            return Err(ScheduleError::InvalidRequest(format!(
                "duration must be positive, got {}",
                duration
            )));
        }

        let unit = TimeUnit::parse(unit).ok_or_else(|| {
            ScheduleError::InvalidRequest(format!("unrecognized time unit '{}'", unit))
        })?;

        if duration
            .checked_mul(unit.as_secs())
            .and_then(Duration::try_seconds)
            .and_then(|delay| Utc::now().checked_add_signed(delay))
            .is_none()
        {
            return Err(ScheduleError::InvalidRequest(format!(
                "delay of {} {} is out of range",
                duration,
                unit.as_str()
            )));
        }

        if self.channels.count().await == 0 {
            return Err(ScheduleError::NoTargets);
        }

        let mut task = RemovalTask::new(target_user_id, duration, unit, notify_chat_id);
        let id = self
            .tasks
            .create(task.clone())
            .await
            .map_err(ScheduleError::Storage)?;
        task.id = id;

        info!(
            "scheduled removal of user {} in {} {} (task #{})",
            target_user_id,
            duration,
            unit.as_str(),
            id
        );

        let fire_time = task.fire_time;
        let join = self.spawn_waiter(task);

        Ok(TaskHandle {
            task_id: id,
            fire_time,
            join,
        })
    }

    /// Re-arm a waiter for every task still Pending in the store. Run once at
    /// startup; tasks whose fire time already passed execute immediately.
    pub async fn resume_pending(&self) -> Vec<TaskHandle> {
        let pending = self.tasks.list_pending().await;
        if !pending.is_empty() {
            info!("re-arming {} pending removal task(s)", pending.len());
        }

        pending
            .into_iter()
            .map(|task| TaskHandle {
                task_id: task.id,
                fire_time: task.fire_time,
                join: self.spawn_waiter(task),
            })
            .collect()
    }

    fn spawn_waiter(&self, task: RemovalTask) -> JoinHandle<()> {
        let channels = self.channels.clone();
        let executor = self.executor.clone();
        let sink = self.sink.clone();

        tokio::spawn(async move {
            let remaining = (task.fire_time - Utc::now()).num_seconds();
            let progress = match sink
                .send(
                    task.notify_chat_id,
                    &format!(
                        "Removal of user {} in {}",
                        task.target_user_id,
                        format_remaining(remaining)
                    ),
                )
                .await
            {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!("could not post countdown message for task #{}: {}", task.id, e);
                    None
                }
            };

            run_countdown(&sink, progress.as_ref(), task.fire_time).await;

            let targets = channels.list_all().await;
            let _ = executor.execute(&task, &targets, progress.as_ref()).await;
        })
    }
}
