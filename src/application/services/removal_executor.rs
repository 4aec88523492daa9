use chrono::Utc;
use std::sync::Arc;
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};

use crate::application::transport::{MessageHandle, NotificationSink, RemovalTransport};
use crate::domain::entities::{Channel, RemovalTask, TaskStatus};
use crate::domain::repositories::TaskRepository;

/// Pause between the ban and unban calls for one channel, to stay under
/// platform flood limits.
const CALL_GAP: Duration = Duration::from_secs(1);

/// Tally of one removal sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalReport {
    pub success_count: usize,
    pub failed_count: usize,
}

/// Fans the removal of one user out across every connected channel. A failed
/// ban or unban marks that channel failed and the sweep moves on; no channel
/// failure ever aborts the sweep.
pub struct BulkRemovalExecutor {
    tasks: Arc<dyn TaskRepository>,
    transport: Arc<dyn RemovalTransport>,
    sink: Arc<dyn NotificationSink>,
}

impl BulkRemovalExecutor {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        transport: Arc<dyn RemovalTransport>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            tasks,
            transport,
            sink,
        }
    }

    /// Runs the sweep for a task, records the terminal status and delivers
    /// the final report best-effort. Completed means the sweep ran to the
    /// end, even when some channels failed; `Err` is reserved for a fatal
    /// failure of the execution itself.
    pub async fn execute(
        &self,
        task: &RemovalTask,
        channels: &[Channel],
        progress: Option<&MessageHandle>,
    ) -> Result<RemovalReport, String> {
        let report = self.sweep(task, channels).await;

        if let Err(e) = self.tasks.set_status(task.id, TaskStatus::Completed).await {
            error!("removal task #{} could not be finalized: {}", task.id, e);
            let _ = self.tasks.set_status(task.id, TaskStatus::Failed).await;
            self.notify(task, progress, &format!("Removal task #{} failed: {}", task.id, e))
                .await;
            return Err(e);
        }

        info!(
            "removal task #{} completed: {} channel(s) ok, {} failed",
            task.id, report.success_count, report.failed_count
        );
        self.notify(
            task,
            progress,
            &format!(
                "Removal of user {} complete: {} channel(s) succeeded, {} failed ({})",
                task.target_user_id,
                report.success_count,
                report.failed_count,
                Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            ),
        )
        .await;

        Ok(report)
    }

    async fn sweep(&self, task: &RemovalTask, channels: &[Channel]) -> RemovalReport {
        let mut report = RemovalReport {
            success_count: 0,
            failed_count: 0,
        };

        for channel in channels {
            match self.kick(channel.id, task.target_user_id).await {
                Ok(()) => report.success_count += 1,
                Err(e) => {
                    warn!(
                        "could not remove user {} from channel {} ({}): {}",
                        task.target_user_id, channel.id, channel.name, e
                    );
                    report.failed_count += 1;
                }
            }
        }

        report
    }

    /// Ban then unban: the user is out of the channel but free to rejoin via
    /// a fresh invite.
    async fn kick(&self, channel_id: u64, user_id: u64) -> Result<(), String> {
        self.transport.ban(channel_id, user_id).await?;
        sleep(CALL_GAP).await;
        self.transport.unban(channel_id, user_id).await
    }

    async fn notify(&self, task: &RemovalTask, progress: Option<&MessageHandle>, text: &str) {
        let delivered = match progress {
            Some(handle) => self.sink.edit(handle, text).await,
            None => self.sink.send(task.notify_chat_id, text).await.map(|_| ()),
        };

        if let Err(e) = delivered {
            warn!("could not deliver report for task #{}: {}", task.id, e);
        }
    }
}
