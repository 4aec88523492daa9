use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{Duration, sleep};
use tracing::debug;

use crate::application::transport::{MessageHandle, NotificationSink};

const TICK: Duration = Duration::from_secs(1);

/// Below this many seconds remaining, every tick refreshes the message.
const FINAL_BURST_SECS: i64 = 60;

/// Human-readable remaining time, one of four display buckets.
pub fn format_remaining(secs: i64) -> String {
    if secs >= 86400 {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    } else if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs.max(0))
    }
}

/// Minimum spacing between message edits for a given remaining time. Far-off
/// deadlines update rarely; the cadence tightens as the deadline nears.
pub fn update_interval(secs: i64) -> Duration {
    if secs >= 86400 {
        Duration::from_secs(3600)
    } else if secs >= 3600 {
        Duration::from_secs(300)
    } else if secs >= 60 {
        Duration::from_secs(10)
    } else {
        Duration::from_secs(1)
    }
}

/// Polls once a second until `fire_time` is reached, editing the progress
/// message whenever the bucket cadence allows (always in the final minute).
/// The poll stays at a fixed short tick so bucket transitions are picked up
/// promptly. Edit failures are swallowed; only the deadline ends the loop.
pub async fn run_countdown(
    sink: &Arc<dyn NotificationSink>,
    progress: Option<&MessageHandle>,
    fire_time: DateTime<Utc>,
) {
    let mut last_edit: Option<Instant> = None;

    loop {
        let remaining = (fire_time - Utc::now()).num_seconds();
        if remaining <= 0 {
            break;
        }

        let due = match last_edit {
            None => true,
            Some(at) => {
                remaining <= FINAL_BURST_SECS || at.elapsed() >= update_interval(remaining)
            }
        };

        if due {
            if let Some(handle) = progress {
                let text = format!("Removal in {}", format_remaining(remaining));
                if let Err(e) = sink.edit(handle, &text).await {
                    debug!("countdown edit failed: {}", e);
                }
            }
            last_edit = Some(Instant::now());
        }

        sleep(TICK).await;
    }
}
