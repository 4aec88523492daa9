use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Unit of a requested removal delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Parse a user-supplied unit spelling ("s", "mins", "hours", ...).
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(Self::Seconds),
            "m" | "min" | "mins" | "minute" | "minutes" => Some(Self::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(Self::Hours),
            "d" | "day" | "days" => Some(Self::Days),
            _ => None,
        }
    }

    pub fn as_secs(&self) -> i64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 3600,
            Self::Days => 86400,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
        }
    }
}

/// Lifecycle state of a removal task. A task starts Pending and moves exactly
/// once to one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A scheduled removal of one user from every connected channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalTask {
    pub id: u64,
    pub target_user_id: u64,
    /// Absolute UTC instant at which the removal sweep runs. Fixed at creation.
    pub fire_time: DateTime<Utc>,
    /// Originally requested quantity and unit, kept for display and audit.
    pub duration: i64,
    pub unit: TimeUnit,
    pub status: TaskStatus,
    /// Chat that receives the countdown message and the final report.
    pub notify_chat_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RemovalTask {
    pub fn new(target_user_id: u64, duration: i64, unit: TimeUnit, notify_chat_id: u64) -> Self {
        let created_at = Utc::now();
        // Saturate on absurd delays instead of overflowing; the scheduler
        // rejects out-of-range requests before a task is ever persisted.
        let delay = duration
            .checked_mul(unit.as_secs())
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        let fire_time = created_at
            .checked_add_signed(delay)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            id: 0, // assigned by the repository
            target_user_id,
            fire_time,
            duration,
            unit,
            status: TaskStatus::Pending,
            notify_chat_id,
            created_at,
            updated_at: created_at,
        }
    }
}
