use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A broadcast channel the bot is connected to. Reconnecting the same id
/// overwrites name and invite link rather than adding a second row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: u64,
    pub name: String,
    pub invite_link: String,
    pub connected_at: DateTime<Utc>,
}

impl Channel {
    pub fn new(id: u64, name: String, invite_link: String) -> Self {
        Self {
            id,
            name,
            invite_link,
            connected_at: Utc::now(),
        }
    }
}
