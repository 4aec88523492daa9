use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user of the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub registered_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: u64, name: String) -> Self {
        Self {
            id,
            name,
            registered_at: Utc::now(),
        }
    }
}
