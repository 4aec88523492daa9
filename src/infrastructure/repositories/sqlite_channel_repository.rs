use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rusqlite::{Connection, params};
use std::sync::{Arc, Mutex};

use crate::domain::entities::Channel;
use crate::domain::repositories::ChannelRepository;

pub struct SqliteChannelRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteChannelRepository {
    pub fn new(path: &str) -> Result<Self, String> {
        let conn = Connection::open(path).map_err(|e| e.to_string())?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| e.to_string())?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS channels (
                id            INTEGER PRIMARY KEY,
                name          TEXT NOT NULL,
                invite_link   TEXT NOT NULL,
                connected_at  INTEGER NOT NULL
            );
            ",
        )
        .map_err(|e| e.to_string())?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn row_to_channel(row: &rusqlite::Row) -> Result<Channel, String> {
        let id: i64 = row.get("id").map_err(|e| e.to_string())?;
        let name: String = row.get("name").map_err(|e| e.to_string())?;
        let invite_link: String = row.get("invite_link").map_err(|e| e.to_string())?;
        let connected_ts: i64 = row.get("connected_at").map_err(|e| e.to_string())?;

        Ok(Channel {
            id: id as u64,
            name,
            invite_link,
            connected_at: Utc
                .timestamp_opt(connected_ts, 0)
                .single()
                .ok_or("bad connected_at")?,
        })
    }
}

#[async_trait]
impl ChannelRepository for SqliteChannelRepository {
    async fn upsert(&self, channel: Channel) -> Result<(), String> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> Result<(), String> {
            let conn_lock = conn.lock().unwrap();
            // Reconnecting a known id overwrites name and invite link but
            // keeps the original connection timestamp.
            conn_lock
                .execute(
                    "INSERT INTO channels (id, name, invite_link, connected_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        invite_link = excluded.invite_link",
                    params![
                        channel.id as i64,
                        channel.name,
                        channel.invite_link,
                        channel.connected_at.timestamp(),
                    ],
                )
                .map_err(|e| e.to_string())?;
            Ok(())
        })
        .await
        .map_err(|e| e.to_string())?
    }

    async fn get(&self, channel_id: u64) -> Option<Channel> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> Option<Channel> {
            let conn_lock = conn.lock().unwrap();
            conn_lock
                .query_row(
                    "SELECT * FROM channels WHERE id = ?1",
                    params![channel_id as i64],
                    |row| {
                        Self::row_to_channel(row).map_err(|e| {
                            rusqlite::Error::ToSqlConversionFailure(Box::new(
                                std::io::Error::other(e),
                            ))
                        })
                    },
                )
                .ok()
        })
        .await
        .unwrap_or(None)
    }

    async fn list_all(&self) -> Vec<Channel> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> Vec<Channel> {
            let conn_lock = conn.lock().unwrap();

            let mut stmt = match conn_lock.prepare("SELECT * FROM channels ORDER BY connected_at") {
                Ok(s) => s,
                Err(_) => return Vec::new(),
            };

            let iter = match stmt.query_map([], |row| {
                Self::row_to_channel(row).map_err(|e| {
                    rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::other(e)))
                })
            }) {
                Ok(it) => it,
                Err(_) => return Vec::new(),
            };

            iter.filter_map(|r| r.ok()).collect()
        })
        .await
        .unwrap_or_else(|_| Vec::new())
    }

    async fn delete(&self, channel_id: u64) -> bool {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> bool {
            let conn_lock = conn.lock().unwrap();
            conn_lock
                .execute(
                    "DELETE FROM channels WHERE id = ?1",
                    params![channel_id as i64],
                )
                .unwrap_or(0)
                > 0
        })
        .await
        .unwrap_or(false)
    }

    async fn exists(&self, channel_id: u64) -> bool {
        self.get(channel_id).await.is_some()
    }

    async fn count(&self) -> u64 {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> u64 {
            let conn_lock = conn.lock().unwrap();
            conn_lock
                .query_row("SELECT COUNT(*) FROM channels", [], |row| {
                    row.get::<_, i64>(0)
                })
                .unwrap_or(0) as u64
        })
        .await
        .unwrap_or(0)
    }
}
