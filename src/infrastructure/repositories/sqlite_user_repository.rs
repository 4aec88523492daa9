use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rusqlite::{Connection, params};
use std::sync::{Arc, Mutex};

use crate::domain::entities::User;
use crate::domain::repositories::UserRepository;

pub struct SqliteUserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserRepository {
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
            CREATE TABLE IF NOT EXISTS users (
                id             INTEGER PRIMARY KEY,
                name           TEXT NOT NULL,
                registered_at  INTEGER NOT NULL
            );
            ",
        )
        .map_err(|e| e.to_string())?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn row_to_user(row: &rusqlite::Row) -> Result<User, String> {
        let id: i64 = row.get("id").map_err(|e| e.to_string())?;
        let name: String = row.get("name").map_err(|e| e.to_string())?;
        let registered_ts: i64 = row.get("registered_at").map_err(|e| e.to_string())?;

        Ok(User {
            id: id as u64,
            name,
            registered_at: Utc
                .timestamp_opt(registered_ts, 0)
                .single()
                .ok_or("bad registered_at")?,
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn add(&self, user: User) -> Result<bool, String> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> Result<bool, String> {
            let conn_lock = conn.lock().unwrap();
            let inserted = conn_lock
                .execute(
                    "INSERT OR IGNORE INTO users (id, name, registered_at)
                     VALUES (?1, ?2, ?3)",
                    params![
                        user.id as i64,
                        user.name,
                        user.registered_at.timestamp(),
                    ],
                )
                .map_err(|e| e.to_string())?;
            Ok(inserted > 0)
        })
        .await
        .map_err(|e| e.to_string())?
    }

    async fn get(&self, user_id: u64) -> Option<User> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> Option<User> {
            let conn_lock = conn.lock().unwrap();
            conn_lock
                .query_row(
                    "SELECT * FROM users WHERE id = ?1",
                    params![user_id as i64],
                    |row| {
                        Self::row_to_user(row).map_err(|e| {
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

    async fn list_all(&self) -> Vec<User> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> Vec<User> {
            let conn_lock = conn.lock().unwrap();

            let mut stmt = match conn_lock.prepare("SELECT * FROM users ORDER BY registered_at") {
                Ok(s) => s,
                Err(_) => return Vec::new(),
            };

            let iter = match stmt.query_map([], |row| {
                Self::row_to_user(row).map_err(|e| {
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

    async fn delete(&self, user_id: u64) -> bool {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> bool {
            let conn_lock = conn.lock().unwrap();
            conn_lock
                .execute("DELETE FROM users WHERE id = ?1", params![user_id as i64])
                .unwrap_or(0)
                > 0
        })
        .await
        .unwrap_or(false)
    }

    async fn count(&self) -> u64 {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> u64 {
            let conn_lock = conn.lock().unwrap();
            conn_lock
                .query_row("SELECT COUNT(*) FROM users", [], |row| row.get::<_, i64>(0))
                .unwrap_or(0) as u64
        })
        .await
        .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> SqliteUserRepository {
        SqliteUserRepository::new(":memory:").unwrap()
    }

    #[tokio::test]
    async fn add_is_idempotent_per_id() {
        let repo = repo();

        assert!(repo.add(User::new(1, "alice".into())).await.unwrap());
        assert!(!repo.add(User::new(1, "alice again".into())).await.unwrap());

        assert_eq!(repo.count().await, 1);
        // First registration wins.
        assert_eq!(repo.get(1).await.unwrap().name, "alice");
    }

    #[tokio::test]
    async fn get_list_delete() {
        let repo = repo();
        repo.add(User::new(1, "alice".into())).await.unwrap();
        repo.add(User::new(2, "bob".into())).await.unwrap();

        assert_eq!(repo.list_all().await.len(), 2);
        assert!(repo.get(3).await.is_none());
        assert!(repo.delete(2).await);
        assert!(!repo.delete(2).await);
        assert_eq!(repo.count().await, 1);
    }
}
