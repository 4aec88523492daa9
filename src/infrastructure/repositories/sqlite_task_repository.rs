use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rusqlite::{Connection, params};
use std::sync::{Arc, Mutex};

use crate::domain::entities::{RemovalTask, TaskStatus, TimeUnit};
use crate::domain::repositories::TaskRepository;

pub struct SqliteTaskRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskRepository {
    pub fn new(path: &str) -> Result<Self, String> {
        let conn = Connection::open(path).map_err(|e| e.to_string())?;

        // Each repository holds its own handle on the same file, so writers
        // must wait out each other's locks instead of failing with BUSY.
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| e.to_string())?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS removal_tasks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                target_user_id  INTEGER NOT NULL,
                fire_time       INTEGER NOT NULL,
                duration        INTEGER NOT NULL,
                unit            TEXT NOT NULL,
                status          TEXT NOT NULL,
                notify_chat_id  INTEGER NOT NULL,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            );
            ",
        )
        .map_err(|e| e.to_string())?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // Runs inside spawn_blocking, so it stays synchronous.
    fn row_to_task(row: &rusqlite::Row) -> Result<RemovalTask, String> {
        let id: i64 = row.get("id").map_err(|e| e.to_string())?;
        let target_user_id: i64 = row.get("target_user_id").map_err(|e| e.to_string())?;
        let fire_ts: i64 = row.get("fire_time").map_err(|e| e.to_string())?;
        let duration: i64 = row.get("duration").map_err(|e| e.to_string())?;
        let unit: String = row.get("unit").map_err(|e| e.to_string())?;
        let status: String = row.get("status").map_err(|e| e.to_string())?;
        let notify_chat_id: i64 = row.get("notify_chat_id").map_err(|e| e.to_string())?;
        let created_ts: i64 = row.get("created_at").map_err(|e| e.to_string())?;
        let updated_ts: i64 = row.get("updated_at").map_err(|e| e.to_string())?;

        let unit = TimeUnit::parse(&unit).ok_or_else(|| format!("unknown unit '{}'", unit))?;
        let status =
            TaskStatus::parse(&status).ok_or_else(|| format!("unknown status '{}'", status))?;

        Ok(RemovalTask {
            id: id as u64,
            target_user_id: target_user_id as u64,
            fire_time: Utc.timestamp_opt(fire_ts, 0).single().ok_or("bad fire_time")?,
            duration,
            unit,
            status,
            notify_chat_id: notify_chat_id as u64,
            created_at: Utc
                .timestamp_opt(created_ts, 0)
                .single()
                .ok_or("bad created_at")?,
            updated_at: Utc
                .timestamp_opt(updated_ts, 0)
                .single()
                .ok_or("bad updated_at")?,
        })
    }

    fn query_tasks(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Vec<RemovalTask> {
        let mut stmt = match conn.prepare(sql) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };

        let iter = match stmt.query_map(args, |row| {
            Self::row_to_task(row).map_err(|e| {
                rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::other(e)))
            })
        }) {
            Ok(it) => it,
            Err(_) => return Vec::new(),
        };

        iter.filter_map(|r| r.ok()).collect()
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn create(&self, task: RemovalTask) -> Result<u64, String> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> Result<u64, String> {
            let conn_lock = conn.lock().unwrap();
            conn_lock
                .execute(
                    "INSERT INTO removal_tasks (
                        target_user_id, fire_time, duration, unit, status,
                        notify_chat_id, created_at, updated_at
                     )
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        task.target_user_id as i64,
                        task.fire_time.timestamp(),
                        task.duration,
                        task.unit.as_str(),
                        task.status.as_str(),
                        task.notify_chat_id as i64,
                        task.created_at.timestamp(),
                        task.updated_at.timestamp(),
                    ],
                )
                .map_err(|e| e.to_string())?;

            Ok(conn_lock.last_insert_rowid() as u64)
        })
        .await
        .map_err(|e| e.to_string())?
    }

    async fn get(&self, task_id: u64) -> Option<RemovalTask> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> Option<RemovalTask> {
            let conn_lock = conn.lock().unwrap();
            Self::query_tasks(
                &conn_lock,
                "SELECT * FROM removal_tasks WHERE id = ?1",
                &[&(task_id as i64)],
            )
            .into_iter()
            .next()
        })
        .await
        .unwrap_or(None)
    }

    async fn list_pending(&self) -> Vec<RemovalTask> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> Vec<RemovalTask> {
            let conn_lock = conn.lock().unwrap();
            Self::query_tasks(
                &conn_lock,
                "SELECT * FROM removal_tasks WHERE status = 'pending' ORDER BY fire_time",
                &[],
            )
        })
        .await
        .unwrap_or_else(|_| Vec::new())
    }

    async fn list_by_user(&self, user_id: u64) -> Vec<RemovalTask> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> Vec<RemovalTask> {
            let conn_lock = conn.lock().unwrap();
            Self::query_tasks(
                &conn_lock,
                "SELECT * FROM removal_tasks WHERE target_user_id = ?1 ORDER BY id",
                &[&(user_id as i64)],
            )
        })
        .await
        .unwrap_or_else(|_| Vec::new())
    }

    async fn set_status(&self, task_id: u64, status: TaskStatus) -> Result<(), String> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> Result<(), String> {
            let conn_lock = conn.lock().unwrap();
            // A terminal status never reverts to pending.
            let changed = conn_lock
                .execute(
                    "UPDATE removal_tasks SET status = ?2, updated_at = ?3
                     WHERE id = ?1 AND (status = 'pending' OR ?2 != 'pending')",
                    params![task_id as i64, status.as_str(), Utc::now().timestamp()],
                )
                .map_err(|e| e.to_string())?;

            if changed == 0 {
                return Err(format!("task {} not found or transition refused", task_id));
            }
            Ok(())
        })
        .await
        .map_err(|e| e.to_string())?
    }

    async fn delete(&self, task_id: u64) -> bool {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> bool {
            let conn_lock = conn.lock().unwrap();
            conn_lock
                .execute(
                    "DELETE FROM removal_tasks WHERE id = ?1",
                    params![task_id as i64],
                )
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
                .query_row("SELECT COUNT(*) FROM removal_tasks", [], |row| {
                    row.get::<_, i64>(0)
                })
                .unwrap_or(0) as u64
        })
        .await
        .unwrap_or(0)
    }

    async fn count_pending(&self) -> u64 {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> u64 {
            let conn_lock = conn.lock().unwrap();
            conn_lock
                .query_row(
                    "SELECT COUNT(*) FROM removal_tasks WHERE status = 'pending'",
                    [],
                    |row| row.get::<_, i64>(0),
                )
                .unwrap_or(0) as u64
        })
        .await
        .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::TimeUnit;
    use crate::domain::repositories::user_repository::UserRepository;

    fn repo() -> SqliteTaskRepository {
        SqliteTaskRepository::new(":memory:").unwrap()
    }

    fn task(user_id: u64) -> RemovalTask {
        RemovalTask::new(user_id, 5, TimeUnit::Minutes, 42)
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids_and_round_trips() {
        let repo = repo();

        let first = repo.create(task(1)).await.unwrap();
        let second = repo.create(task(2)).await.unwrap();
        assert!(second > first);

        let stored = repo.get(first).await.unwrap();
        assert_eq!(stored.id, first);
        assert_eq!(stored.target_user_id, 1);
        assert_eq!(stored.duration, 5);
        assert_eq!(stored.unit, TimeUnit::Minutes);
        assert_eq!(stored.status, TaskStatus::Pending);
        assert_eq!(stored.notify_chat_id, 42);
    }

    #[tokio::test]
    async fn get_unknown_id_returns_none() {
        let repo = repo();
        assert!(repo.get(12345).await.is_none());
    }

    #[tokio::test]
    async fn set_status_is_one_way_out_of_pending() {
        let repo = repo();
        let id = repo.create(task(1)).await.unwrap();

        repo.set_status(id, TaskStatus::Completed).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap().status, TaskStatus::Completed);

        // Reverting to pending is refused and the stored status is unchanged.
        assert!(repo.set_status(id, TaskStatus::Pending).await.is_err());
        assert_eq!(repo.get(id).await.unwrap().status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn set_status_refreshes_updated_at() {
        let repo = repo();
        let mut seed = task(1);
        seed.created_at = Utc.timestamp_opt(1_600_000_000, 0).unwrap();
        seed.updated_at = seed.created_at;
        let id = repo.create(seed).await.unwrap();

        repo.set_status(id, TaskStatus::Failed).await.unwrap();
        let stored = repo.get(id).await.unwrap();
        assert!(stored.updated_at > stored.created_at);
    }

    #[tokio::test]
    async fn list_pending_excludes_terminal_tasks() {
        let repo = repo();
        let a = repo.create(task(1)).await.unwrap();
        let b = repo.create(task(2)).await.unwrap();
        repo.set_status(a, TaskStatus::Completed).await.unwrap();

        let pending = repo.list_pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, b);

        assert_eq!(repo.count().await, 2);
        assert_eq!(repo.count_pending().await, 1);
    }

    #[tokio::test]
    async fn list_by_user_filters_on_target() {
        let repo = repo();
        repo.create(task(1)).await.unwrap();
        repo.create(task(2)).await.unwrap();
        repo.create(task(1)).await.unwrap();

        assert_eq!(repo.list_by_user(1).await.len(), 2);
        assert_eq!(repo.list_by_user(3).await.len(), 0);
    }

    #[tokio::test]
    async fn separate_handles_on_one_file_write_side_by_side() {
        use crate::infrastructure::repositories::SqliteUserRepository;

        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("warden-{}-{}.db", std::process::id(), nanos));
        let path = path.to_str().unwrap().to_string();

        let tasks = SqliteTaskRepository::new(&path).unwrap();
        let users = SqliteUserRepository::new(&path).unwrap();

        let id = tasks.create(task(1)).await.unwrap();
        assert!(users
            .add(crate::domain::entities::User::new(5, "eve".into()))
            .await
            .unwrap());
        tasks.set_status(id, TaskStatus::Completed).await.unwrap();

        assert_eq!(tasks.get(id).await.unwrap().status, TaskStatus::Completed);
        assert_eq!(users.count().await, 1);

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path, suffix));
        }
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let repo = repo();
        let id = repo.create(task(1)).await.unwrap();

        assert!(repo.delete(id).await);
        assert!(!repo.delete(id).await);
        assert_eq!(repo.count().await, 0);
    }
}
