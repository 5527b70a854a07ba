use super::TaskRecord;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use libsql::{Builder, Connection, Database};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Durable store of task records.
///
/// Writes are independent transactions; concurrent calls for different
/// task ids never interleave.
#[async_trait]
pub trait TaskLedger: Send + Sync {
    /// Creates the task table if it does not exist. Idempotent.
    async fn ensure_schema(&self) -> Result<()>;

    /// Inserts the row for a finished task. Fails if the task id already exists.
    async fn record_completion(&self, record: &TaskRecord) -> Result<()>;

    /// Overwrites status, end date and messages of an existing row.
    async fn update_completion(&self, record: &TaskRecord) -> Result<()>;

    async fn get(&self, task_id: &str) -> Result<Option<TaskRecord>>;

    /// Most recently recorded tasks first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<TaskRecord>>;

    async fn count(&self) -> Result<u64>;
}

pub struct LibsqlLedger {
    // Kept alive for the connection's lifetime.
    _db: Database,
    conn: Mutex<Connection>,
}

impl LibsqlLedger {
    /// Opens (or creates) the ledger file and ensures the table exists.
    ///
    /// Parent directories are created for file paths; `:memory:` is allowed.
    pub async fn open(db_path: &str) -> Result<Self> {
        if db_path != ":memory:" {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }

        let db = Builder::new_local(db_path).build().await?;
        let conn = db.connect()?;

        let ledger = Self {
            _db: db,
            conn: Mutex::new(conn),
        };
        ledger.ensure_schema().await?;

        info!("Task ledger initialized: {}", db_path);
        Ok(ledger)
    }
}

#[async_trait]
impl TaskLedger for LibsqlLedger {
    async fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                task_id TEXT PRIMARY KEY,
                task_type TEXT NOT NULL,
                status TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                messages TEXT NOT NULL
            )
            "#,
            (),
        )
        .await?;
        Ok(())
    }

    async fn record_completion(&self, record: &TaskRecord) -> Result<()> {
        let conn = self.conn.lock().await;
        let tx = conn.transaction().await?;
        let inserted = tx
            .execute(
                "INSERT INTO tasks (task_id, task_type, status, start_date, end_date, messages) VALUES (?, ?, ?, ?, ?, ?)",
                (
                    record.task_id.as_str(),
                    record.task_type.as_str(),
                    record.status.as_str(),
                    record.start_date.to_rfc3339(),
                    record.end_date.to_rfc3339(),
                    record.messages.as_str(),
                ),
            )
            .await;

        if let Err(e) = inserted {
            tx.rollback().await?;
            return Err(e.into());
        }
        tx.commit().await?;

        debug!("Task recorded: {}", record.task_id);
        Ok(())
    }

    async fn update_completion(&self, record: &TaskRecord) -> Result<()> {
        let conn = self.conn.lock().await;
        let tx = conn.transaction().await?;
        let changed = tx
            .execute(
                "UPDATE tasks SET status = ?, end_date = ?, messages = ? WHERE task_id = ?",
                (
                    record.status.as_str(),
                    record.end_date.to_rfc3339(),
                    record.messages.as_str(),
                    record.task_id.as_str(),
                ),
            )
            .await;

        let changed = match changed {
            Ok(changed) => changed,
            Err(e) => {
                tx.rollback().await?;
                return Err(e.into());
            }
        };

        if changed == 0 {
            tx.rollback().await?;
            return Err(Error::TaskNotFound {
                task_id: record.task_id.clone(),
            });
        }
        tx.commit().await?;

        debug!("Task updated: {}", record.task_id);
        Ok(())
    }

    async fn get(&self, task_id: &str) -> Result<Option<TaskRecord>> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT task_id, task_type, status, start_date, end_date, messages FROM tasks WHERE task_id = ?",
                [task_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<TaskRecord>> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT task_id, task_type, status, start_date, end_date, messages FROM tasks ORDER BY rowid DESC LIMIT ?",
                [limit as i64],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_record(&row)?);
        }
        Ok(records)
    }

    async fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().await;
        let mut rows = conn.query("SELECT COUNT(*) FROM tasks", ()).await?;

        match rows.next().await? {
            Some(row) => {
                let count: i64 = row.get(0)?;
                Ok(count as u64)
            }
            None => Ok(0),
        }
    }
}

fn row_to_record(row: &libsql::Row) -> Result<TaskRecord> {
    let start_date: String = row.get(3)?;
    let end_date: String = row.get(4)?;

    Ok(TaskRecord {
        task_id: row.get(0)?,
        task_type: row.get(1)?,
        status: row.get(2)?,
        start_date: parse_timestamp(&start_date)?,
        end_date: parse_timestamp(&end_date)?,
        messages: row.get(5)?,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| Error::ledger(format!("Failed to parse timestamp '{value}': {e}")))
}
