//! Item store: SQLite persistence plus a live `watch` snapshot.
//!
//! # Responsibility
//! - Expose insert, observe-all, update and delete-where-checked over the
//!   `tasks` table.
//! - Re-publish the whole table after each successful mutation.
//!
//! # Invariants
//! - The mutation and the snapshot re-read share one transaction; nothing is
//!   published unless it committed.
//! - Snapshots are published while the connection lock is held, so
//!   subscribers observe them in commit order.
//! - Updating a vanished id is a successful no-op.
//! - Task text is never written to logs.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::task::{Task, TaskDraft, TaskId};
use crate::repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
use log::{debug, error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::watch;

/// Live view over the task table. Holds the latest snapshot only.
pub type TaskSubscription = watch::Receiver<Vec<Task>>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage faults raised by the item store.
///
/// None of these are retried; the committed state before the failing call is
/// left untouched.
#[derive(Debug)]
pub enum StoreError {
    /// SQLite or database file failure.
    Db(DbError),
    /// A persisted row violates the task model.
    InvalidData(String),
    /// The connection does not carry the expected schema.
    Schema(RepoError),
    /// A previous holder of the connection panicked mid-operation.
    LockPoisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "task store connection lock is poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::InvalidData(_) | Self::LockPoisoned => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(err) => Self::Db(err),
            RepoError::InvalidData(message) => Self::InvalidData(message),
            other => Self::Schema(other),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Narrow store interface the controller is written against.
pub trait TaskStore: Send + Sync {
    /// Persists a draft and returns it with its assigned id.
    fn insert(&self, draft: TaskDraft) -> StoreResult<Task>;
    /// Subscribes to full-table snapshots, ordered by insertion.
    fn observe_all(&self) -> TaskSubscription;
    /// Replaces the row with `task.id`. Missing ids are ignored.
    fn update(&self, task: &Task) -> StoreResult<()>;
    /// Removes every checked row.
    fn delete_where_checked(&self) -> StoreResult<()>;
}

/// SQLite-backed item store.
pub struct ItemStore {
    conn: Mutex<Connection>,
    snapshots: watch::Sender<Vec<Task>>,
}

impl ItemStore {
    /// Opens (creating if absent) the database file and loads the first snapshot.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `Schema` when the connection was not opened through `db::open_db*`.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        let initial = SqliteTaskRepository::try_new(&conn)?.list_tasks()?;
        info!(
            "event=store_init module=store status=ok task_count={}",
            initial.len()
        );
        let (snapshots, _) = watch::channel(initial);
        Ok(Self {
            conn: Mutex::new(conn),
            snapshots,
        })
    }

    /// Returns the latest published snapshot.
    pub fn snapshot(&self) -> Vec<Task> {
        self.snapshots.borrow().clone()
    }

    /// Reads one row straight from storage.
    pub fn get(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let conn = self.lock()?;
        let task = SqliteTaskRepository::new(&conn).get_task(id)?;
        Ok(task)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.snapshots.receiver_count()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            error!("event=store_lock module=store status=error error_code=lock_poisoned");
            StoreError::LockPoisoned
        })
    }

    fn mutate<T>(
        &self,
        event: &'static str,
        op: impl FnOnce(&SqliteTaskRepository<'_>) -> RepoResult<T>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let mut conn = self.lock()?;

        match apply_and_reload(&mut conn, op) {
            Ok((value, snapshot)) => {
                let task_count = snapshot.len();
                self.snapshots.send_replace(snapshot);
                debug!(
                    "event={} module=store status=published task_count={} subscribers={} duration_ms={}",
                    event,
                    task_count,
                    self.snapshots.receiver_count(),
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                error!(
                    "event={} module=store status=error duration_ms={} error={}",
                    event,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Runs `op` and re-reads the table in one transaction.
fn apply_and_reload<T>(
    conn: &mut Connection,
    op: impl FnOnce(&SqliteTaskRepository<'_>) -> RepoResult<T>,
) -> StoreResult<(T, Vec<Task>)> {
    let tx = conn.transaction()?;
    let (value, snapshot) = {
        let repo = SqliteTaskRepository::new(&tx);
        let value = op(&repo)?;
        (value, repo.list_tasks()?)
    };
    tx.commit()?;
    Ok((value, snapshot))
}

impl TaskStore for ItemStore {
    fn insert(&self, draft: TaskDraft) -> StoreResult<Task> {
        let task = self.mutate("task_insert", |repo| repo.insert_task(&draft))?;
        info!("event=task_insert module=store status=ok id={}", task.id);
        Ok(task)
    }

    fn observe_all(&self) -> TaskSubscription {
        self.snapshots.subscribe()
    }

    fn update(&self, task: &Task) -> StoreResult<()> {
        let changed = self.mutate("task_update", |repo| repo.update_task(task))?;
        info!(
            "event=task_update module=store status=ok id={} changed={} is_checked={}",
            task.id, changed, task.is_checked
        );
        Ok(())
    }

    fn delete_where_checked(&self) -> StoreResult<()> {
        let removed = self.mutate("task_delete_checked", |repo| repo.delete_checked_tasks())?;
        info!(
            "event=task_delete_checked module=store status=ok removed={}",
            removed
        );
        Ok(())
    }
}
