//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the four persistence primitives over the `tasks` table, plus
//!   point lookup.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Ids come from `AUTOINCREMENT` and are never supplied by callers on insert.
//! - Updates and deletes matching zero rows are successful no-ops.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing order is ascending `id`, i.e. insertion order.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::task::{Task, TaskDraft, TaskId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    name,
    detail,
    is_checked
FROM tasks";

const REQUIRED_TASK_COLUMNS: &[&str] = &["id", "name", "detail", "is_checked"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for task persistence.
pub trait TaskRepository {
    fn insert_task(&self, draft: &TaskDraft) -> RepoResult<Task>;
    fn update_task(&self, task: &Task) -> RepoResult<bool>;
    fn delete_checked_tasks(&self) -> RepoResult<usize>;
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
}

/// SQLite-backed task repository borrowing an open connection.
///
/// Works on a plain connection as well as on a transaction, which derefs to one.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a connection that already went through `db::open_db*`.
    ///
    /// Skips schema checks; prefer [`SqliteTaskRepository::try_new`] for
    /// connections of unknown origin.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after verifying its schema is usable.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when `tasks` is absent
    ///   or incomplete.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, draft: &TaskDraft) -> RepoResult<Task> {
        self.conn.execute(
            "INSERT INTO tasks (
                name,
                detail
            ) VALUES (?1, ?2);",
            params![draft.name.as_str(), draft.detail.as_str()],
        )?;

        Ok(draft.clone().into_task(self.conn.last_insert_rowid()))
    }

    fn update_task(&self, task: &Task) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                name = ?1,
                detail = ?2,
                is_checked = ?3
             WHERE id = ?4;",
            params![
                task.name.as_str(),
                task.detail.as_str(),
                bool_to_int(task.is_checked),
                task.id,
            ],
        )?;

        Ok(changed > 0)
    }

    fn delete_checked_tasks(&self) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM tasks WHERE is_checked = 1;", [])?;
        Ok(removed)
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{TASK_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }
}

fn ensure_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'tasks';",
            [],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !table_exists {
        return Err(RepoError::MissingRequiredTable("tasks"));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('tasks');")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in REQUIRED_TASK_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let is_checked = match row.get::<_, i64>("is_checked")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_checked value `{other}` in tasks.is_checked"
            )));
        }
    };

    Ok(Task {
        id: row.get("id")?,
        name: row.get("name")?,
        detail: row.get("detail")?,
        is_checked,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
