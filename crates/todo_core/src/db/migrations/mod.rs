//! Versioned schema for the task database.
//!
//! # Invariants
//! - Steps are listed in strictly increasing `version` order starting at 1.
//! - `PRAGMA user_version` always equals the last applied step.
//! - All pending steps commit together or not at all.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: [Migration; 1] = [Migration {
    version: 1,
    name: "init_tasks",
    sql: include_str!("0001_init.sql"),
}];

/// Schema version this build writes and expects.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |step| step.version)
}

/// Reads `PRAGMA user_version` from `conn`.
pub fn schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this build.
/// - `Sqlite` when a step fails; the schema is then left as it was.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let steps: Vec<&Migration> = pending(from).collect();
    if steps.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &steps {
        debug!(
            "event=db_migrate_step module=db version={} name={}",
            step.version, step.name
        );
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        from,
        latest,
        steps.len()
    );
    Ok(())
}

fn pending(applied: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS.iter().filter(move |step| step.version > applied)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, pending, schema_version, MIGRATIONS};
    use rusqlite::Connection;

    #[test]
    fn versions_start_at_one_and_increase() {
        let versions: Vec<u32> = MIGRATIONS.iter().map(|step| step.version).collect();
        assert_eq!(versions.first(), Some(&1));
        assert!(versions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn pending_skips_applied_steps() {
        assert_eq!(pending(0).count(), MIGRATIONS.len());
        assert_eq!(pending(latest_version()).count(), 0);
    }

    #[test]
    fn reapplying_on_current_schema_changes_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        apply_migrations(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn failing_step_leaves_version_untouched() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE tasks (id INTEGER);").unwrap();

        assert!(apply_migrations(&mut conn).is_err());
        assert_eq!(schema_version(&conn).unwrap(), 0);
    }
}
