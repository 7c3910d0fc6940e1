use std::time::Duration;

use tokio_rusqlite::Connection;

use crate::error::StoreError;
use crate::store;
use crate::types::SegmentDraft;

/// Applies the per-connection pragmas every segrev connection needs.
///
/// Shared by the async startup connection and the engine worker's blocking connection,
/// so both see WAL mode, foreign keys, and the same busy timeout.
pub fn configure(db: &rusqlite::Connection) -> rusqlite::Result<()> {
    db.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA synchronous=NORMAL;
         PRAGMA foreign_keys=ON;",
    )?;
    db.busy_timeout(Duration::from_secs(5))?;
    Ok(())
}

/// Opens (or creates) the segment database at `path`, configures WAL mode,
/// and applies schema migrations.
///
/// Called once from the UI process before the first frame. The engine worker opens its
/// own blocking connection to the same file afterwards.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the file cannot be opened, WAL configuration
/// fails, or schema DDL fails.
pub async fn open_db(path: &str) -> Result<Connection, tokio_rusqlite::Error> {
    let conn = Connection::open(path).await?;

    conn.call(|db| {
        configure(db)?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    // Leftover WAL from a previous run.
    conn.call(|db| {
        db.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    conn.call(|db| {
        crate::schema::migrate(db)?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    Ok(conn)
}

/// Replaces the stored document with `drafts` under `project`.
///
/// # Errors
///
/// Returns `StoreError` if the import transaction fails.
pub async fn import_document(
    conn: &Connection,
    project: &str,
    source_path: &str,
    drafts: Vec<SegmentDraft>,
) -> Result<usize, StoreError> {
    let project = project.to_owned();
    let source_path = source_path.to_owned();
    let imported = conn
        .call(move |db| store::replace_document(db, &project, &source_path, &drafts))
        .await;
    flatten(imported)
}

/// Project name of the stored document, if one was ever imported.
pub async fn stored_project(conn: &Connection) -> Result<Option<String>, StoreError> {
    flatten(conn.call(|db| store::project_name(db)).await)
}

/// Number of segments in the stored document.
pub async fn segment_count(conn: &Connection) -> Result<usize, StoreError> {
    flatten(conn.call(|db| store::segment_count(db)).await)
}

/// Unwraps a `call` whose closure already returns `StoreError`.
fn flatten<T>(result: Result<T, tokio_rusqlite::Error<StoreError>>) -> Result<T, StoreError> {
    match result {
        Ok(value) => Ok(value),
        Err(tokio_rusqlite::Error::Error(e)) => Err(e),
        Err(tokio_rusqlite::Error::ConnectionClosed) => {
            Err(StoreError::DatabaseTask(tokio_rusqlite::Error::ConnectionClosed))
        }
        Err(tokio_rusqlite::Error::Close(closing)) => {
            Err(StoreError::DatabaseTask(tokio_rusqlite::Error::Close(closing)))
        }
        Err(other) => Err(StoreError::Io(std::io::Error::other(other.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_connection_is_a_task_error() {
        let closed: Result<(), tokio_rusqlite::Error<StoreError>> =
            Err(tokio_rusqlite::Error::ConnectionClosed);
        assert!(matches!(
            flatten(closed),
            Err(StoreError::DatabaseTask(tokio_rusqlite::Error::ConnectionClosed))
        ));
    }

    #[test]
    fn closure_errors_pass_through() {
        let missing: Result<(), tokio_rusqlite::Error<StoreError>> =
            Err(tokio_rusqlite::Error::Error(StoreError::SegmentNotFound(7)));
        assert!(matches!(flatten(missing), Err(StoreError::SegmentNotFound(7))));
    }
}
