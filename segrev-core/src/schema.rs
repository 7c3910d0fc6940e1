/// DDL to create the schema_version tracking table.
///
/// Applied unconditionally on every DB open (before checking the version),
/// using `IF NOT EXISTS` so it is safe to run multiple times.
pub const SCHEMA_VERSION_DDL: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    ) STRICT;
";

/// DDL for the v1 schema.
///
/// - `document`: at most one row naming the project the segments belong to.
/// - `segments`: one row per translation unit, keyed by its 1-based document index.
/// - `meta`: user metadata entries attached to a segment, keyed by UUID v4 text.
///
/// Tag/space error flags are not stored; they are recomputed from source and target on
/// every read so they can never go stale after an edit.
pub const SCHEMA_V1_SQL: &str = "
    CREATE TABLE IF NOT EXISTS document (
        project      TEXT    PRIMARY KEY,
        source_path  TEXT    NOT NULL,
        imported_at  INTEGER NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS segments (
        idx     INTEGER PRIMARY KEY CHECK(idx > 0),
        file    TEXT    NOT NULL,
        unit    TEXT    NOT NULL,
        source  TEXT    NOT NULL,
        target  TEXT    NOT NULL DEFAULT '',
        state   TEXT    NOT NULL
                        CHECK(state IN ('untranslated', 'translated', 'confirmed'))
    ) STRICT;

    CREATE TABLE IF NOT EXISTS meta (
        id          TEXT    PRIMARY KEY,
        segment_idx INTEGER NOT NULL REFERENCES segments(idx) ON DELETE CASCADE,
        type        TEXT    NOT NULL,
        value       TEXT    NOT NULL,
        created_at  INTEGER NOT NULL
    ) STRICT;
";

/// Runs forward-only schema migration to the latest version.
///
/// Idempotent: safe on every startup.
///
/// # Errors
///
/// Returns `rusqlite::Error` if the DDL fails or the version row cannot be read.
pub fn migrate(db: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    db.execute_batch(SCHEMA_VERSION_DDL)?;

    let version: i64 = db
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if version < 1 {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute_batch(SCHEMA_V1_SQL)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        tx.commit()?;
        tracing::info!("applied schema v1");
    }

    Ok(())
}
