//! Integration test for the segment store lifecycle.
//!
//! Exercises: open_db, migrate, import_document, the blocking store API on a second
//! connection (as the engine worker uses it), fix-spaces, and persistence across opens.

use segrev_core::types::{ErrorRow, MetaEntry};
use segrev_core::{db, document, store};

const DOC: &str = r#"
project = "manual"

[[segment]]
file = "ui.xlf"
unit = "save"
source = "<b>Save</b>"
target = "Guardar"

[[segment]]
file = "ui.xlf"
unit = "open"
source = "Open "
target = "Abrir"
state = "confirmed"

[[segment]]
file = "ui.xlf"
unit = "quit"
source = "Quit"
"#;

fn temp_db_path() -> (tempfile::TempDir, String) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("segments.db").to_string_lossy().to_string();
    (dir, path)
}

#[tokio::test]
async fn full_store_lifecycle() {
    let (_dir, path) = temp_db_path();
    let conn = db::open_db(&path).await.unwrap();

    let version: i64 = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(db.query_row(
                "SELECT MAX(version) FROM schema_version",
                [],
                |r| r.get(0),
            )?)
        })
        .await
        .unwrap();
    assert_eq!(version, 1, "schema_version should be 1");

    let journal: String = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(
                db.query_row("PRAGMA journal_mode", [], |r| r.get(0))?,
            )
        })
        .await
        .unwrap();
    assert_eq!(journal, "wal", "journal_mode should be wal");

    assert_eq!(db::stored_project(&conn).await.unwrap(), None, "fresh db has no document");

    let doc = document::parse_document(DOC).unwrap();
    let imported = db::import_document(&conn, "manual", "doc.toml", doc.segments)
        .await
        .unwrap();
    assert_eq!(imported, 3);
    assert_eq!(db::segment_count(&conn).await.unwrap(), 3);
    assert_eq!(db::stored_project(&conn).await.unwrap().as_deref(), Some("manual"));

    // Second, blocking connection to the same WAL file, as the engine worker opens it.
    let mut worker = rusqlite::Connection::open(&path).unwrap();
    db::configure(&worker).unwrap();

    assert_eq!(store::tag_errors(&worker).unwrap(), vec![ErrorRow::new(1, "Missing tags")]);
    assert_eq!(store::space_errors(&worker).unwrap(), vec![ErrorRow::new(2, "Trailing space")]);

    assert_eq!(store::fix_space_errors(&mut worker).unwrap(), 1);
    assert!(store::space_errors(&worker).unwrap().is_empty(), "fix clears space errors");

    let stored = store::add_meta(
        &worker,
        1,
        MetaEntry { kind: "x-reviewer".into(), value: "ana".into() },
    )
    .unwrap();
    assert!(!stored.id.is_empty(), "meta id should be a non-empty UUID");

    // Persistence across opens.
    drop(worker);
    let conn2 = db::open_db(&path).await.unwrap();
    assert_eq!(db::segment_count(&conn2).await.unwrap(), 3);
    let target: String = conn2
        .call(|db| {
            Ok::<_, rusqlite::Error>(db.query_row(
                "SELECT target FROM segments WHERE idx = 2",
                [],
                |r| r.get(0),
            )?)
        })
        .await
        .unwrap();
    assert_eq!(target, "Abrir ", "fixed target should persist");
}

#[tokio::test]
async fn reimport_replaces_document_and_meta() {
    let (_dir, path) = temp_db_path();
    let conn = db::open_db(&path).await.unwrap();
    let doc = document::parse_document(DOC).unwrap();
    db::import_document(&conn, "manual", "doc.toml", doc.segments.clone())
        .await
        .unwrap();

    {
        let worker = rusqlite::Connection::open(&path).unwrap();
        db::configure(&worker).unwrap();
        store::add_meta(&worker, 2, MetaEntry { kind: "note".into(), value: "v".into() }).unwrap();
    }

    db::import_document(&conn, "other", "doc2.toml", doc.segments[..1].to_vec())
        .await
        .unwrap();
    assert_eq!(db::segment_count(&conn).await.unwrap(), 1);
    assert_eq!(db::stored_project(&conn).await.unwrap().as_deref(), Some("other"));

    let meta_rows: i64 = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(
                db.query_row("SELECT COUNT(*) FROM meta", [], |r| r.get(0))?,
            )
        })
        .await
        .unwrap();
    assert_eq!(meta_rows, 0, "re-import drops old metadata");
}
