//! Synchronous segment store over a plain `rusqlite::Connection`.
//!
//! The engine worker thread owns a connection and calls these directly; the async
//! wrappers in [`crate::db`] run the same functions on a `tokio_rusqlite` connection.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::checks;
use crate::error::StoreError;
use crate::filter::SegmentMatcher;
use crate::sort::SortSpec;
use crate::types::{ErrorRow, MetaEntry, Segment, SegmentDraft, SegmentState, StoredMeta};

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Replaces the whole document atomically. Segment indices restart at 1 in draft order.
///
/// # Errors
///
/// Returns `StoreError::Database` if any statement fails; nothing is committed then.
pub fn replace_document(
    db: &mut Connection,
    project: &str,
    source_path: &str,
    drafts: &[SegmentDraft],
) -> Result<usize, StoreError> {
    let tx = db.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute("DELETE FROM meta", [])?;
    tx.execute("DELETE FROM segments", [])?;
    tx.execute("DELETE FROM document", [])?;
    tx.execute(
        "INSERT INTO document (project, source_path, imported_at) VALUES (?1, ?2, ?3)",
        params![project, source_path, now_secs()],
    )?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO segments (idx, file, unit, source, target, state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for (i, draft) in drafts.iter().enumerate() {
            stmt.execute(params![
                i as i64 + 1,
                &draft.file,
                &draft.unit,
                &draft.source,
                &draft.target,
                draft.effective_state().as_str(),
            ])?;
        }
    }
    tx.commit()?;
    tracing::info!(project, segments = drafts.len(), "document imported");
    Ok(drafts.len())
}

/// Project name of the loaded document, if any.
pub fn project_name(db: &Connection) -> Result<Option<String>, StoreError> {
    Ok(db
        .query_row("SELECT project FROM document LIMIT 1", [], |r| r.get(0))
        .optional()?)
}

pub fn segment_count(db: &Connection) -> Result<usize, StoreError> {
    let n: i64 = db.query_row("SELECT COUNT(*) FROM segments", [], |r| r.get(0))?;
    Ok(n as usize)
}

/// Every segment in document order, with error flags computed from the text.
pub fn load_segments(db: &Connection) -> Result<Vec<Segment>, StoreError> {
    let mut stmt = db.prepare(
        "SELECT idx, file, unit, source, target, state FROM segments ORDER BY idx",
    )?;
    let rows = stmt
        .query_map([], |r| {
            let state: String = r.get(5)?;
            let source: String = r.get(3)?;
            let target: String = r.get(4)?;
            Ok(Segment {
                index: r.get(0)?,
                file: r.get(1)?,
                unit: r.get(2)?,
                tag_errors: checks::tag_error(&source, &target).is_some(),
                space_errors: checks::space_error(&source, &target).is_some(),
                source,
                target,
                state: SegmentState::parse(&state).unwrap_or_default(),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Filtered and sorted view of the document.
pub fn view(
    db: &Connection,
    matcher: &SegmentMatcher,
    sort: &SortSpec,
) -> Result<Vec<Segment>, StoreError> {
    let mut segments: Vec<Segment> =
        load_segments(db)?.into_iter().filter(|s| matcher.matches(s)).collect();
    segments.sort_by(|a, b| sort.compare(a, b));
    Ok(segments)
}

pub fn segment_exists(db: &Connection, index: u32) -> Result<bool, StoreError> {
    Ok(db
        .query_row("SELECT 1 FROM segments WHERE idx = ?1", params![index], |_| Ok(()))
        .optional()?
        .is_some())
}

fn error_rows(
    db: &Connection,
    check: fn(&str, &str) -> Option<&'static str>,
) -> Result<Vec<ErrorRow>, StoreError> {
    let mut stmt = db.prepare("SELECT idx, source, target FROM segments ORDER BY idx")?;
    let rows = stmt
        .query_map([], |r| {
            let index: u32 = r.get(0)?;
            let source: String = r.get(1)?;
            let target: String = r.get(2)?;
            Ok(check(&source, &target).map(|kind| ErrorRow::new(index, kind)))
        })?
        .filter_map(|row| row.transpose())
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Segments whose inline tags differ between source and target, in document order.
pub fn tag_errors(db: &Connection) -> Result<Vec<ErrorRow>, StoreError> {
    error_rows(db, checks::tag_error)
}

/// Segments whose leading/trailing whitespace differs, in document order.
pub fn space_errors(db: &Connection) -> Result<Vec<ErrorRow>, StoreError> {
    error_rows(db, checks::space_error)
}

/// Rewrites every target with a whitespace defect. Returns how many segments changed.
pub fn fix_space_errors(db: &mut Connection) -> Result<usize, StoreError> {
    let tx = db.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let pending: Vec<(u32, String)> = {
        let mut stmt = tx.prepare("SELECT idx, source, target FROM segments")?;
        let rows = stmt
            .query_map([], |r| {
                let index: u32 = r.get(0)?;
                let source: String = r.get(1)?;
                let target: String = r.get(2)?;
                if checks::space_error(&source, &target).is_none() {
                    return Ok(None);
                }
                let fixed = checks::fix_spaces(&source, &target);
                Ok((fixed != target).then_some((index, fixed)))
            })?
            .filter_map(|row| row.transpose())
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows
    };
    let mut changed = 0;
    for (index, target) in &pending {
        changed += tx.execute(
            "UPDATE segments SET target = ?1 WHERE idx = ?2",
            params![target, index],
        )?;
    }
    tx.commit()?;
    tracing::info!(changed, "fixed whitespace errors");
    Ok(changed)
}

fn meta_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<StoredMeta> {
    Ok(StoredMeta {
        id: r.get(0)?,
        segment: r.get(1)?,
        entry: MetaEntry { kind: r.get(2)?, value: r.get(3)? },
    })
}

/// Metadata for `segment`, oldest first.
pub fn list_meta(db: &Connection, segment: u32) -> Result<Vec<StoredMeta>, StoreError> {
    let mut stmt = db.prepare(
        "SELECT id, segment_idx, type, value FROM meta
         WHERE segment_idx = ?1 ORDER BY created_at, rowid",
    )?;
    let rows = stmt
        .query_map(params![segment], meta_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Appends a metadata entry.
///
/// # Errors
///
/// `StoreError::SegmentNotFound` if `segment` is not in the document.
pub fn add_meta(
    db: &Connection,
    segment: u32,
    entry: MetaEntry,
) -> Result<StoredMeta, StoreError> {
    if !segment_exists(db, segment)? {
        return Err(StoreError::SegmentNotFound(segment));
    }
    let id = uuid::Uuid::new_v4().to_string();
    db.execute(
        "INSERT INTO meta (id, segment_idx, type, value, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![&id, segment, &entry.kind, &entry.value, now_secs()],
    )?;
    Ok(StoredMeta { id, segment, entry })
}

/// Updates an existing metadata entry in place.
///
/// # Errors
///
/// `StoreError::MetaNotFound` if no entry has `id`.
pub fn edit_meta(db: &Connection, id: &str, entry: MetaEntry) -> Result<StoredMeta, StoreError> {
    let updated = db.execute(
        "UPDATE meta SET type = ?1, value = ?2 WHERE id = ?3",
        params![&entry.kind, &entry.value, id],
    )?;
    if updated == 0 {
        return Err(StoreError::MetaNotFound(id.to_owned()));
    }
    let stored = db.query_row(
        "SELECT id, segment_idx, type, value FROM meta WHERE id = ?1",
        params![id],
        meta_from_row,
    )?;
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterSpec;
    use crate::sort::SortOption;
    use crate::types::LanguageSide;

    fn draft(source: &str, target: &str) -> SegmentDraft {
        SegmentDraft {
            file: "ui.xlf".into(),
            unit: source.into(),
            source: source.into(),
            target: target.into(),
            state: None,
        }
    }

    fn seeded() -> Connection {
        let mut db = Connection::open_in_memory().unwrap();
        crate::schema::migrate(&mut db).unwrap();
        replace_document(
            &mut db,
            "demo",
            "demo.toml",
            &[
                draft("<b>Save</b>", "Guardar"),
                draft(" Open", "Abrir "),
                draft("Close", "Cerrar"),
                draft("Quit", ""),
            ],
        )
        .unwrap();
        db
    }

    #[test]
    fn import_assigns_indices_and_states() {
        let db = seeded();
        let segments = load_segments(&db).unwrap();
        let indices: Vec<u32> = segments.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert_eq!(segments[3].state, SegmentState::Untranslated);
        assert_eq!(segments[0].state, SegmentState::Translated);
        assert!(segments[0].tag_errors);
        assert!(segments[1].space_errors);
        assert_eq!(project_name(&db).unwrap().as_deref(), Some("demo"));
    }

    #[test]
    fn error_lists_are_in_document_order() {
        let db = seeded();
        assert_eq!(tag_errors(&db).unwrap(), vec![ErrorRow::new(1, "Missing tags")]);
        assert_eq!(
            space_errors(&db).unwrap(),
            vec![ErrorRow::new(2, "Initial and trailing space")]
        );
    }

    #[test]
    fn fix_spaces_clears_space_errors() {
        let mut db = seeded();
        assert_eq!(fix_space_errors(&mut db).unwrap(), 1);
        assert!(space_errors(&db).unwrap().is_empty());
        let fixed = &load_segments(&db).unwrap()[1];
        assert_eq!(fixed.target, " Abrir");
    }

    #[test]
    fn whitespace_only_target_is_neither_reported_nor_fixed() {
        let mut db = Connection::open_in_memory().unwrap();
        crate::schema::migrate(&mut db).unwrap();
        replace_document(&mut db, "demo", "demo.toml", &[draft("Hello", "   ")]).unwrap();
        assert!(space_errors(&db).unwrap().is_empty());
        assert_eq!(fix_space_errors(&mut db).unwrap(), 0);
        assert_eq!(load_segments(&db).unwrap()[0].target, "   ");
    }

    #[test]
    fn view_filters_and_sorts() {
        let db = seeded();
        let spec = FilterSpec {
            filter_text: "r".into(),
            filter_language: Some(LanguageSide::Target),
            ..FilterSpec::cleared()
        };
        let sort = SortSpec { sort_option: SortOption::Target, sort_desc: false };
        let rows = view(&db, &spec.matcher().unwrap(), &sort).unwrap();
        let targets: Vec<&str> = rows.iter().map(|s| s.target.as_str()).collect();
        assert_eq!(targets, vec!["Abrir ", "Cerrar", "Guardar"]);
    }

    #[test]
    fn meta_add_then_edit() {
        let db = seeded();
        let entry = MetaEntry { kind: "reviewer".into(), value: "ana".into() };
        let stored = add_meta(&db, 2, entry).unwrap();
        let edited = edit_meta(
            &db,
            &stored.id,
            MetaEntry { kind: "reviewer".into(), value: "luis".into() },
        )
        .unwrap();
        assert_eq!(edited.segment, 2);
        assert_eq!(list_meta(&db, 2).unwrap(), vec![edited]);
        assert!(list_meta(&db, 3).unwrap().is_empty());
    }

    #[test]
    fn meta_errors_name_the_missing_thing() {
        let db = seeded();
        let entry = MetaEntry { kind: "k".into(), value: "v".into() };
        assert!(matches!(add_meta(&db, 99, entry.clone()), Err(StoreError::SegmentNotFound(99))));
        assert!(matches!(edit_meta(&db, "nope", entry), Err(StoreError::MetaNotFound(_))));
    }
}
