//! Background thread that owns the engine's SQLite connection.
//!
//! All communication is via channels: `Envelope` in, `AppEvent::Engine` out. One request
//! can produce more than one reply (a bulk fix is followed by the re-rendered segment list),
//! and every reply echoes the id of the request that caused it.

use std::path::PathBuf;

use crossbeam_channel::Receiver;
use rusqlite::Connection;
use segrev_core::error::StoreError;
use segrev_core::filter::SegmentMatcher;
use segrev_core::protocol::{EngineRequest, EngineResponse, Envelope, Reply};
use segrev_core::sort::SortSpec;
use segrev_core::{db, store};
use tokio::sync::mpsc::UnboundedSender;

use crate::event::AppEvent;

/// Entry point for the engine thread.
///
/// Opens its own connection to `db_path` and loops over incoming envelopes until the
/// channel is closed (sender dropped).
pub fn engine_worker_loop(
    db_path: PathBuf,
    project: String,
    rx: Receiver<Envelope>,
    event_tx: UnboundedSender<AppEvent>,
) {
    let conn = match Connection::open(&db_path).and_then(|c| db::configure(&c).map(|()| c)) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(path = %db_path.display(), error = %e, "engine cannot open database");
            let _ = event_tx.send(AppEvent::EngineStopped(e.to_string()));
            return;
        }
    };
    let mut engine = Engine::new(conn, project);
    tracing::info!(path = %db_path.display(), "engine worker started");

    for envelope in rx {
        let id = envelope.id;
        for response in engine.handle(envelope) {
            tracing::debug!(request = %id, topic = response.topic(), "engine reply");
            if event_tx.send(AppEvent::Engine(Box::new(Reply { request: id, response }))).is_err() {
                return;
            }
        }
    }
    tracing::info!("engine worker stopped");
}

/// Engine state: the connection plus the active view options.
pub struct Engine {
    db: Connection,
    project: String,
    matcher: SegmentMatcher,
    sort: SortSpec,
}

impl Engine {
    pub fn new(db: Connection, project: String) -> Self {
        Self { db, project, matcher: SegmentMatcher::all(), sort: SortSpec::cleared() }
    }

    /// Answers one envelope. Store errors become a `failed` reply naming the topic.
    pub fn handle(&mut self, envelope: Envelope) -> Vec<EngineResponse> {
        let topic = envelope.request.topic();
        tracing::debug!(request = %envelope.id, topic, "engine request");
        if envelope.context.project != self.project {
            tracing::warn!(project = %envelope.context.project, "request for unknown project");
            return vec![EngineResponse::Failed {
                topic,
                message: format!("Unknown project '{}'", envelope.context.project),
            }];
        }
        match self.dispatch(envelope.request) {
            Ok(responses) => responses,
            Err(e) => {
                tracing::warn!(topic, error = %e, "engine request failed");
                vec![EngineResponse::Failed { topic, message: e.to_string() }]
            }
        }
    }

    fn dispatch(&mut self, request: EngineRequest) -> Result<Vec<EngineResponse>, StoreError> {
        Ok(match request {
            EngineRequest::GetSegments => vec![self.segments()?],
            EngineRequest::FilterOptions(spec) => {
                // Panels validate before sending; a bad pattern here is still answered.
                match spec.matcher() {
                    Ok(matcher) => self.matcher = matcher,
                    Err(e) => {
                        return Ok(vec![EngineResponse::Failed {
                            topic: "filter-options",
                            message: e.to_string(),
                        }]);
                    }
                }
                vec![self.segments()?]
            }
            EngineRequest::SortOptions(spec) => {
                self.sort = spec;
                vec![self.segments()?]
            }
            EngineRequest::GoToSegment { segment } => {
                if !store::segment_exists(&self.db, segment)? {
                    return Err(StoreError::SegmentNotFound(segment));
                }
                vec![EngineResponse::Focus { segment }]
            }
            EngineRequest::GetTagErrors => {
                vec![EngineResponse::TagErrors { errors: store::tag_errors(&self.db)? }]
            }
            EngineRequest::GetSpaceErrors => {
                vec![EngineResponse::SpaceErrors { errors: store::space_errors(&self.db)? }]
            }
            EngineRequest::FixSpaceErrors => {
                let changed = store::fix_space_errors(&mut self.db)?;
                vec![EngineResponse::SpacesFixed { changed }, self.segments()?]
            }
            EngineRequest::GetMeta { segment } => vec![self.meta(segment)?],
            EngineRequest::AddMeta { segment, entry } => {
                let stored = store::add_meta(&self.db, segment, entry)?;
                let listing = self.meta(stored.segment)?;
                vec![EngineResponse::MetaSaved { stored }, listing]
            }
            EngineRequest::EditMeta { id, entry } => {
                let stored = store::edit_meta(&self.db, &id, entry)?;
                let listing = self.meta(stored.segment)?;
                vec![EngineResponse::MetaSaved { stored }, listing]
            }
        })
    }

    fn segments(&self) -> Result<EngineResponse, StoreError> {
        let segments = store::view(&self.db, &self.matcher, &self.sort)?;
        let total = store::segment_count(&self.db)?;
        Ok(EngineResponse::Segments { segments, total })
    }

    fn meta(&self, segment: u32) -> Result<EngineResponse, StoreError> {
        Ok(EngineResponse::Meta { segment, entries: store::list_meta(&self.db, segment)? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segrev_core::filter::FilterSpec;
    use segrev_core::protocol::{EngineContext, RequestId};
    use segrev_core::types::{ErrorRow, LanguageSide, MetaEntry, SegmentDraft};

    fn draft(source: &str, target: &str) -> SegmentDraft {
        SegmentDraft {
            file: "ui.xlf".into(),
            unit: source.into(),
            source: source.into(),
            target: target.into(),
            state: None,
        }
    }

    fn engine() -> Engine {
        let mut db = Connection::open_in_memory().unwrap();
        segrev_core::schema::migrate(&mut db).unwrap();
        store::replace_document(
            &mut db,
            "demo",
            "demo.toml",
            &[draft("<b>Save</b>", "Guardar"), draft("Open ", "Abrir"), draft("Quit", "")],
        )
        .unwrap();
        Engine::new(db, "demo".into())
    }

    fn send(engine: &mut Engine, request: EngineRequest) -> Vec<EngineResponse> {
        engine.handle(Envelope { id: RequestId(1), context: EngineContext::new("demo"), request })
    }

    #[test]
    fn other_project_is_refused() {
        let mut engine = engine();
        let replies = engine.handle(Envelope {
            id: RequestId(1),
            context: EngineContext::new("elsewhere"),
            request: EngineRequest::GetTagErrors,
        });
        assert_eq!(
            replies,
            vec![EngineResponse::Failed {
                topic: "get-tagsErrors",
                message: "Unknown project 'elsewhere'".into()
            }]
        );
    }

    #[test]
    fn filter_is_remembered_for_later_renders() {
        let mut engine = engine();
        let spec = FilterSpec {
            filter_text: "abrir".into(),
            filter_language: Some(LanguageSide::Target),
            ..FilterSpec::cleared()
        };
        send(&mut engine, EngineRequest::FilterOptions(spec));
        match send(&mut engine, EngineRequest::GetSegments).as_slice() {
            [EngineResponse::Segments { segments, total }] => {
                assert_eq!(*total, 3);
                assert_eq!(segments.len(), 1);
                assert_eq!(segments[0].index, 2);
            }
            other => panic!("unexpected replies: {other:?}"),
        }
    }

    #[test]
    fn go_to_unknown_segment_fails() {
        let mut engine = engine();
        assert_eq!(
            send(&mut engine, EngineRequest::GoToSegment { segment: 2 }),
            vec![EngineResponse::Focus { segment: 2 }]
        );
        assert_eq!(
            send(&mut engine, EngineRequest::GoToSegment { segment: 40 }),
            vec![EngineResponse::Failed {
                topic: "go-to-segment",
                message: "Segment 40 does not exist".into()
            }]
        );
    }

    #[test]
    fn fix_spaces_reports_and_rerenders() {
        let mut engine = engine();
        assert_eq!(
            send(&mut engine, EngineRequest::GetSpaceErrors),
            vec![EngineResponse::SpaceErrors { errors: vec![ErrorRow::new(2, "Trailing space")] }]
        );
        let replies = send(&mut engine, EngineRequest::FixSpaceErrors);
        assert_eq!(replies[0], EngineResponse::SpacesFixed { changed: 1 });
        assert!(matches!(replies[1], EngineResponse::Segments { .. }));
        assert_eq!(
            send(&mut engine, EngineRequest::GetSpaceErrors),
            vec![EngineResponse::SpaceErrors { errors: vec![] }]
        );
    }

    #[test]
    fn add_meta_replies_with_saved_entry_and_listing() {
        let mut engine = engine();
        let entry = MetaEntry { kind: "reviewer".into(), value: "ana".into() };
        let replies =
            send(&mut engine, EngineRequest::AddMeta { segment: 1, entry: entry.clone() });
        let stored = match &replies[0] {
            EngineResponse::MetaSaved { stored } => stored.clone(),
            other => panic!("unexpected reply: {other:?}"),
        };
        assert_eq!(stored.entry, entry);
        assert_eq!(replies[1], EngineResponse::Meta { segment: 1, entries: vec![stored] });
    }
}
