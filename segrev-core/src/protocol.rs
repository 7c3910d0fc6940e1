//! Typed messages exchanged with the engine.
//!
//! Every outbound message is an [`Envelope`]: a fresh [`RequestId`], the explicit
//! [`EngineContext`] it applies to, and one [`EngineRequest`]. Every inbound message is a
//! [`Reply`] echoing the id of the request that caused it, so a panel can discard replies
//! to requests it has since superseded.

use serde::{Deserialize, Serialize};

use crate::filter::FilterSpec;
use crate::sort::SortSpec;
use crate::types::{ErrorRow, MetaEntry, MetaId, Segment, StoredMeta};

/// Monotonically increasing request identifier. Ids are never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allocates [`RequestId`]s. One counter per session, shared by all panels.
#[derive(Debug, Default)]
pub struct RequestCounter {
    last: u64,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> RequestId {
        self.last += 1;
        RequestId(self.last)
    }
}

/// Engine state a request applies to, passed explicitly rather than held ambiently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineContext {
    pub project: String,
}

impl EngineContext {
    pub fn new(project: impl Into<String>) -> Self {
        Self { project: project.into() }
    }
}

/// Outbound requests, one variant per topic.
///
/// Serialized adjacently tagged: `{ topic = "go-to-segment", payload = { segment = 12 } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "payload")]
pub enum EngineRequest {
    /// Re-render the segment list with the active filter and sort.
    #[serde(rename = "get-segments")]
    GetSegments,
    #[serde(rename = "filter-options")]
    FilterOptions(FilterSpec),
    #[serde(rename = "sort-options")]
    SortOptions(SortSpec),
    #[serde(rename = "go-to-segment")]
    GoToSegment { segment: u32 },
    #[serde(rename = "get-tagsErrors")]
    GetTagErrors,
    #[serde(rename = "get-spaceErrors")]
    GetSpaceErrors,
    /// Bulk whitespace fix. No payload.
    #[serde(rename = "fix-spaceErrors")]
    FixSpaceErrors,
    #[serde(rename = "get-meta")]
    GetMeta { segment: u32 },
    #[serde(rename = "add-meta")]
    AddMeta { segment: u32, entry: MetaEntry },
    #[serde(rename = "edit-meta")]
    EditMeta { id: MetaId, entry: MetaEntry },
}

impl EngineRequest {
    /// Wire topic name.
    pub fn topic(&self) -> &'static str {
        match self {
            EngineRequest::GetSegments => "get-segments",
            EngineRequest::FilterOptions(_) => "filter-options",
            EngineRequest::SortOptions(_) => "sort-options",
            EngineRequest::GoToSegment { .. } => "go-to-segment",
            EngineRequest::GetTagErrors => "get-tagsErrors",
            EngineRequest::GetSpaceErrors => "get-spaceErrors",
            EngineRequest::FixSpaceErrors => "fix-spaceErrors",
            EngineRequest::GetMeta { .. } => "get-meta",
            EngineRequest::AddMeta { .. } => "add-meta",
            EngineRequest::EditMeta { .. } => "edit-meta",
        }
    }
}

/// A request bound to its id and context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: RequestId,
    pub context: EngineContext,
    pub request: EngineRequest,
}

/// Inbound responses, one variant per topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "topic", content = "payload")]
pub enum EngineResponse {
    /// Out-of-band re-render of the (filtered, sorted) segment list.
    #[serde(rename = "set-segments")]
    Segments { segments: Vec<Segment>, total: usize },
    /// Viewport should move to this 1-based segment.
    #[serde(rename = "segment-focus")]
    Focus { segment: u32 },
    #[serde(rename = "set-tagsErrors")]
    TagErrors { errors: Vec<ErrorRow> },
    #[serde(rename = "set-spaceErrors")]
    SpaceErrors { errors: Vec<ErrorRow> },
    #[serde(rename = "set-meta")]
    Meta { segment: u32, entries: Vec<StoredMeta> },
    #[serde(rename = "meta-saved")]
    MetaSaved { stored: StoredMeta },
    #[serde(rename = "spaces-fixed")]
    SpacesFixed { changed: usize },
    /// Engine-side failure for the request named by `topic`.
    #[serde(rename = "failed")]
    Failed { topic: &'static str, message: String },
}

impl EngineResponse {
    pub fn topic(&self) -> &'static str {
        match self {
            EngineResponse::Segments { .. } => "set-segments",
            EngineResponse::Focus { .. } => "segment-focus",
            EngineResponse::TagErrors { .. } => "set-tagsErrors",
            EngineResponse::SpaceErrors { .. } => "set-spaceErrors",
            EngineResponse::Meta { .. } => "set-meta",
            EngineResponse::MetaSaved { .. } => "meta-saved",
            EngineResponse::SpacesFixed { .. } => "spaces-fixed",
            EngineResponse::Failed { .. } => "failed",
        }
    }
}

/// A response tagged with the id of the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub request: RequestId,
    pub response: EngineResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_strictly_increasing() {
        let mut counter = RequestCounter::new();
        let a = counter.next_id();
        let b = counter.next_id();
        let c = counter.next_id();
        assert!(a < b && b < c);
        assert_eq!(a, RequestId(1));
    }

    #[test]
    fn topics_match_engine_names() {
        assert_eq!(EngineRequest::GetTagErrors.topic(), "get-tagsErrors");
        assert_eq!(EngineRequest::FixSpaceErrors.topic(), "fix-spaceErrors");
        assert_eq!(EngineRequest::GoToSegment { segment: 1 }.topic(), "go-to-segment");
        assert_eq!(EngineResponse::SpaceErrors { errors: vec![] }.topic(), "set-spaceErrors");
    }

    #[test]
    fn envelope_serializes_with_topic_tag() {
        let envelope = Envelope {
            id: RequestId(7),
            context: EngineContext::new("manual"),
            request: EngineRequest::GoToSegment { segment: 12 },
        };
        let value = toml::Value::try_from(&envelope).unwrap();
        assert_eq!(value.get("id").and_then(|v| v.as_integer()), Some(7));
        let request = value.get("request").unwrap();
        assert_eq!(request.get("topic").and_then(|v| v.as_str()), Some("go-to-segment"));
        assert_eq!(
            request.get("payload").and_then(|p| p.get("segment")).and_then(|v| v.as_integer()),
            Some(12)
        );
        let back: Envelope = value.try_into().unwrap();
        assert_eq!(back, envelope);
    }
}
