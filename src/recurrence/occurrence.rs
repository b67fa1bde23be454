//! Anchors and the occurrence instances projected from them

use chrono::{DateTime, Duration, FixedOffset, SecondsFormat, Utc};
use serde::Serialize;

/// An entity that owns a recurrence rule and supplies its base time
///
/// The engine only reads anchors; [`Anchor::retimed`] returns a copy.
pub trait Anchor: Clone {
    /// Identifier used as the prefix of occurrence ids
    fn anchor_id(&self) -> String;

    /// Series start, in the anchor's own UTC offset. `None` means the entity
    /// has nothing to anchor a series on (e.g. a task without a due date).
    fn anchor_start(&self) -> Option<DateTime<FixedOffset>>;

    /// Length of each occurrence, if the entity has one
    fn anchor_duration(&self) -> Option<Duration> {
        None
    }

    /// Copy of the entity moved to a new start/end
    fn retimed(&self, start: DateTime<FixedOffset>, end: Option<DateTime<FixedOffset>>) -> Self;
}

/// A dated projection of an anchor
///
/// Occurrences are produced fresh on every expansion and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence<T> {
    /// `anchorId_isoInstant` for instances, the anchor id otherwise
    pub id: String,
    /// Identifier of the anchor this was projected from
    pub parent_id: String,
    pub start: DateTime<FixedOffset>,
    pub end: Option<DateTime<FixedOffset>>,
    pub is_instance: bool,
    pub item: T,
}

fn end_after<T: Anchor>(anchor: &T, start: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    anchor.anchor_duration().and_then(|d| start.checked_add_signed(d))
}

impl<T: Anchor> Occurrence<T> {
    /// Instance of `anchor` starting at `start`, keeping the anchor's duration
    pub fn instance(anchor: &T, start: DateTime<FixedOffset>) -> Self {
        let end = end_after(anchor, start);
        let parent_id = anchor.anchor_id();
        Self {
            id: occurrence_id(&parent_id, start),
            parent_id,
            start,
            end,
            is_instance: true,
            item: anchor.retimed(start, end),
        }
    }

    /// The anchor itself, for entities that do not repeat
    pub fn single(anchor: &T) -> Option<Self> {
        let start = anchor.anchor_start()?;
        let id = anchor.anchor_id();
        Some(Self {
            id: id.clone(),
            parent_id: id,
            start,
            end: end_after(anchor, start),
            is_instance: false,
            item: anchor.clone(),
        })
    }
}

/// Synthetic occurrence id: anchor id, underscore, UTC instant with
/// millisecond precision (`42_2024-01-01T09:00:00.000Z`)
pub fn occurrence_id(anchor_id: &str, start: DateTime<FixedOffset>) -> String {
    format!(
        "{}_{}",
        anchor_id,
        start.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}
