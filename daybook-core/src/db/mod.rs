//! Storage layer for daybook
//!
//! The analytics core reads tracked history through the [`ValueStore`]
//! trait; whatever owns persistence (here, a thin SQLite [`Database`])
//! implements it. The core never writes values — the write helpers on
//! [`Database`] exist for the recording UI and for tests.

pub mod repo;
pub mod schema;

pub use repo::Database;

use crate::analytics::normalize;
use crate::error::Result;
use crate::types::{Event, EventKind, EventValue};
use chrono::NaiveDate;

/// Read interface the analytics core requires from persistence.
pub trait ValueStore {
    /// All tracked events, ordered by `sort_order` then id.
    fn events(&self) -> Result<Vec<Event>>;

    /// Raw values recorded for an event within a closed date range,
    /// ascending by date. No gap filling.
    fn values_for_range(
        &self,
        event_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EventValue>>;

    /// Like [`values_for_range`](Self::values_for_range), but with every
    /// missing calendar day filled by a kind-default placeholder carrying
    /// the sentinel event id, so callers see one entry per day.
    fn values_for_range_complete(
        &self,
        event_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        kind: EventKind,
    ) -> Result<Vec<EventValue>> {
        let raw = self.values_for_range(event_id, start, end)?;
        Ok(normalize::fill_gaps(raw, start, end, kind))
    }

    /// Unfiltered dump of every recorded value, used for the global
    /// tracking-streak computation.
    fn all_values(&self) -> Result<Vec<EventValue>>;
}
