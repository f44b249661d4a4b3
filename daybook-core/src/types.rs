//! Core domain types for daybook
//!
//! These types represent the tracked-event data model shared by the
//! analytics components.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Event** | A user-defined tracked quantity with a fixed kind (boolean/number/text) |
//! | **EventValue** | One day's recorded raw value for an event, at most one per day |
//! | **EventDataPoint** | A normalized, in-memory observation derived from an EventValue |
//! | **Placeholder** | A synthesized gap-fill entry for a day with no recorded value |
//!
//! Placeholders are never persisted. They carry [`PLACEHOLDER_EVENT_ID`] so
//! downstream aggregation can distinguish "explicitly false/zero" from
//! "never tracked".

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel event id carried by gap-filled placeholder values.
pub const PLACEHOLDER_EVENT_ID: i64 = -1;

// ============================================
// Event
// ============================================

/// Kind of value an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Done / not done (e.g., "exercised today")
    Boolean,
    /// A measured quantity (e.g., hours of sleep)
    Number,
    /// Free text, treated as a lowercase category token (e.g., mood word)
    Text,
}

impl EventKind {
    /// Identifier used in database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Boolean => "boolean",
            EventKind::Number => "number",
            EventKind::Text => "text",
        }
    }

    /// Raw string default used when filling gaps in a date range.
    pub fn default_raw_value(&self) -> &'static str {
        match self {
            EventKind::Boolean => "false",
            EventKind::Number => "0",
            EventKind::Text => "",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" => Ok(EventKind::Boolean),
            "number" => Ok(EventKind::Number),
            "text" | "string" => Ok(EventKind::Text),
            _ => Err(format!("unknown event kind: {}", s)),
        }
    }
}

/// A user-defined tracked quantity.
///
/// Created and mutated by the user through the UI layer; the analytics core
/// only ever reads events. `sort_order` doubles as the deterministic
/// priority used to pick the primary numeric anchor during pattern
/// discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier
    pub id: i64,
    /// Display label, used as the natural key in pattern descriptions
    pub name: String,
    /// Value kind
    pub kind: EventKind,
    /// Optional unit suffix for numeric events (e.g., "h" for hours)
    pub unit: Option<String>,
    /// Display color (opaque to the core)
    pub color: Option<String>,
    /// Display/priority ordering
    pub sort_order: i32,
    /// When this event was created
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Unit suffix for display, empty when the event has no unit.
    pub fn unit_suffix(&self) -> &str {
        self.unit.as_deref().unwrap_or("")
    }
}

// ============================================
// EventValue
// ============================================

/// One observation: a raw stored value for an event on a calendar day.
///
/// The persistence layer enforces at most one value per (event, date).
/// The raw `value` is a kind-tagged string: "true"/"false" for boolean,
/// a numeric literal for number, free text for text events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventValue {
    /// Owning event id, or [`PLACEHOLDER_EVENT_ID`] for gap-filled entries
    pub event_id: i64,
    /// Calendar day of the observation
    pub date: NaiveDate,
    /// Raw stored value
    pub value: String,
}

impl EventValue {
    /// Whether this entry was synthesized to fill a gap rather than recorded.
    pub fn is_placeholder(&self) -> bool {
        self.event_id == PLACEHOLDER_EVENT_ID
    }

    /// Synthesize a placeholder entry for a missing day.
    pub fn placeholder(date: NaiveDate, kind: EventKind) -> Self {
        Self {
            event_id: PLACEHOLDER_EVENT_ID,
            date,
            value: kind.default_raw_value().to_string(),
        }
    }
}

// ============================================
// EventDataPoint
// ============================================

/// A normalized in-memory value.
///
/// Boolean events normalize to `Number(0.0)` / `Number(1.0)` so the
/// aggregators can treat boolean and numeric series uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NormalizedValue {
    Number(f64),
    Text(String),
}

impl NormalizedValue {
    /// Numeric view; text values read as 0.0.
    pub fn as_number(&self) -> f64 {
        match self {
            NormalizedValue::Number(n) => *n,
            NormalizedValue::Text(_) => 0.0,
        }
    }

    /// Text view; numeric values read as empty.
    pub fn as_text(&self) -> &str {
        match self {
            NormalizedValue::Number(_) => "",
            NormalizedValue::Text(s) => s,
        }
    }

    /// True for a boolean event's truthy normalization.
    pub fn is_truthy(&self) -> bool {
        self.as_number() > 0.0
    }
}

/// The unit of exchange between analytics components.
///
/// Derived fresh on every computation pass; never cached by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDataPoint {
    /// Calendar day of the observation
    pub date: NaiveDate,
    /// Normalized value
    pub value: NormalizedValue,
    /// Whether this point came from a gap-filled placeholder
    pub placeholder: bool,
}

impl EventDataPoint {
    /// Whether this point is a real recorded value that is valid for its
    /// kind: any non-placeholder entry for boolean, a parseable number for
    /// number, a non-empty token for text.
    pub fn is_tracked(&self, kind: EventKind) -> bool {
        if self.placeholder {
            return false;
        }
        match kind {
            EventKind::Boolean => true,
            EventKind::Number => !self.value.as_number().is_nan(),
            EventKind::Text => !self.value.as_text().is_empty(),
        }
    }

    /// The kind-specific "counts as done" rule used by completion rates and
    /// the heatmap: boolean true, number > 0, text non-empty.
    pub fn is_completed(&self, kind: EventKind) -> bool {
        if self.placeholder {
            return false;
        }
        match kind {
            EventKind::Boolean => self.value.is_truthy(),
            EventKind::Number => self.value.as_number() > 0.0,
            EventKind::Text => !self.value.as_text().is_empty(),
        }
    }
}

/// An event together with its normalized series for one pass.
#[derive(Debug, Clone)]
pub struct EventSeries {
    pub event: Event,
    pub points: Vec<EventDataPoint>,
}
