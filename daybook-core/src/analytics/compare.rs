//! Period comparison
//!
//! Aggregates two disjoint date windows (this week vs last week, this
//! month vs last month) into averages, a signed change, and a three-way
//! trend classification.

use crate::types::{Event, EventDataPoint, EventKind};
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

/// Change below this absolute threshold is floating-point noise, not a trend.
const TREND_EPSILON: f64 = 0.01;

/// Direction of change between two windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

/// Aggregate comparison between a previous and a current window.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodComparison {
    /// Previous window average (true-rate % for boolean, mean for number)
    pub prev_avg: f64,
    /// Current window average
    pub curr_avg: f64,
    /// `curr_avg - prev_avg`
    pub change: f64,
    /// Change relative to the previous average, as a percentage; 0 when the
    /// previous average is 0
    pub change_percent: f64,
    pub trend: Trend,
}

/// A comparison paired with the event it describes.
#[derive(Debug, Clone, Serialize)]
pub struct EventComparison {
    pub event: Event,
    pub comparison: PeriodComparison,
}

/// A closed calendar date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Number of days in the window.
    pub fn len_days(&self) -> u32 {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start).num_days() as u32 + 1
        }
    }
}

/// Last-7-days vs the 7 days before: `(previous, current)`.
pub fn week_windows(today: NaiveDate) -> (DateWindow, DateWindow) {
    let curr = DateWindow {
        start: today - Days::new(6),
        end: today,
    };
    let prev = DateWindow {
        start: today - Days::new(13),
        end: today - Days::new(7),
    };
    (prev, curr)
}

/// Calendar month-to-date vs the whole previous month: `(previous, current)`.
pub fn month_windows(today: NaiveDate) -> (DateWindow, DateWindow) {
    let first_of_month = today.with_day(1).unwrap_or(today);
    let curr = DateWindow {
        start: first_of_month,
        end: today,
    };
    let prev_end = first_of_month.pred_opt().unwrap_or(first_of_month);
    let prev_start = prev_end.with_day(1).unwrap_or(prev_end);
    let prev = DateWindow {
        start: prev_start,
        end: prev_end,
    };
    (prev, curr)
}

/// Compare a previous and a current window of normalized points.
///
/// Returns `None` for text events (no meaningful average over free text)
/// and for numeric events where either window has no value above zero
/// (values <= 0 are treated as "not meaningfully tracked" and excluded).
pub fn compare(
    prev: &[EventDataPoint],
    curr: &[EventDataPoint],
    kind: EventKind,
) -> Option<PeriodComparison> {
    let (prev_avg, curr_avg) = match kind {
        EventKind::Text => return None,
        EventKind::Boolean => (true_rate(prev), true_rate(curr)),
        EventKind::Number => {
            let prev_avg = positive_mean(prev)?;
            let curr_avg = positive_mean(curr)?;
            (prev_avg, curr_avg)
        }
    };

    let change = curr_avg - prev_avg;
    let change_percent = if prev_avg > 0.0 {
        change / prev_avg * 100.0
    } else {
        0.0
    };
    let trend = if change.abs() < TREND_EPSILON {
        Trend::Stable
    } else if change > 0.0 {
        Trend::Up
    } else {
        Trend::Down
    };

    Some(PeriodComparison {
        prev_avg,
        curr_avg,
        change,
        change_percent,
        trend,
    })
}

/// Percentage of true values in a window; 0 for an empty window.
fn true_rate(points: &[EventDataPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let trues = points.iter().filter(|p| p.value.is_truthy()).count();
    trues as f64 / points.len() as f64 * 100.0
}

/// Mean of values above zero; `None` when the window has none.
fn positive_mean(points: &[EventDataPoint]) -> Option<f64> {
    let positives: Vec<f64> = points
        .iter()
        .map(|p| p.value.as_number())
        .filter(|&v| v > 0.0)
        .collect();
    if positives.is_empty() {
        return None;
    }
    Some(positives.iter().sum::<f64>() / positives.len() as f64)
}
