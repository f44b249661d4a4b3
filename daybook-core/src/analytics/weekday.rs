//! Day-of-week ranking and activity heatmap
//!
//! Buckets history by weekday to rank which days of the week the user
//! actually completes their events, and produces a fixed-length per-day
//! activity count series for heatmap rendering.
//!
//! Both aggregations expect gap-filled series (one point per day) so that
//! untracked days still count toward denominators.

use crate::types::EventSeries;
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

/// Completion statistics for one weekday (0=Sunday .. 6=Saturday).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DayOfWeekStats {
    /// Weekday index, 0=Sunday
    pub weekday: u8,
    /// (event, day) observations that fell on this weekday
    pub total: u32,
    /// Observations that counted as "done"
    pub completed: u32,
    /// `completed / total` as a percentage; 0 when the weekday never occurs
    pub completion_rate: f64,
}

impl DayOfWeekStats {
    /// Display name for a weekday index.
    pub fn day_name(weekday: u8) -> &'static str {
        match weekday {
            0 => "Sunday",
            1 => "Monday",
            2 => "Tuesday",
            3 => "Wednesday",
            4 => "Thursday",
            5 => "Friday",
            6 => "Saturday",
            _ => "Unknown",
        }
    }
}

/// One day of the activity heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    /// Distinct events with a completed value on this day
    pub count: u32,
}

/// Rank weekdays by completion rate over the last `window_days` days.
///
/// All seven weekdays are always returned, sorted descending by rate;
/// ties keep Sunday-first order (stable sort).
pub fn by_weekday(all: &[EventSeries], window_days: u32, today: NaiveDate) -> Vec<DayOfWeekStats> {
    let start = window_start(today, window_days);
    let mut totals = [0u32; 7];
    let mut completed = [0u32; 7];

    for series in all {
        for point in &series.points {
            if point.date < start || point.date > today {
                continue;
            }
            let idx = point.date.weekday().num_days_from_sunday() as usize;
            totals[idx] += 1;
            if point.is_completed(series.event.kind) {
                completed[idx] += 1;
            }
        }
    }

    let mut stats: Vec<DayOfWeekStats> = (0..7)
        .map(|i| DayOfWeekStats {
            weekday: i as u8,
            total: totals[i],
            completed: completed[i],
            completion_rate: if totals[i] == 0 {
                0.0
            } else {
                completed[i] as f64 / totals[i] as f64 * 100.0
            },
        })
        .collect();

    stats.sort_by(|a, b| {
        b.completion_rate
            .partial_cmp(&a.completion_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    stats
}

/// Per-day completed-event counts for the last `window_days` days,
/// oldest first. Always exactly `window_days` entries.
pub fn heatmap(all: &[EventSeries], window_days: u32, today: NaiveDate) -> Vec<HeatmapDay> {
    let mut counts: HashMap<NaiveDate, u32> = HashMap::new();
    let start = window_start(today, window_days);

    for series in all {
        for point in &series.points {
            if point.date < start || point.date > today {
                continue;
            }
            if point.is_completed(series.event.kind) {
                *counts.entry(point.date).or_insert(0) += 1;
            }
        }
    }

    let mut out = Vec::with_capacity(window_days as usize);
    for date in start.iter_days() {
        if date > today {
            break;
        }
        out.push(HeatmapDay {
            date,
            count: counts.get(&date).copied().unwrap_or(0),
        });
    }
    out
}

fn window_start(today: NaiveDate, window_days: u32) -> NaiveDate {
    today - Days::new(window_days.saturating_sub(1) as u64)
}
