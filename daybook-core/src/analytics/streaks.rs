//! Streak and consistency calculations
//!
//! Streaks apply to boolean events: runs of consecutive days with a true
//! value. Consistency measures how much of a window was actually tracked,
//! for any event kind. The global tracking streak counts days on which
//! every tracked event has a real value.

use crate::types::{Event, EventDataPoint, EventKind, EventSeries};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// Current and best streak lengths in days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    /// Consecutive true days ending at the most recent entry
    pub current: u32,
    /// Longest run of consecutive true days anywhere in the series
    pub best: u32,
}

/// Per-event rolling statistics over a summary window.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub event: Event,
    /// Streaks; zero for non-boolean events
    pub streaks: StreakSummary,
    /// Percentage of window days with a real recorded value (0-100)
    pub consistency_pct: f64,
    /// Days in the window with a real recorded value
    pub tracked_days: u32,
    /// Percentage of window days that count as "done" (0-100)
    pub completion_rate: f64,
}

/// Compute current and best streaks over a boolean series.
///
/// `points` must be ascending by date. A date gap breaks a run the same
/// way an explicit false does; the current streak is 0 unless the most
/// recent entry is true.
pub fn streaks(points: &[EventDataPoint]) -> StreakSummary {
    let mut best = 0u32;
    let mut run = 0u32;
    let mut prev_date: Option<NaiveDate> = None;

    for point in points {
        let contiguous = prev_date
            .and_then(|d| d.succ_opt())
            .map_or(true, |expected| point.date == expected);
        if point.value.is_truthy() && !point.placeholder {
            run = if contiguous { run + 1 } else { 1 };
            best = best.max(run);
        } else {
            run = 0;
        }
        prev_date = Some(point.date);
    }

    let mut current = 0u32;
    let mut next_date: Option<NaiveDate> = None;
    for point in points.iter().rev() {
        let contiguous = next_date
            .and_then(|d| d.pred_opt())
            .map_or(true, |expected| point.date == expected);
        if point.value.is_truthy() && !point.placeholder && contiguous {
            current += 1;
            next_date = Some(point.date);
        } else {
            break;
        }
    }

    StreakSummary { current, best }
}

/// Fraction of a window that was actually tracked, as a percentage.
///
/// A zero-length window yields 0, never NaN.
pub fn consistency(points: &[EventDataPoint], kind: EventKind, window_days: u32) -> f64 {
    if window_days == 0 {
        return 0.0;
    }
    let tracked = points.iter().filter(|p| p.is_tracked(kind)).count();
    ((tracked as f64 / window_days as f64) * 100.0).min(100.0)
}

/// Roll up one event's window into [`SummaryStats`].
pub fn summarize(event: &Event, points: &[EventDataPoint], window_days: u32) -> SummaryStats {
    let streak_summary = if event.kind == EventKind::Boolean {
        streaks(points)
    } else {
        StreakSummary::default()
    };

    let tracked_days = points.iter().filter(|p| p.is_tracked(event.kind)).count() as u32;
    let completed_days = points.iter().filter(|p| p.is_completed(event.kind)).count();
    let completion_rate = if window_days == 0 {
        0.0
    } else {
        ((completed_days as f64 / window_days as f64) * 100.0).min(100.0)
    };

    SummaryStats {
        event: event.clone(),
        streaks: streak_summary,
        consistency_pct: consistency(points, event.kind, window_days),
        tracked_days,
        completion_rate,
    }
}

/// Days in a row, counting back from `today`, on which *every* event has a
/// real (non-placeholder, kind-valid) value. Stops at the first day any
/// event is missing; zero when today already fails.
pub fn tracking_streak(all_series: &[EventSeries], today: NaiveDate) -> u32 {
    if all_series.is_empty() {
        return 0;
    }

    let tracked_dates: Vec<HashSet<NaiveDate>> = all_series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .filter(|p| p.is_tracked(s.event.kind))
                .map(|p| p.date)
                .collect()
        })
        .collect();

    let mut streak = 0u32;
    let mut day = today;
    loop {
        if !tracked_dates.iter().all(|dates| dates.contains(&day)) {
            break;
        }
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NormalizedValue;
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn bool_series(values: &[bool]) -> Vec<EventDataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EventDataPoint {
                date: day(i as u32 + 1),
                value: NormalizedValue::Number(if v { 1.0 } else { 0.0 }),
                placeholder: false,
            })
            .collect()
    }

    fn make_event(id: i64, name: &str, kind: EventKind) -> Event {
        Event {
            id,
            name: name.to_string(),
            kind,
            unit: None,
            color: None,
            sort_order: id as i32,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_streaks_basic() {
        // Oldest -> newest: T T F T T T
        let s = streaks(&bool_series(&[true, true, false, true, true, true]));
        assert_eq!(s.current, 3);
        assert_eq!(s.best, 3);
    }

    #[test]
    fn test_current_streak_zero_when_latest_false() {
        let s = streaks(&bool_series(&[true, true, true, false]));
        assert_eq!(s.current, 0);
        assert_eq!(s.best, 3);
    }

    #[test]
    fn test_date_gap_breaks_run() {
        let mut points = bool_series(&[true, true]);
        points.push(EventDataPoint {
            date: day(5), // gap: days 3-4 missing
            value: NormalizedValue::Number(1.0),
            placeholder: false,
        });
        let s = streaks(&points);
        assert_eq!(s.best, 2);
        assert_eq!(s.current, 1);
    }

    #[test]
    fn test_placeholder_breaks_run() {
        let mut points = bool_series(&[true, true]);
        points.push(EventDataPoint {
            date: day(3),
            value: NormalizedValue::Number(1.0),
            placeholder: true,
        });
        let s = streaks(&points);
        assert_eq!(s.current, 0);
        assert_eq!(s.best, 2);
    }

    #[test]
    fn test_consistency_bounds() {
        let points = bool_series(&[true, false, true]);
        let pct = consistency(&points, EventKind::Boolean, 7);
        assert!((0.0..=100.0).contains(&pct));
        // 3 real entries over a 7-day window
        assert!((pct - 3.0 / 7.0 * 100.0).abs() < 1e-9);

        assert_eq!(consistency(&points, EventKind::Boolean, 0), 0.0);
    }

    #[test]
    fn test_consistency_all_placeholders_is_zero() {
        let points: Vec<EventDataPoint> = (1..=5)
            .map(|d| EventDataPoint {
                date: day(d),
                value: NormalizedValue::Number(0.0),
                placeholder: true,
            })
            .collect();
        assert_eq!(consistency(&points, EventKind::Boolean, 5), 0.0);
    }

    #[test]
    fn test_summarize_numeric_event() {
        let event = make_event(1, "Sleep", EventKind::Number);
        let points: Vec<EventDataPoint> = [7.0, 0.0, 8.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| EventDataPoint {
                date: day(i as u32 + 1),
                value: NormalizedValue::Number(v),
                placeholder: false,
            })
            .collect();

        let stats = summarize(&event, &points, 3);
        assert_eq!(stats.streaks, StreakSummary::default());
        assert_eq!(stats.tracked_days, 3);
        // Only the two positive days count as "done"
        assert!((stats.completion_rate - 2.0 / 3.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_tracking_streak_requires_every_event() {
        let sleep = make_event(1, "Sleep", EventKind::Number);
        let exercise = make_event(2, "Exercise", EventKind::Boolean);

        let sleep_points: Vec<EventDataPoint> = (1..=3)
            .map(|d| EventDataPoint {
                date: day(d),
                value: NormalizedValue::Number(7.0),
                placeholder: false,
            })
            .collect();
        // Exercise missing on day 1
        let exercise_points: Vec<EventDataPoint> = (2..=3)
            .map(|d| EventDataPoint {
                date: day(d),
                value: NormalizedValue::Number(0.0),
                placeholder: false,
            })
            .collect();

        let series = vec![
            EventSeries {
                event: sleep,
                points: sleep_points,
            },
            EventSeries {
                event: exercise,
                points: exercise_points,
            },
        ];

        assert_eq!(tracking_streak(&series, day(3)), 2);
        // Today has no data at all
        assert_eq!(tracking_streak(&series, day(4)), 0);
        assert_eq!(tracking_streak(&[], day(3)), 0);
    }
}
