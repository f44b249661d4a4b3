//! Value normalization
//!
//! Converts raw stored strings into typed [`EventDataPoint`]s and
//! optionally fills missing calendar days so downstream aggregation sees
//! one entry per day. Pure transforms, no side effects.

use crate::types::{EventDataPoint, EventKind, EventValue, NormalizedValue};
use chrono::NaiveDate;

/// Normalize raw values for one event into data points.
///
/// - Boolean: `"true"`/`"1"` map to 1, anything else to 0.
/// - Number: parsed as f64; unparseable values become 0 ("untracked"
///   semantics).
/// - Text: trimmed and lowercased; an empty string after trimming means
///   "no data", not a category value.
pub fn normalize(kind: EventKind, raw: &[EventValue]) -> Vec<EventDataPoint> {
    raw.iter()
        .map(|v| EventDataPoint {
            date: v.date,
            value: normalize_value(kind, &v.value),
            placeholder: v.is_placeholder(),
        })
        .collect()
}

fn normalize_value(kind: EventKind, raw: &str) -> NormalizedValue {
    match kind {
        EventKind::Boolean => {
            let truthy = matches!(raw.trim(), "true" | "1");
            NormalizedValue::Number(if truthy { 1.0 } else { 0.0 })
        }
        EventKind::Number => {
            let parsed = raw.trim().parse::<f64>().unwrap_or_else(|_| {
                if !raw.trim().is_empty() {
                    tracing::debug!(raw, "Unparseable numeric value treated as 0");
                }
                0.0
            });
            NormalizedValue::Number(parsed)
        }
        EventKind::Text => NormalizedValue::Text(raw.trim().to_lowercase()),
    }
}

/// Fill every missing day in `[start, end]` with a kind-default
/// placeholder, returning one raw value per calendar day in date order.
///
/// Existing entries are kept as-is; synthesized entries carry the
/// placeholder sentinel id so they can be filtered out later. Conflates
/// "explicitly false/zero" with "never tracked" unless the caller checks
/// the placeholder flag first.
pub fn fill_gaps(
    raw: Vec<EventValue>,
    start: NaiveDate,
    end: NaiveDate,
    kind: EventKind,
) -> Vec<EventValue> {
    if start > end {
        return Vec::new();
    }

    let mut recorded: std::collections::HashMap<NaiveDate, EventValue> =
        raw.into_iter().map(|v| (v.date, v)).collect();

    let mut out = Vec::with_capacity((end - start).num_days() as usize + 1);
    for day in start.iter_days() {
        if day > end {
            break;
        }
        out.push(
            recorded
                .remove(&day)
                .unwrap_or_else(|| EventValue::placeholder(day, kind)),
        );
    }
    out
}

/// Normalize with gap filling: one data point per day in `[start, end]`.
pub fn normalize_complete(
    kind: EventKind,
    raw: Vec<EventValue>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<EventDataPoint> {
    normalize(kind, &fill_gaps(raw, start, end, kind))
}

/// Format a numeric value for display, rendering integer-valued floats
/// without a decimal point (a naturally discrete quantity should not grow
/// fractional digits through aggregation).
pub fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn raw(event_id: i64, d: u32, value: &str) -> EventValue {
        EventValue {
            event_id,
            date: day(d),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_boolean_normalization() {
        let points = normalize(
            EventKind::Boolean,
            &[raw(1, 1, "true"), raw(1, 2, "1"), raw(1, 3, "false"), raw(1, 4, "yes")],
        );
        let values: Vec<f64> = points.iter().map(|p| p.value.as_number()).collect();
        assert_eq!(values, vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_number_parse_failure_is_zero() {
        let points = normalize(
            EventKind::Number,
            &[raw(1, 1, "7.5"), raw(1, 2, "not a number"), raw(1, 3, " 8 ")],
        );
        assert_eq!(points[0].value.as_number(), 7.5);
        assert_eq!(points[1].value.as_number(), 0.0);
        assert_eq!(points[2].value.as_number(), 8.0);
    }

    #[test]
    fn test_text_trim_and_lowercase() {
        let points = normalize(EventKind::Text, &[raw(1, 1, "  Calm "), raw(1, 2, "   ")]);
        assert_eq!(points[0].value.as_text(), "calm");
        assert_eq!(points[1].value.as_text(), "");
        assert!(!points[1].is_tracked(EventKind::Text));
    }

    #[test]
    fn test_fill_gaps_dense_and_deterministic() {
        let filled = fill_gaps(
            vec![raw(5, 2, "true")],
            day(1),
            day(3),
            EventKind::Boolean,
        );
        assert_eq!(filled.len(), 3);
        assert!(filled[0].is_placeholder());
        assert_eq!(filled[0].value, "false");
        assert_eq!(filled[1].event_id, 5);
        assert!(filled[2].is_placeholder());
        assert_eq!(
            filled.iter().map(|v| v.date).collect::<Vec<_>>(),
            vec![day(1), day(2), day(3)]
        );
    }

    #[test]
    fn test_fill_gaps_empty_range() {
        let filled = fill_gaps(vec![], day(3), day(1), EventKind::Number);
        assert!(filled.is_empty());
    }

    #[test]
    fn test_format_number_preserves_integers() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(8.25), "8.2");
        assert_eq!(format_number(0.0), "0");
    }
}
