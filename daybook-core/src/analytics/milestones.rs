//! Milestones and recommendations
//!
//! A fixed catalog of achievement tiers compared against values the other
//! analytics components already computed, plus short free-text
//! recommendations. Pure threshold checks, no aggregation of its own.

use crate::analytics::streaks::SummaryStats;
use crate::analytics::weekday::DayOfWeekStats;
use serde::Serialize;

/// One achievement in the fixed catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Milestone {
    pub title: String,
    /// Text differs depending on whether the milestone is achieved
    pub description: String,
    pub achieved: bool,
}

/// A short actionable suggestion for the user.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub message: String,
}

/// Values the milestone catalog is checked against.
#[derive(Debug, Clone, Copy, Default)]
pub struct MilestoneInputs {
    /// Best streak across all boolean events, in days
    pub best_streak: u32,
    /// Global consistency percentage (average across events)
    pub consistency_pct: f64,
    /// Total days with at least one recorded value
    pub total_tracked_days: u32,
    /// Days in a row on which every event was tracked
    pub tracking_streak: u32,
}

const STREAK_TIERS: &[(u32, &str)] = &[
    (3, "Getting Started"),
    (7, "One Week Strong"),
    (14, "Two Week Habit"),
    (30, "Monthly Master"),
    (90, "Quarter Champion"),
    (180, "Half-Year Hero"),
    (365, "Year-Long Legend"),
];

const CONSISTENCY_TIERS: &[(u32, &str)] = &[
    (50, "Halfway There"),
    (70, "Reliable Tracker"),
    (80, "Dedicated Tracker"),
    (90, "Precision Tracker"),
    (95, "Relentless Tracker"),
];

const TOTAL_DAYS_TIERS: &[(u32, &str)] = &[
    (50, "Fifty Days Logged"),
    (100, "Century of Days"),
    (250, "250 Days Logged"),
    (500, "500 Days Logged"),
    (1000, "A Thousand Days"),
];

const TRACKING_STREAK_TIERS: &[(u32, &str)] = &[
    (1, "First Full Day"),
    (7, "Full Week Tracked"),
    (14, "Full Fortnight Tracked"),
    (30, "Full Month Tracked"),
];

/// Build the full milestone catalog, marking each tier achieved or not.
pub fn milestones(inputs: &MilestoneInputs) -> Vec<Milestone> {
    let mut out = Vec::new();

    for &(days, title) in STREAK_TIERS {
        let achieved = inputs.best_streak >= days;
        out.push(Milestone {
            title: title.to_string(),
            description: if achieved {
                format!("You held a {}-day streak.", days)
            } else {
                format!("Keep a streak going for {} days.", days)
            },
            achieved,
        });
    }

    for &(pct, title) in CONSISTENCY_TIERS {
        let achieved = inputs.consistency_pct >= pct as f64;
        out.push(Milestone {
            title: title.to_string(),
            description: if achieved {
                format!("You track at {}% consistency or better.", pct)
            } else {
                format!("Reach {}% tracking consistency.", pct)
            },
            achieved,
        });
    }

    for &(days, title) in TOTAL_DAYS_TIERS {
        let achieved = inputs.total_tracked_days >= days;
        out.push(Milestone {
            title: title.to_string(),
            description: if achieved {
                format!("You have logged {} days of data.", days)
            } else {
                format!("Log data on {} days in total.", days)
            },
            achieved,
        });
    }

    for &(days, title) in TRACKING_STREAK_TIERS {
        let achieved = inputs.tracking_streak >= days;
        out.push(Milestone {
            title: title.to_string(),
            description: if achieved {
                format!("Every event tracked for {} days straight.", days)
            } else {
                format!("Track every event for {} days straight.", days)
            },
            achieved,
        });
    }

    out
}

/// Derive recommendations from the computed statistics.
///
/// Rules: surface the best weekday when its completion rate is above 70%,
/// nudge on global consistency below 80%, and encourage any event whose
/// current streak is alive (3+) but short of its personal best.
pub fn recommendations(
    summaries: &[SummaryStats],
    weekdays: &[DayOfWeekStats],
    global_consistency_pct: f64,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if let Some(best_day) = weekdays.first() {
        if best_day.completion_rate > 70.0 {
            out.push(Recommendation {
                message: format!(
                    "{} is your strongest day ({:.0}% completion). Plan your hardest habits for it.",
                    DayOfWeekStats::day_name(best_day.weekday),
                    best_day.completion_rate
                ),
            });
        }
    }

    if global_consistency_pct < 80.0 {
        out.push(Recommendation {
            message: format!(
                "Your tracking consistency is {:.0}%. Logging every day, even a quick entry, makes trends much more reliable.",
                global_consistency_pct
            ),
        });
    }

    for summary in summaries {
        let s = summary.streaks;
        if s.current >= 3 && s.current < s.best {
            out.push(Recommendation {
                message: format!(
                    "{} is on a {}-day streak. Your best is {} days, keep it going.",
                    summary.event.name, s.current, s.best
                ),
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::streaks::StreakSummary;
    use crate::types::{Event, EventKind};
    use chrono::Utc;

    fn make_summary(name: &str, current: u32, best: u32) -> SummaryStats {
        SummaryStats {
            event: Event {
                id: 1,
                name: name.to_string(),
                kind: EventKind::Boolean,
                unit: None,
                color: None,
                sort_order: 0,
                created_at: Utc::now(),
            },
            streaks: StreakSummary { current, best },
            consistency_pct: 90.0,
            tracked_days: 20,
            completion_rate: 75.0,
        }
    }

    #[test]
    fn test_catalog_is_fixed_size() {
        let all = milestones(&MilestoneInputs::default());
        assert_eq!(all.len(), 7 + 5 + 5 + 4);
        assert!(all.iter().all(|m| !m.achieved));
    }

    #[test]
    fn test_achieved_thresholds() {
        let inputs = MilestoneInputs {
            best_streak: 14,
            consistency_pct: 82.5,
            total_tracked_days: 250,
            tracking_streak: 7,
        };
        let all = milestones(&inputs);

        let achieved_titles: Vec<&str> = all
            .iter()
            .filter(|m| m.achieved)
            .map(|m| m.title.as_str())
            .collect();
        assert!(achieved_titles.contains(&"Two Week Habit"));
        assert!(!achieved_titles.contains(&"Monthly Master"));
        assert!(achieved_titles.contains(&"Dedicated Tracker"));
        assert!(!achieved_titles.contains(&"Precision Tracker"));
        assert!(achieved_titles.contains(&"250 Days Logged"));
        assert!(achieved_titles.contains(&"Full Week Tracked"));
    }

    #[test]
    fn test_description_differs_by_achievement() {
        let unachieved = milestones(&MilestoneInputs::default());
        let achieved = milestones(&MilestoneInputs {
            best_streak: 365,
            consistency_pct: 100.0,
            total_tracked_days: 1000,
            tracking_streak: 30,
        });
        for (a, b) in unachieved.iter().zip(achieved.iter()) {
            assert_eq!(a.title, b.title);
            assert_ne!(a.description, b.description);
        }
    }

    #[test]
    fn test_recommendations_rules() {
        let weekdays = vec![DayOfWeekStats {
            weekday: 0,
            total: 10,
            completed: 9,
            completion_rate: 90.0,
        }];
        let summaries = vec![make_summary("Exercise", 4, 10)];

        let recs = recommendations(&summaries, &weekdays, 60.0);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].message.contains("Sunday"));
        assert!(recs[1].message.contains("60%"));
        assert!(recs[2].message.contains("Exercise"));
        assert!(recs[2].message.contains("4-day streak"));
    }

    #[test]
    fn test_no_recommendations_when_all_is_well() {
        // Best weekday at exactly 70% does not qualify, streak at its best
        let weekdays = vec![DayOfWeekStats {
            weekday: 2,
            total: 10,
            completed: 7,
            completion_rate: 70.0,
        }];
        let summaries = vec![make_summary("Exercise", 10, 10)];
        let recs = recommendations(&summaries, &weekdays, 95.0);
        assert!(recs.is_empty());
    }
}
