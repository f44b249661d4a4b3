//! Analytics pass orchestration
//!
//! A pass fetches every event's history from the [`ValueStore`], normalizes
//! it, and runs all analytics components over the same snapshot of data.
//! One failing event degrades to an empty series instead of aborting the
//! pass, so a single bad fetch never blanks the whole dashboard.
//!
//! Passes are synchronous and stateless; each one works on freshly fetched
//! data. Snapshots carry a monotonically increasing `pass_id` so a caller
//! that overlaps passes can discard stale results (last-write-wins
//! otherwise).

use crate::analytics::compare::{self, DateWindow, EventComparison};
use crate::analytics::milestones::{self, Milestone, MilestoneInputs, Recommendation};
use crate::analytics::normalize;
use crate::analytics::patterns::{self, Pattern};
use crate::analytics::streaks::{self, StreakSummary, SummaryStats};
use crate::analytics::weekday::{self, DayOfWeekStats, HeatmapDay};
use crate::config::AnalyticsConfig;
use crate::db::ValueStore;
use crate::error::Result;
use crate::types::{EventDataPoint, EventKind, EventSeries, EventValue};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// Everything a dashboard refresh needs, computed in one pass.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Monotonic pass identifier; a later pass always has a larger id
    pub pass_id: u64,
    pub summaries: Vec<SummaryStats>,
    pub week_comparisons: Vec<EventComparison>,
    pub month_comparisons: Vec<EventComparison>,
    /// All seven weekdays ranked by completion rate
    pub weekdays: Vec<DayOfWeekStats>,
    pub heatmap: Vec<HeatmapDay>,
    pub patterns: Vec<Pattern>,
    pub milestones: Vec<Milestone>,
    pub recommendations: Vec<Recommendation>,
    /// Days in a row on which every event was tracked
    pub tracking_streak: u32,
    /// Average per-event consistency over the summary window
    pub global_consistency_pct: f64,
}

impl DashboardSnapshot {
    /// Serialize the snapshot for handoff to a UI or export layer.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Runs analytics passes over a value store.
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
    pass_counter: AtomicU64,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            pass_counter: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Run a full analytics pass as of `today`.
    ///
    /// Fails only when the event list itself cannot be read; individual
    /// value fetches degrade to empty series with a warning.
    pub fn run_pass<S: ValueStore + ?Sized>(
        &self,
        store: &S,
        today: NaiveDate,
    ) -> Result<DashboardSnapshot> {
        let pass_id = self.pass_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let events = store.events()?;
        tracing::info!(pass_id, events = events.len(), %today, "Starting analytics pass");

        let fetch_start = self.fetch_start(today);
        let mut all_series: Vec<EventSeries> = Vec::with_capacity(events.len());
        for event in events {
            let raw = match store.values_for_range_complete(event.id, fetch_start, today, event.kind)
            {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(
                        event_id = event.id,
                        event = %event.name,
                        error = %e,
                        "Fetching values failed; treating event as untracked for this pass"
                    );
                    Vec::new()
                }
            };
            let points = normalize::normalize(event.kind, &raw);
            all_series.push(EventSeries { event, points });
        }

        let cfg = &self.config;
        let summary_start = window_start(today, cfg.summary_window_days);
        let mut summaries: Vec<SummaryStats> = all_series
            .iter()
            .map(|s| {
                let window = slice(&s.points, summary_start, today);
                streaks::summarize(&s.event, &window, cfg.summary_window_days)
            })
            .collect();

        let week_comparisons = self.comparisons(&all_series, compare::week_windows(today));
        let month_comparisons = self.comparisons(&all_series, compare::month_windows(today));

        let weekdays = weekday::by_weekday(&all_series, cfg.weekday_window_days, today);
        let heatmap = weekday::heatmap(&all_series, cfg.heatmap_window_days, today);
        let patterns = patterns::discover(&all_series, cfg);

        // Streaks, the tracking streak, and lifetime totals look at all
        // recorded history, not just the fetched window; the streak
        // milestone tiers reach well past any window
        let (tracking_streak, total_tracked_days) =
            match self.lifetime_stats(store, &all_series, today) {
                Ok(lifetime) => {
                    for summary in summaries.iter_mut() {
                        if let Some(full) = lifetime.streaks_by_event.get(&summary.event.id) {
                            summary.streaks = *full;
                        }
                    }
                    (lifetime.tracking_streak, lifetime.total_tracked_days)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Full history unavailable; using windowed data");
                    (
                        streaks::tracking_streak(&all_series, today),
                        distinct_tracked_days(&all_series),
                    )
                }
            };

        let global_consistency_pct = if summaries.is_empty() {
            0.0
        } else {
            summaries.iter().map(|s| s.consistency_pct).sum::<f64>() / summaries.len() as f64
        };
        let best_streak = summaries.iter().map(|s| s.streaks.best).max().unwrap_or(0);

        let milestones = milestones::milestones(&MilestoneInputs {
            best_streak,
            consistency_pct: global_consistency_pct,
            total_tracked_days,
            tracking_streak,
        });
        let recommendations =
            milestones::recommendations(&summaries, &weekdays, global_consistency_pct);

        tracing::info!(
            pass_id,
            patterns = patterns.len(),
            recommendations = recommendations.len(),
            "Analytics pass complete"
        );

        Ok(DashboardSnapshot {
            pass_id,
            summaries,
            week_comparisons,
            month_comparisons,
            weekdays,
            heatmap,
            patterns,
            milestones,
            recommendations,
            tracking_streak,
            global_consistency_pct,
        })
    }

    /// Earliest date any component needs, so one fetch per event covers all
    /// windows.
    fn fetch_start(&self, today: NaiveDate) -> NaiveDate {
        let cfg = &self.config;
        let (prev_month, _) = compare::month_windows(today);
        let candidates = [
            window_start(today, cfg.summary_window_days),
            window_start(today, cfg.weekday_window_days),
            window_start(today, cfg.heatmap_window_days),
            today - Days::new(13), // both week windows
            prev_month.start,
        ];
        candidates.into_iter().min().unwrap_or(today)
    }

    fn comparisons(
        &self,
        all_series: &[EventSeries],
        windows: (DateWindow, DateWindow),
    ) -> Vec<EventComparison> {
        let (prev, curr) = windows;
        all_series
            .iter()
            .filter_map(|s| {
                let prev_points = slice(&s.points, prev.start, prev.end);
                let curr_points = slice(&s.points, curr.start, curr.end);
                compare::compare(&prev_points, &curr_points, s.event.kind).map(|comparison| {
                    EventComparison {
                        event: s.event.clone(),
                        comparison,
                    }
                })
            })
            .collect()
    }

    /// Tracking streak, per-boolean-event streaks, and total tracked days
    /// over all recorded history.
    fn lifetime_stats<S: ValueStore + ?Sized>(
        &self,
        store: &S,
        all_series: &[EventSeries],
        today: NaiveDate,
    ) -> Result<LifetimeStats> {
        let dump = store.all_values()?;

        let mut by_event: HashMap<i64, Vec<EventValue>> = HashMap::new();
        let mut all_dates: HashSet<NaiveDate> = HashSet::new();
        for value in dump {
            all_dates.insert(value.date);
            by_event.entry(value.event_id).or_default().push(value);
        }

        let full_series: Vec<EventSeries> = all_series
            .iter()
            .map(|s| {
                let raw = by_event.remove(&s.event.id).unwrap_or_default();
                EventSeries {
                    event: s.event.clone(),
                    points: normalize::normalize(s.event.kind, &raw),
                }
            })
            .collect();

        let streaks_by_event: HashMap<i64, StreakSummary> = full_series
            .iter()
            .filter(|s| s.event.kind == EventKind::Boolean)
            .map(|s| (s.event.id, streaks::streaks(&s.points)))
            .collect();

        Ok(LifetimeStats {
            tracking_streak: streaks::tracking_streak(&full_series, today),
            total_tracked_days: all_dates.len() as u32,
            streaks_by_event,
        })
    }
}

/// Full-history figures the milestone and recommendation rules are checked
/// against.
struct LifetimeStats {
    tracking_streak: u32,
    total_tracked_days: u32,
    streaks_by_event: HashMap<i64, StreakSummary>,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

fn window_start(today: NaiveDate, window_days: u32) -> NaiveDate {
    today - Days::new(window_days.saturating_sub(1) as u64)
}

fn slice(points: &[EventDataPoint], start: NaiveDate, end: NaiveDate) -> Vec<EventDataPoint> {
    points
        .iter()
        .filter(|p| p.date >= start && p.date <= end)
        .cloned()
        .collect()
}

fn distinct_tracked_days(all_series: &[EventSeries]) -> u32 {
    let dates: HashSet<NaiveDate> = all_series
        .iter()
        .flat_map(|s| {
            s.points
                .iter()
                .filter(|p| p.is_tracked(s.event.kind))
                .map(|p| p.date)
        })
        .collect();
    dates.len() as u32
}
