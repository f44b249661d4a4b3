//! Analytics for daybook
//!
//! Pure computations over tracked-event history:
//! - Value normalization and gap filling
//! - Streaks, consistency, and per-event summaries
//! - Week/month period comparisons with trend classification
//! - Day-of-week rankings and the activity heatmap
//! - Pattern discovery (bucketed thresholds and co-occurrences)
//! - Milestones and recommendations
//!
//! Everything here is a pure function of its inputs; any caching by time
//! range is the calling layer's concern. [`engine::AnalyticsEngine`] ties
//! the components together into a single dashboard pass.

pub mod compare;
pub mod engine;
pub mod milestones;
pub mod normalize;
pub mod patterns;
pub mod streaks;
pub mod weekday;

pub use compare::{EventComparison, PeriodComparison, Trend};
pub use engine::{AnalyticsEngine, DashboardSnapshot};
pub use milestones::{Milestone, MilestoneInputs, Recommendation};
pub use patterns::{Pattern, PatternKind, PatternStrength};
pub use streaks::{StreakSummary, SummaryStats};
pub use weekday::{DayOfWeekStats, HeatmapDay};
