//! Pattern discovery
//!
//! Finds heuristic co-occurrence and threshold effects between tracked
//! events: the primary numeric event's observations are split into three
//! equal-width value buckets, every other event is summarized within each
//! bucket's days, and buckets telling the same story are merged into one
//! pattern with value ranges. A symmetric pass anchors on each boolean
//! event's true/false split. Confidence is heuristic, never statistical,
//! and is capped below certainty.

use crate::analytics::normalize::format_number;
use crate::config::AnalyticsConfig;
use crate::types::{Event, EventDataPoint, EventKind, EventSeries, NormalizedValue};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Minimum positive observations the numeric anchor needs.
const MIN_ANCHOR_DAYS: usize = 3;
/// Numeric spread below this is noise, not an outcome.
const NUMERIC_NOISE_SPREAD: f64 = 0.5;
/// Confidence floor; outcome inclusion rules already gate below this.
const CONFIDENCE_FLOOR: f64 = 65.0;
/// Confidence cap; a heuristic never claims certainty.
const CONFIDENCE_CAP: f64 = 95.0;
/// Confidence added per corroborating outcome.
const CONFIDENCE_PER_OUTCOME: f64 = 5.0;

/// How a pattern was anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    /// Anchored on a numeric value bucket
    Threshold,
    /// Anchored on a boolean event's true/false split
    CoOccurrence,
}

/// Qualitative strength label derived from confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl PatternStrength {
    /// Classify a confidence score.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 90.0 {
            PatternStrength::VeryStrong
        } else if confidence >= 80.0 {
            PatternStrength::Strong
        } else if confidence >= 65.0 {
            PatternStrength::Moderate
        } else {
            PatternStrength::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternStrength::Weak => "weak",
            PatternStrength::Moderate => "moderate",
            PatternStrength::Strong => "strong",
            PatternStrength::VeryStrong => "very-strong",
        }
    }
}

/// A discovered association, ready for display.
///
/// Constructed fresh on each discovery pass and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Pattern {
    /// Arrow-joined human-readable chain, e.g.
    /// `"Sleep 7-9h → Exercise (80%) → Mood: calm (67%)"`
    pub description: String,
    /// Heuristic confidence, always within [65, 95]
    pub confidence: f64,
    pub kind: PatternKind,
    /// Events involved (anchor first)
    pub events: Vec<Event>,
    pub strength: PatternStrength,
    /// Days of data behind the pattern
    pub sample_size: usize,
}

// ============================================
// Internal candidate representation
// ============================================

#[derive(Debug, Clone)]
enum Anchor {
    Range {
        event: Event,
        min: f64,
        max: f64,
    },
    BoolYes {
        event: Event,
    },
    BoolNo {
        event: Event,
    },
}

impl Anchor {
    fn event(&self) -> &Event {
        match self {
            Anchor::Range { event, .. } | Anchor::BoolYes { event } | Anchor::BoolNo { event } => {
                event
            }
        }
    }

    fn signature(&self) -> String {
        match self {
            Anchor::Range { event, .. } => format!("num:{}", event.id),
            Anchor::BoolYes { event } => format!("yes:{}", event.id),
            Anchor::BoolNo { event } => format!("no:{}", event.id),
        }
    }

    fn render(&self) -> String {
        match self {
            Anchor::Range { event, min, max } => {
                if (max - min).abs() < f64::EPSILON {
                    format!("{} {}{}", event.name, format_number(*min), event.unit_suffix())
                } else {
                    format!(
                        "{} {}-{}{}",
                        event.name,
                        format_number(*min),
                        format_number(*max),
                        event.unit_suffix()
                    )
                }
            }
            Anchor::BoolYes { event } => event.name.clone(),
            Anchor::BoolNo { event } => format!("NOT {}", event.name),
        }
    }
}

/// One category of a text outcome, with its observed share range.
#[derive(Debug, Clone)]
struct CategoryShare {
    value: String,
    min_pct: f64,
    max_pct: f64,
}

#[derive(Debug, Clone)]
enum OutcomeValue {
    /// Boolean outcome: skewed toward yes or no, with the skew percentage
    /// (merged into a range across buckets)
    Rate { yes: bool, min_pct: f64, max_pct: f64 },
    /// Numeric outcome: observed span and mean
    Span { min: f64, max: f64, mean: f64 },
    /// Text outcome: dominant values with their shares
    Categories(Vec<CategoryShare>),
}

#[derive(Debug, Clone)]
struct Outcome {
    event: Event,
    value: OutcomeValue,
}

impl Outcome {
    fn signature(&self) -> String {
        match &self.value {
            OutcomeValue::Rate { yes, .. } => {
                format!("{}:{}", self.event.id, if *yes { "yes" } else { "no" })
            }
            OutcomeValue::Span { .. } => format!("{}:number", self.event.id),
            OutcomeValue::Categories(cats) => {
                let top = cats.first().map(|c| c.value.as_str()).unwrap_or("");
                format!("{}:{}", self.event.id, top)
            }
        }
    }

    fn render(&self) -> String {
        match &self.value {
            OutcomeValue::Rate { yes, min_pct, max_pct } => {
                let name = if *yes {
                    self.event.name.clone()
                } else {
                    format!("Not {}", self.event.name)
                };
                format!("{} ({})", name, render_pct_range(*min_pct, *max_pct))
            }
            OutcomeValue::Span { min, max, mean } => {
                let unit = self.event.unit_suffix();
                if max - min <= NUMERIC_NOISE_SPREAD {
                    format!("{} {}{}", self.event.name, format_number(*mean), unit)
                } else {
                    format!(
                        "{} {}-{}{}",
                        self.event.name,
                        format_number(*min),
                        format_number(*max),
                        unit
                    )
                }
            }
            OutcomeValue::Categories(cats) => {
                let listed: Vec<String> = cats
                    .iter()
                    .map(|c| format!("{} ({})", c.value, render_pct_range(c.min_pct, c.max_pct)))
                    .collect();
                format!("{}: {}", self.event.name, listed.join(", "))
            }
        }
    }
}

/// `"80%"` when the range collapses, `"70-85%"` otherwise.
fn render_pct_range(min_pct: f64, max_pct: f64) -> String {
    let lo = min_pct.round();
    let hi = max_pct.round();
    if (lo - hi).abs() < f64::EPSILON {
        format!("{:.0}%", lo)
    } else {
        format!("{:.0}-{:.0}%", lo, hi)
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    anchor: Anchor,
    outcomes: Vec<Outcome>,
    sample_size: usize,
    confidence: f64,
    kind: PatternKind,
}

impl Candidate {
    fn signature(&self) -> String {
        let mut sig = self.anchor.signature();
        for outcome in &self.outcomes {
            sig.push('|');
            sig.push_str(&outcome.signature());
        }
        sig
    }

    fn event_ids(&self) -> HashSet<i64> {
        let mut ids: HashSet<i64> = self.outcomes.iter().map(|o| o.event.id).collect();
        ids.insert(self.anchor.event().id);
        ids
    }

    fn into_pattern(self) -> Pattern {
        let mut events = vec![self.anchor.event().clone()];
        events.extend(self.outcomes.iter().map(|o| o.event.clone()));

        let outcomes: Vec<String> = self.outcomes.iter().map(|o| o.render()).collect();
        let description = format!("{} → {}", self.anchor.render(), outcomes.join(" → "));

        Pattern {
            description,
            confidence: self.confidence,
            kind: self.kind,
            events,
            strength: PatternStrength::from_confidence(self.confidence),
            sample_size: self.sample_size,
        }
    }
}

fn confidence_for(outcome_count: usize) -> f64 {
    (CONFIDENCE_FLOOR + CONFIDENCE_PER_OUTCOME * outcome_count as f64).min(CONFIDENCE_CAP)
}

// ============================================
// Discovery
// ============================================

/// Discover patterns across all tracked events.
///
/// Requires at least two events and a numeric event with at least three
/// positive observations to anchor on; otherwise returns empty. Emits the
/// merged, deduplicated pattern list sorted by descending confidence.
pub fn discover(all: &[EventSeries], cfg: &AnalyticsConfig) -> Vec<Pattern> {
    if all.len() < 2 {
        return Vec::new();
    }

    // Deterministic primary: first numeric event by sort order with enough
    // positive observations. A sparser numeric event earlier in the order is
    // passed over rather than anchoring on too little data.
    let primary = all
        .iter()
        .filter(|s| s.event.kind == EventKind::Number)
        .find(|s| positive_points(&s.points).len() >= MIN_ANCHOR_DAYS);
    let primary = match primary {
        Some(p) => p,
        None => {
            tracing::debug!("No numeric anchor with enough data; skipping pattern discovery");
            return Vec::new();
        }
    };

    let mut candidates = Vec::new();
    candidates.extend(numeric_anchored(primary, all, cfg));
    for series in all.iter().filter(|s| s.event.kind == EventKind::Boolean) {
        candidates.extend(boolean_anchored(series, all, cfg));
    }

    tracing::debug!(
        candidates = candidates.len(),
        primary = %primary.event.name,
        "Pattern discovery produced candidates"
    );

    let merged = merge_by_signature(candidates);
    let mut patterns: Vec<Pattern> = deduplicate(merged, cfg.dedup_overlap)
        .into_iter()
        .map(Candidate::into_pattern)
        .collect();

    patterns.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.sample_size.cmp(&a.sample_size))
            .then_with(|| a.description.cmp(&b.description))
    });
    patterns
}

fn positive_points(points: &[EventDataPoint]) -> Vec<(NaiveDate, f64)> {
    points
        .iter()
        .filter(|p| !p.placeholder)
        .filter_map(|p| match &p.value {
            NormalizedValue::Number(n) if *n > 0.0 => Some((p.date, *n)),
            _ => None,
        })
        .collect()
}

/// Bucket the primary numeric event into three equal-width value ranges
/// and summarize every other event within each bucket's days.
fn numeric_anchored(
    primary: &EventSeries,
    all: &[EventSeries],
    cfg: &AnalyticsConfig,
) -> Vec<Candidate> {
    let observations = positive_points(&primary.points);
    let min = observations.iter().map(|(_, v)| *v).fold(f64::MAX, f64::min);
    let max = observations.iter().map(|(_, v)| *v).fold(f64::MIN, f64::max);

    // Less than one unit of variation cannot be bucketed meaningfully
    if max - min < 1.0 {
        return Vec::new();
    }

    let integral = observations.iter().all(|(_, v)| v.fract().abs() < f64::EPSILON);
    let width = (max - min) / 3.0;
    let mut bounds = [min, min + width, min + 2.0 * width, max];
    if integral {
        // Fractional thresholds read oddly for a naturally discrete quantity
        for b in &mut bounds {
            *b = b.round();
        }
    }

    let mut candidates = Vec::new();
    for i in 0..3 {
        let (lo, hi) = (bounds[i], bounds[i + 1]);
        let last = i == 2;
        let days: HashSet<NaiveDate> = observations
            .iter()
            .filter(|(_, v)| *v >= lo && (*v < hi || (last && *v <= hi)))
            .map(|(d, _)| *d)
            .collect();
        if days.len() < cfg.min_bucket_days {
            continue;
        }

        let outcomes = bucket_outcomes(primary.event.id, all, &days, cfg);
        if outcomes.is_empty() {
            continue;
        }

        candidates.push(Candidate {
            anchor: Anchor::Range {
                event: primary.event.clone(),
                min: lo,
                max: hi,
            },
            confidence: confidence_for(outcomes.len()),
            sample_size: days.len(),
            outcomes,
            kind: PatternKind::Threshold,
        });
    }
    candidates
}

/// Symmetric pass: anchor on a boolean event's true and false day sets.
fn boolean_anchored(
    anchor: &EventSeries,
    all: &[EventSeries],
    cfg: &AnalyticsConfig,
) -> Vec<Candidate> {
    let mut yes_days: HashSet<NaiveDate> = HashSet::new();
    let mut no_days: HashSet<NaiveDate> = HashSet::new();
    for point in anchor.points.iter().filter(|p| !p.placeholder) {
        if point.value.is_truthy() {
            yes_days.insert(point.date);
        } else {
            no_days.insert(point.date);
        }
    }

    let mut candidates = Vec::new();
    for (days, yes) in [(yes_days, true), (no_days, false)] {
        if days.len() < cfg.min_bucket_days {
            continue;
        }
        let outcomes = bucket_outcomes(anchor.event.id, all, &days, cfg);
        if outcomes.is_empty() {
            continue;
        }
        candidates.push(Candidate {
            anchor: if yes {
                Anchor::BoolYes {
                    event: anchor.event.clone(),
                }
            } else {
                Anchor::BoolNo {
                    event: anchor.event.clone(),
                }
            },
            confidence: confidence_for(outcomes.len()),
            sample_size: days.len(),
            outcomes,
            kind: PatternKind::CoOccurrence,
        });
    }
    candidates
}

/// Summarize every event other than the anchor within the given days,
/// keeping only outcomes that pass the kind-specific inclusion rule.
fn bucket_outcomes(
    anchor_id: i64,
    all: &[EventSeries],
    days: &HashSet<NaiveDate>,
    cfg: &AnalyticsConfig,
) -> Vec<Outcome> {
    all.iter()
        .filter(|s| s.event.id != anchor_id)
        .filter_map(|s| outcome_for(s, days, cfg))
        .collect()
}

fn outcome_for(series: &EventSeries, days: &HashSet<NaiveDate>, cfg: &AnalyticsConfig) -> Option<Outcome> {
    let in_bucket: Vec<&EventDataPoint> = series
        .points
        .iter()
        .filter(|p| !p.placeholder && days.contains(&p.date))
        .collect();

    match series.event.kind {
        EventKind::Boolean => {
            if in_bucket.len() < cfg.min_bucket_days {
                return None;
            }
            let rate = in_bucket.iter().filter(|p| p.value.is_truthy()).count() as f64
                / in_bucket.len() as f64;
            let value = if rate >= cfg.bool_include_rate {
                OutcomeValue::Rate {
                    yes: true,
                    min_pct: rate * 100.0,
                    max_pct: rate * 100.0,
                }
            } else if rate <= cfg.bool_exclude_rate {
                let inverse = (1.0 - rate) * 100.0;
                OutcomeValue::Rate {
                    yes: false,
                    min_pct: inverse,
                    max_pct: inverse,
                }
            } else {
                return None;
            };
            Some(Outcome {
                event: series.event.clone(),
                value,
            })
        }
        EventKind::Number => {
            let values: Vec<f64> = in_bucket
                .iter()
                .map(|p| p.value.as_number())
                .filter(|&v| v > 0.0)
                .collect();
            if values.is_empty() {
                return None;
            }
            let min = values.iter().copied().fold(f64::MAX, f64::min);
            let max = values.iter().copied().fold(f64::MIN, f64::max);
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            if max - min <= NUMERIC_NOISE_SPREAD && mean <= NUMERIC_NOISE_SPREAD {
                return None;
            }
            Some(Outcome {
                event: series.event.clone(),
                value: OutcomeValue::Span { min, max, mean },
            })
        }
        EventKind::Text => {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for p in &in_bucket {
                let token = p.value.as_text();
                if !token.is_empty() {
                    *counts.entry(token).or_insert(0) += 1;
                }
            }
            let recorded: usize = counts.values().sum();
            if recorded == 0 {
                return None;
            }

            let mut shares: Vec<(String, f64)> = counts
                .into_iter()
                .map(|(v, c)| (v.to_string(), c as f64 / recorded as f64))
                .filter(|(_, share)| *share >= cfg.text_min_share)
                .collect();
            // Descending by share, alphabetical within ties for determinism
            shares.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            shares.truncate(3);
            if shares.is_empty() {
                return None;
            }

            Some(Outcome {
                event: series.event.clone(),
                value: OutcomeValue::Categories(
                    shares
                        .into_iter()
                        .map(|(value, share)| CategoryShare {
                            value,
                            min_pct: share * 100.0,
                            max_pct: share * 100.0,
                        })
                        .collect(),
                ),
            })
        }
    }
}

// ============================================
// Merging and deduplication
// ============================================

/// Group candidates by their qualitative signature (same anchor event and
/// same ordered outcome directions) and merge each group's value ranges,
/// so three buckets telling the same story become one pattern.
fn merge_by_signature(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Candidate>> = HashMap::new();
    for candidate in candidates {
        let sig = candidate.signature();
        if !groups.contains_key(&sig) {
            order.push(sig.clone());
        }
        groups.entry(sig).or_default().push(candidate);
    }

    order
        .into_iter()
        .map(|sig| {
            let group = groups.remove(&sig).unwrap_or_default();
            merge_group(group)
        })
        .collect()
}

fn merge_group(mut group: Vec<Candidate>) -> Candidate {
    let mut merged = group.remove(0);
    for other in group {
        merged.sample_size += other.sample_size;
        merged.confidence = merged.confidence.max(other.confidence);

        if let (
            Anchor::Range { min, max, .. },
            Anchor::Range {
                min: other_min,
                max: other_max,
                ..
            },
        ) = (&mut merged.anchor, &other.anchor)
        {
            *min = min.min(*other_min);
            *max = max.max(*other_max);
        }

        for (outcome, other_outcome) in merged.outcomes.iter_mut().zip(other.outcomes.iter()) {
            merge_outcome(outcome, other_outcome);
        }
    }
    merged
}

fn merge_outcome(into: &mut Outcome, other: &Outcome) {
    match (&mut into.value, &other.value) {
        (
            OutcomeValue::Rate { min_pct, max_pct, .. },
            OutcomeValue::Rate {
                min_pct: other_min,
                max_pct: other_max,
                ..
            },
        ) => {
            *min_pct = min_pct.min(*other_min);
            *max_pct = max_pct.max(*other_max);
        }
        (
            OutcomeValue::Span { min, max, mean },
            OutcomeValue::Span {
                min: other_min,
                max: other_max,
                mean: other_mean,
            },
        ) => {
            *min = min.min(*other_min);
            *max = max.max(*other_max);
            *mean = (*mean + other_mean) / 2.0;
        }
        (OutcomeValue::Categories(cats), OutcomeValue::Categories(other_cats)) => {
            // Keep only categories both sides report, widening the share range
            cats.retain(|c| other_cats.iter().any(|o| o.value == c.value));
            for cat in cats.iter_mut() {
                if let Some(o) = other_cats.iter().find(|o| o.value == cat.value) {
                    cat.min_pct = cat.min_pct.min(o.min_pct);
                    cat.max_pct = cat.max_pct.max(o.max_pct);
                }
            }
        }
        _ => {}
    }
}

/// Drop patterns whose event sets overlap an already-kept,
/// higher-confidence pattern. Overlap is `|intersection| / min(|a|, |b|)`.
fn deduplicate(mut candidates: Vec<Candidate>, overlap_threshold: f64) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.sample_size.cmp(&a.sample_size))
    });

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        let ids = candidate.event_ids();
        let duplicate = kept.iter().any(|k| {
            let kept_ids = k.event_ids();
            let intersection = ids.intersection(&kept_ids).count() as f64;
            let smaller = ids.len().min(kept_ids.len()) as f64;
            smaller > 0.0 && intersection / smaller > overlap_threshold
        });
        if !duplicate {
            kept.push(candidate);
        }
    }
    kept
}
