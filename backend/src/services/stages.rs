//! Stage (milestone-to-milestone) distributions and bottleneck detection.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use qtty::time::Hours;

use crate::models::time::hours_between;
use crate::models::{CohortStageAnalytics, GroundingEvent, Milestones, Stage, StageAnalytics, StageStats};
use crate::services::breakdown::GroupKey;
use crate::services::stats::{mean, median};

/// Start and end milestones of a stage.
fn endpoints(stage: Stage, m: &Milestones) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    match stage {
        Stage::Troubleshooting => (m.reported_at, m.procurement_requested_at),
        Stage::Procurement => (m.procurement_requested_at, m.available_at_store_at),
        Stage::StoreIssue => (m.available_at_store_at, m.issued_back_at),
        Stage::Installation => (m.issued_back_at, m.installation_complete_at),
        Stage::PreTest => (m.installation_complete_at, m.test_start_at),
        Stage::Testing => (m.test_start_at, m.up_and_running_at),
    }
}

/// Hours spent in `stage`, `None` unless both endpoints are recorded.
pub fn stage_hours(stage: Stage, milestones: &Milestones) -> Option<f64> {
    match endpoints(stage, milestones) {
        (Some(start), Some(end)) => Some(hours_between(start, end)),
        _ => None,
    }
}

/// Per-stage count / average / median / max plus the bottleneck stage.
///
/// Only raw recorded milestones count; backfilled anchors would turn every
/// legacy event into a one-stage sample.
pub fn compute_stage_analytics(events: &[GroundingEvent]) -> StageAnalytics {
    let stages: Vec<StageStats> = Stage::ALL
        .iter()
        .map(|&stage| {
            let samples: Vec<f64> = events
                .iter()
                .filter_map(|e| stage_hours(stage, &e.milestones))
                .collect();
            StageStats {
                stage,
                label: stage.label().to_string(),
                count: samples.len(),
                average_hours: Hours::new(mean(&samples)),
                median_hours: Hours::new(median(&samples)),
                max_hours: Hours::new(samples.iter().copied().fold(0.0, f64::max)),
            }
        })
        .collect();

    // Strictly greater keeps the earliest stage on ties.
    let bottleneck = stages
        .iter()
        .filter(|s| s.count > 0)
        .fold(None::<&StageStats>, |best, s| match best {
            Some(b) if b.average_hours.value() >= s.average_hours.value() => Some(b),
            _ => Some(s),
        })
        .map(|s| s.stage);

    StageAnalytics {
        event_count: events.len(),
        stages,
        bottleneck,
    }
}

/// Stage analytics per cohort value of `key`, in key order.
pub fn compute_stage_analytics_by(
    events: &[GroundingEvent],
    key: GroupKey,
) -> Vec<CohortStageAnalytics> {
    let mut cohorts: BTreeMap<String, Vec<GroundingEvent>> = BTreeMap::new();
    for event in events {
        cohorts
            .entry(key.value_for(event))
            .or_default()
            .push(event.clone());
    }

    cohorts
        .into_iter()
        .map(|(cohort, members)| CohortStageAnalytics {
            cohort,
            analytics: compute_stage_analytics(&members),
        })
        .collect()
}
