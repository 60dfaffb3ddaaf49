//! Downtime metrics calculator.
//!
//! Maps one event's milestone timestamps to the technical / procurement / ops
//! buckets and the total downtime. Computation happens in two explicit steps:
//!
//! 1. [`backfill`] normalizes the milestone set (`reported_at` from
//!    `detected_at`, `up_and_running_at` from `cleared_at`).
//! 2. [`DowntimePath::select`] decides which computation applies and the
//!    matching arm produces the numbers.
//!
//! Every combination of present/absent timestamps is valid input; nothing in
//! here returns an error.

use chrono::{DateTime, Utc};
use qtty::time::Hours;
use serde::{Deserialize, Serialize};

use crate::models::time::hours_between;
use crate::models::{DowntimeMetrics, GroundingEvent, Milestones};
use crate::services::classifier;

/// Which computation a (backfilled) milestone set supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DowntimePath {
    /// Report and up-and-running are known: full bucket decomposition.
    Milestones {
        reported: DateTime<Utc>,
        up_and_running: DateTime<Utc>,
    },
    /// Only the coarse detection/clearance bounds are known.
    DetectedClearedOnly {
        detected: DateTime<Utc>,
        cleared: DateTime<Utc>,
    },
    /// Not enough data for any downtime figure.
    NoData,
}

impl DowntimePath {
    pub fn select(milestones: &Milestones) -> Self {
        match (
            milestones.reported_at,
            milestones.up_and_running_at,
            milestones.detected_at,
            milestones.cleared_at,
        ) {
            (Some(reported), Some(up_and_running), _, _) => Self::Milestones {
                reported,
                up_and_running,
            },
            (_, _, Some(detected), Some(cleared)) => Self::DetectedClearedOnly { detected, cleared },
            _ => Self::NoData,
        }
    }
}

/// Calculator output: the four derived numbers plus the backfilled anchors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComputedMetrics {
    pub metrics: DowntimeMetrics,
    pub reported_at: Option<DateTime<Utc>>,
    pub up_and_running_at: Option<DateTime<Utc>>,
    pub path: DowntimePath,
}

/// Fill `reported_at`/`up_and_running_at` from the coarse bounds when absent.
pub fn backfill(milestones: &Milestones) -> Milestones {
    let mut normalized = milestones.clone();
    if normalized.reported_at.is_none() {
        normalized.reported_at = normalized.detected_at;
    }
    if normalized.up_and_running_at.is_none() {
        normalized.up_and_running_at = normalized.cleared_at;
    }
    normalized
}

fn span(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> f64 {
    match (from, to) {
        (Some(from), Some(to)) => hours_between(from, to),
        _ => 0.0,
    }
}

/// Troubleshooting up to the parts request, or up to installation when no
/// parts were requested, plus the installation phase after parts arrived.
fn technical_hours(m: &Milestones, reported: DateTime<Utc>) -> f64 {
    let troubleshooting = match (m.procurement_requested_at, m.installation_complete_at) {
        (Some(requested), _) => hours_between(reported, requested),
        (None, Some(installed)) => hours_between(reported, installed),
        (None, None) => 0.0,
    };
    let installation = span(m.available_at_store_at, m.installation_complete_at);
    troubleshooting + installation
}

/// Compute metrics for a raw milestone set (backfill is applied first).
pub fn compute_from_milestones(milestones: &Milestones) -> ComputedMetrics {
    let normalized = backfill(milestones);
    let path = DowntimePath::select(&normalized);

    let metrics = match path {
        DowntimePath::Milestones {
            reported,
            up_and_running,
        } => DowntimeMetrics {
            technical_time_hours: Hours::new(technical_hours(&normalized, reported)),
            procurement_time_hours: Hours::new(span(
                normalized.procurement_requested_at,
                normalized.available_at_store_at,
            )),
            ops_time_hours: Hours::new(span(normalized.test_start_at, Some(up_and_running))),
            total_downtime_hours: Hours::new(hours_between(reported, up_and_running)),
        },
        DowntimePath::DetectedClearedOnly { detected, cleared } => DowntimeMetrics {
            total_downtime_hours: Hours::new(hours_between(detected, cleared)),
            ..DowntimeMetrics::default()
        },
        DowntimePath::NoData => DowntimeMetrics::default(),
    };

    ComputedMetrics {
        metrics,
        reported_at: normalized.reported_at,
        up_and_running_at: normalized.up_and_running_at,
        path,
    }
}

/// Compute the derived fields of one event without touching it.
pub fn compute_metrics(event: &GroundingEvent) -> ComputedMetrics {
    compute_from_milestones(&event.milestones)
}

/// Write-path hook: store backfilled anchors, derived hours and the legacy flag.
///
/// Call this on every create/update that touches a milestone.
pub fn recompute_derived_fields(event: &mut GroundingEvent) -> ComputedMetrics {
    let computed = compute_metrics(event);
    event.milestones.reported_at = computed.reported_at;
    event.milestones.up_and_running_at = computed.up_and_running_at;
    event.metrics = computed.metrics;
    event.is_legacy = classifier::classify_computed(event, &computed).is_legacy();
    computed
}
