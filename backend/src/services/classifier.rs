//! Legacy vs complete classification of grounding events.
//!
//! A legacy event only has a total downtime figure; it must never be shown
//! as if its buckets were real zero measurements.

use serde::{Deserialize, Serialize};

use crate::models::GroundingEvent;
use crate::services::metrics::{compute_metrics, ComputedMetrics, DowntimePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventClass {
    /// Total downtime only, no bucket decomposition.
    Legacy,
    /// Buckets are meaningful (possibly zero for open events).
    Complete,
}

impl EventClass {
    pub fn is_legacy(&self) -> bool {
        matches!(self, EventClass::Legacy)
    }

    /// Label used by tables and charts.
    pub fn label(&self) -> &'static str {
        match self {
            EventClass::Legacy => "Legacy",
            EventClass::Complete => "Complete",
        }
    }
}

/// Classify an event given its computed metrics.
///
/// Legacy when any of:
/// - all buckets are 0 while total downtime is positive,
/// - only detection/clearance bounds were usable,
/// - the stored flag is set and the milestones still have exactly the shape a
///   detect/clear backfill leaves (a flag made stale by later manual entry is ignored).
pub fn classify_computed(event: &GroundingEvent, computed: &ComputedMetrics) -> EventClass {
    let undecomposed =
        computed.metrics.buckets_empty() && computed.metrics.total_downtime_hours.value() > 0.0;
    let coarse_only = matches!(computed.path, DowntimePath::DetectedClearedOnly { .. });
    let flagged = event.is_legacy && event.milestones.has_backfill_shape();

    if undecomposed || coarse_only || flagged {
        EventClass::Legacy
    } else {
        EventClass::Complete
    }
}

pub fn classify(event: &GroundingEvent) -> EventClass {
    classify_computed(event, &compute_metrics(event))
}

pub fn is_legacy(event: &GroundingEvent) -> bool {
    classify(event).is_legacy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AircraftId;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn at(hours: i64) -> Option<DateTime<Utc>> {
        Some(t0() + Duration::hours(hours))
    }

    #[test]
    fn test_detected_cleared_only_is_legacy() {
        let mut event = GroundingEvent::new(AircraftId(1), t0());
        event.milestones.cleared_at = at(20);
        assert_eq!(classify(&event), EventClass::Legacy);
        assert!(is_legacy(&event));
    }

    #[test]
    fn test_full_milestones_is_complete() {
        let mut event = GroundingEvent::new(AircraftId(1), t0());
        event.milestones.reported_at = at(0);
        event.milestones.procurement_requested_at = at(2);
        event.milestones.available_at_store_at = at(10);
        event.milestones.installation_complete_at = at(12);
        event.milestones.test_start_at = at(13);
        event.milestones.up_and_running_at = at(15);
        assert_eq!(classify(&event), EventClass::Complete);
    }

    #[test]
    fn test_backfilled_import_with_flag_is_legacy() {
        // Shape left by the bulk migration: anchors copied from detect/clear.
        let mut event = GroundingEvent::new(AircraftId(1), t0());
        event.milestones.cleared_at = at(9);
        event.milestones.reported_at = at(0);
        event.milestones.installation_complete_at = at(9);
        event.milestones.up_and_running_at = at(9);
        event.is_imported = true;
        event.is_legacy = true;
        assert_eq!(classify(&event), EventClass::Legacy);

        // Without the flag the same shape is a real technical-only event.
        event.is_legacy = false;
        assert_eq!(classify(&event), EventClass::Complete);
    }

    #[test]
    fn test_stale_flag_is_ignored() {
        let mut event = GroundingEvent::new(AircraftId(1), t0());
        event.is_legacy = true;
        event.milestones.procurement_requested_at = at(1);
        event.milestones.available_at_store_at = at(4);
        event.milestones.up_and_running_at = at(6);
        assert_eq!(classify(&event), EventClass::Complete);
    }

    #[test]
    fn test_flag_ignored_once_anchors_are_entered() {
        let mut event = GroundingEvent::new(AircraftId(1), t0());
        event.milestones.cleared_at = at(48);
        event.milestones.reported_at = at(1);
        event.milestones.installation_complete_at = at(6);
        event.milestones.up_and_running_at = at(6);
        event.is_legacy = true;
        assert_eq!(classify(&event), EventClass::Complete);
    }

    #[test]
    fn test_open_event_is_complete_with_zero_downtime() {
        let event = GroundingEvent::new(AircraftId(1), t0());
        assert_eq!(classify(&event), EventClass::Complete);
    }

    #[test]
    fn test_reversed_anchors_without_buckets_is_complete() {
        // Zero total, zero buckets: nothing to present as legacy downtime.
        let mut event = GroundingEvent::new(AircraftId(1), t0());
        event.milestones.reported_at = at(5);
        event.milestones.up_and_running_at = at(1);
        assert_eq!(classify(&event), EventClass::Complete);
    }

    #[test]
    fn test_labels() {
        assert_eq!(EventClass::Legacy.label(), "Legacy");
        assert_eq!(EventClass::Complete.label(), "Complete");
    }
}
