//! Three-bucket fleet breakdown.
//!
//! Complete events contribute their technical / procurement / ops hours to the
//! buckets; legacy events contribute only their total downtime, reported as a
//! separate category.

use std::collections::BTreeMap;

use qtty::time::Hours;
use serde::{Deserialize, Serialize};

use crate::models::{
    BucketStats, DowntimeCategory, DowntimeSlice, GroundingEvent, GroupedBreakdown,
    LegacyDowntime, ThreeBucketBreakdown,
};
use crate::services::classifier::{classify_computed, EventClass};
use crate::services::metrics::{compute_metrics, ComputedMetrics};
use crate::services::stats::{percentage, safe_div};

/// Label for events without a value for the grouping key.
pub const UNSPECIFIED: &str = "Unspecified";

/// An event paired with its freshly computed metrics and class.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ClassifiedEvent<'a> {
    pub event: &'a GroundingEvent,
    pub computed: ComputedMetrics,
    pub class: EventClass,
}

pub(crate) fn classify_events(events: &[GroundingEvent]) -> Vec<ClassifiedEvent<'_>> {
    events
        .iter()
        .map(|event| {
            let computed = compute_metrics(event);
            let class = classify_computed(event, &computed);
            ClassifiedEvent {
                event,
                computed,
                class,
            }
        })
        .collect()
}

/// Categorical key used to split events into cohorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Aircraft,
    ReasonCode,
    ResponsibleParty,
}

impl GroupKey {
    pub(crate) fn value_for(&self, event: &GroundingEvent) -> String {
        let raw = match self {
            GroupKey::Aircraft => return event.aircraft_id.to_string(),
            GroupKey::ReasonCode => event.reason_code.as_deref(),
            GroupKey::ResponsibleParty => event.responsible_party.as_deref(),
        };
        match raw.map(str::trim) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => UNSPECIFIED.to_string(),
        }
    }
}

fn bucket_stats(total: f64, complete_count: usize, bucket_total: f64) -> BucketStats {
    BucketStats {
        total_hours: Hours::new(total),
        average_hours: Hours::new(safe_div(total, complete_count as f64)),
        percentage: percentage(total, bucket_total),
    }
}

pub(crate) fn breakdown_from_classified(events: &[ClassifiedEvent<'_>]) -> ThreeBucketBreakdown {
    let mut technical = 0.0;
    let mut procurement = 0.0;
    let mut ops = 0.0;
    let mut complete_count = 0usize;
    let mut legacy_count = 0usize;
    let mut legacy_hours = 0.0;

    for item in events {
        let metrics = &item.computed.metrics;
        match item.class {
            EventClass::Legacy => {
                legacy_count += 1;
                legacy_hours += metrics.total_downtime_hours.value();
            }
            EventClass::Complete => {
                complete_count += 1;
                technical += metrics.technical_time_hours.value();
                procurement += metrics.procurement_time_hours.value();
                ops += metrics.ops_time_hours.value();
            }
        }
    }

    let bucket_total = technical + procurement + ops;

    ThreeBucketBreakdown {
        technical: bucket_stats(technical, complete_count, bucket_total),
        procurement: bucket_stats(procurement, complete_count, bucket_total),
        ops: bucket_stats(ops, complete_count, bucket_total),
        legacy: LegacyDowntime {
            event_count: legacy_count,
            total_downtime_hours: Hours::new(legacy_hours),
        },
        complete_event_count: complete_count,
        total_event_count: events.len(),
        bucket_total_hours: Hours::new(bucket_total),
    }
}

/// Aggregate events into the technical / procurement / ops breakdown.
///
/// Bucket averages divide by the number of complete events, so buckets that
/// many events skip show a low average rather than an undefined one.
pub fn compute_three_bucket_breakdown(events: &[GroundingEvent]) -> ThreeBucketBreakdown {
    breakdown_from_classified(&classify_events(events))
}

impl ThreeBucketBreakdown {
    /// Four-slice view: the three buckets plus legacy downtime, with
    /// percentages taken over all four.
    pub fn slices(&self) -> Vec<DowntimeSlice> {
        let entries = [
            (DowntimeCategory::Technical, self.technical.total_hours.value()),
            (DowntimeCategory::Procurement, self.procurement.total_hours.value()),
            (DowntimeCategory::Ops, self.ops.total_hours.value()),
            (DowntimeCategory::Legacy, self.legacy.total_downtime_hours.value()),
        ];
        let whole: f64 = entries.iter().map(|(_, hours)| hours).sum();

        entries
            .into_iter()
            .map(|(category, hours)| DowntimeSlice {
                category,
                hours: Hours::new(hours),
                percentage: percentage(hours, whole),
            })
            .collect()
    }

    /// Bucket hours plus legacy downtime.
    pub fn total_hours_with_legacy(&self) -> f64 {
        self.bucket_total_hours.value() + self.legacy.total_downtime_hours.value()
    }
}

/// One breakdown per value of `key`, largest total downtime first.
pub fn compute_grouped_breakdown(events: &[GroundingEvent], key: GroupKey) -> Vec<GroupedBreakdown> {
    let mut groups: BTreeMap<String, Vec<ClassifiedEvent<'_>>> = BTreeMap::new();
    for item in classify_events(events) {
        groups.entry(key.value_for(item.event)).or_default().push(item);
    }

    let mut result: Vec<GroupedBreakdown> = groups
        .into_iter()
        .map(|(group, items)| {
            let total_downtime: f64 = items
                .iter()
                .map(|i| i.computed.metrics.total_downtime_hours.value())
                .sum();
            GroupedBreakdown {
                key: group,
                event_count: items.len(),
                total_downtime_hours: Hours::new(total_downtime),
                internal_cost: items.iter().map(|i| i.event.internal_cost).sum(),
                external_cost: items.iter().map(|i| i.event.external_cost).sum(),
                breakdown: breakdown_from_classified(&items),
            }
        })
        .collect();

    result.sort_by(|a, b| {
        b.total_downtime_hours
            .value()
            .partial_cmp(&a.total_downtime_hours.value())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    result
}
