//! Downtime over time: monthly bucket totals and year-over-year comparison.

use std::collections::BTreeMap;

use chrono::Datelike;
use qtty::time::Hours;

use crate::models::{GroundingEvent, MetricDelta, MonthlyDowntime, ThreeBucketBreakdown, YearOverYear};
use crate::services::breakdown::{breakdown_from_classified, classify_events, ClassifiedEvent};
use crate::services::stats::percent_change;

fn delta(current: f64, previous: f64) -> MetricDelta {
    MetricDelta {
        current,
        previous,
        delta: current - previous,
        percent_change: percent_change(current, previous),
    }
}

/// Bucket totals per calendar month of the event anchor, oldest first.
///
/// Events with no usable anchor are left out.
pub fn compute_monthly_trend(events: &[GroundingEvent]) -> Vec<MonthlyDowntime> {
    let mut months: BTreeMap<(i32, u32), Vec<ClassifiedEvent<'_>>> = BTreeMap::new();
    for item in classify_events(events) {
        if let Some(anchor) = item.event.milestones.anchor() {
            months
                .entry((anchor.year(), anchor.month()))
                .or_default()
                .push(item);
        }
    }

    months
        .into_iter()
        .map(|((year, month), items)| {
            let breakdown = breakdown_from_classified(&items);
            MonthlyDowntime {
                year,
                month,
                label: format!("{:04}-{:02}", year, month),
                event_count: items.len(),
                technical_hours: breakdown.technical.total_hours,
                procurement_hours: breakdown.procurement.total_hours,
                ops_hours: breakdown.ops.total_hours,
                legacy_hours: breakdown.legacy.total_downtime_hours,
            }
        })
        .collect()
}

fn breakdown_for_year(events: &[GroundingEvent], year: i32) -> (usize, f64, ThreeBucketBreakdown) {
    let items: Vec<ClassifiedEvent<'_>> = classify_events(events)
        .into_iter()
        .filter(|item| item.event.year() == Some(year))
        .collect();
    let total_downtime: f64 = items
        .iter()
        .map(|i| i.computed.metrics.total_downtime_hours.value())
        .sum();
    (items.len(), total_downtime, breakdown_from_classified(&items))
}

/// Compare downtime of `current_year` with `previous_year`.
pub fn compare_years(events: &[GroundingEvent], current_year: i32, previous_year: i32) -> YearOverYear {
    let (current_count, current_total, current) = breakdown_for_year(events, current_year);
    let (previous_count, previous_total, previous) = breakdown_for_year(events, previous_year);

    let hours = |h: Hours| h.value();

    YearOverYear {
        current_year,
        previous_year,
        event_count: delta(current_count as f64, previous_count as f64),
        total_downtime_hours: delta(current_total, previous_total),
        technical_hours: delta(
            hours(current.technical.total_hours),
            hours(previous.technical.total_hours),
        ),
        procurement_hours: delta(
            hours(current.procurement.total_hours),
            hours(previous.procurement.total_hours),
        ),
        ops_hours: delta(hours(current.ops.total_hours), hours(previous.ops.total_hours)),
        legacy_hours: delta(
            hours(current.legacy.total_downtime_hours),
            hours(previous.legacy.total_downtime_hours),
        ),
    }
}
