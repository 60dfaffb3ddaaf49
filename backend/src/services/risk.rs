//! Per-aircraft risk scoring.
//!
//! Four 0-100 sub-scores are combined with fixed weights
//! (frequency 0.4, downtime trend 0.3, cost trend 0.2, recurring issues 0.1):
//!
//! - **Recent frequency**: events in the recent window vs the fleet per-aircraft
//!   average; 0 at or below average, 100 at `frequency_ceiling_ratio` times it.
//! - **Downtime / cost trend**: the aircraft's history split chronologically in
//!   halves; 0 when the second half is flat or better, 100 at
//!   `trend_ceiling_ratio` times the first half.
//! - **Recurring issues**: 0 without a repeated reason code, 100 once one code
//!   appears `recurring_issue_threshold` times.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AircraftId, GroundingEvent, RiskFactor, RiskFactorKind, RiskLevel, RiskScoreResult};
use crate::services::metrics::compute_metrics;
use crate::services::stats::{mean, percentage};

/// Tunables for the risk sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSettings {
    pub recent_window_days: i64,
    pub frequency_ceiling_ratio: f64,
    pub trend_ceiling_ratio: f64,
    pub recurring_issue_threshold: usize,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            recent_window_days: 30,
            frequency_ceiling_ratio: 3.0,
            trend_ceiling_ratio: 2.0,
            recurring_issue_threshold: 5,
        }
    }
}

/// Linear 0-100 scale: 0 at `ratio <= 1`, 100 at `ratio >= ceiling`.
fn scale_above_baseline(ratio: f64, ceiling: f64) -> f64 {
    if ratio.is_nan() || ratio <= 1.0 {
        return 0.0;
    }
    if ceiling <= 1.0 || ratio.is_infinite() {
        return 100.0;
    }
    ((ratio - 1.0) / (ceiling - 1.0) * 100.0).clamp(0.0, 100.0)
}

fn in_window(event: &GroundingEvent, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    event
        .milestones
        .anchor()
        .map(|t| t >= start && t <= end)
        .unwrap_or(false)
}

fn recent_frequency_score(
    aircraft_id: AircraftId,
    own: &[&GroundingEvent],
    all_events: &[GroundingEvent],
    as_of: DateTime<Utc>,
    settings: &RiskSettings,
) -> f64 {
    let start = TimeDelta::try_days(settings.recent_window_days)
        .and_then(|window| as_of.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let own_recent = own.iter().filter(|e| in_window(e, start, as_of)).count();
    if own_recent == 0 {
        return 0.0;
    }

    let mut fleet: BTreeSet<AircraftId> = all_events.iter().map(|e| e.aircraft_id).collect();
    fleet.insert(aircraft_id);
    let fleet_recent = all_events
        .iter()
        .filter(|e| in_window(e, start, as_of))
        .count();
    let fleet_average = fleet_recent as f64 / fleet.len() as f64;
    if fleet_average <= 0.0 {
        return 100.0;
    }

    scale_above_baseline(own_recent as f64 / fleet_average, settings.frequency_ceiling_ratio)
}

/// Compare the mean of the later half of `values` against the earlier half.
fn halves_trend_score(values: &[f64], ceiling: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let (first, second) = values.split_at(values.len() / 2);
    let before = mean(first);
    let after = mean(second);
    if before <= 0.0 {
        return if after > 0.0 { 100.0 } else { 0.0 };
    }
    scale_above_baseline(after / before, ceiling)
}

fn recurring_issue_score(own: &[&GroundingEvent], threshold: usize) -> f64 {
    if own.len() < 2 {
        return 0.0;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for event in own {
        if let Some(code) = event.reason_code.as_deref().map(str::trim) {
            if !code.is_empty() {
                *counts.entry(code).or_insert(0) += 1;
            }
        }
    }

    let most_repeated = counts.values().copied().max().unwrap_or(0);
    if most_repeated < 2 {
        return 0.0;
    }
    if threshold <= 2 {
        return 100.0;
    }
    ((most_repeated - 1) as f64 / (threshold - 1) as f64 * 100.0).min(100.0)
}

/// Score one aircraft. `events` may contain other aircraft; they are ignored.
pub fn calculate_risk_score(
    aircraft_id: AircraftId,
    events: &[GroundingEvent],
    all_events: &[GroundingEvent],
    as_of: DateTime<Utc>,
    settings: &RiskSettings,
) -> RiskScoreResult {
    let mut own: Vec<&GroundingEvent> = events
        .iter()
        .filter(|e| e.aircraft_id == aircraft_id)
        .collect();

    if own.is_empty() {
        return RiskScoreResult {
            aircraft_id,
            score: 0.0,
            level: RiskLevel::Low,
            factors: vec![],
        };
    }

    own.sort_by_key(|e| e.milestones.anchor());

    let downtimes: Vec<f64> = own
        .iter()
        .map(|e| compute_metrics(e).metrics.total_downtime_hours.value())
        .collect();
    let costs: Vec<f64> = own.iter().map(|e| e.total_cost()).collect();

    let sub_scores = [
        (
            RiskFactorKind::RecentFrequency,
            recent_frequency_score(aircraft_id, &own, all_events, as_of, settings),
        ),
        (
            RiskFactorKind::DowntimeTrend,
            halves_trend_score(&downtimes, settings.trend_ceiling_ratio),
        ),
        (
            RiskFactorKind::CostTrend,
            halves_trend_score(&costs, settings.trend_ceiling_ratio),
        ),
        (
            RiskFactorKind::RecurringIssues,
            recurring_issue_score(&own, settings.recurring_issue_threshold),
        ),
    ];

    let score = sub_scores
        .iter()
        .map(|(kind, sub)| sub * kind.weight())
        .sum::<f64>()
        .min(100.0);

    let factors = sub_scores
        .iter()
        .filter(|(kind, sub)| sub * kind.weight() > 0.0)
        .map(|&(kind, sub)| {
            let contribution = sub * kind.weight();
            RiskFactor {
                kind,
                sub_score: sub,
                weight: kind.weight(),
                contribution,
                percentage: percentage(contribution, score),
            }
        })
        .collect();

    RiskScoreResult {
        aircraft_id,
        score,
        level: RiskLevel::from_score(score),
        factors,
    }
}

/// Score every aircraft present in `all_events`, highest risk first.
pub fn rank_fleet_risk(
    all_events: &[GroundingEvent],
    as_of: DateTime<Utc>,
    settings: &RiskSettings,
) -> Vec<RiskScoreResult> {
    let fleet: BTreeSet<AircraftId> = all_events.iter().map(|e| e.aircraft_id).collect();

    let mut results: Vec<RiskScoreResult> = fleet
        .into_iter()
        .map(|id| calculate_risk_score(id, all_events, all_events, as_of, settings))
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.aircraft_id.cmp(&b.aircraft_id))
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 30, 12, 0, 0).unwrap()
    }

    fn event(aircraft: i64, days_ago: i64, downtime_hours: i64, cost: f64, reason: &str) -> GroundingEvent {
        let detected = as_of() - Duration::days(days_ago);
        let mut e = GroundingEvent::new(AircraftId(aircraft), detected);
        e.milestones.cleared_at = Some(detected + Duration::hours(downtime_hours));
        e.internal_cost = cost;
        if !reason.is_empty() {
            e.reason_code = Some(reason.to_string());
        }
        e
    }

    fn factor(result: &RiskScoreResult, kind: RiskFactorKind) -> Option<&RiskFactor> {
        result.factors.iter().find(|f| f.kind == kind)
    }

    #[test]
    fn test_no_events_scores_zero() {
        let fleet = vec![event(2, 3, 10, 0.0, "")];
        let result = calculate_risk_score(AircraftId(1), &[], &fleet, as_of(), &RiskSettings::default());
        assert_eq!(result.score, 0.0);
        assert!(result.factors.is_empty());
        assert_eq!(result.level, RiskLevel::Low);
    }

    #[test]
    fn test_single_event_only_frequency_counts() {
        // Aircraft 1 has one recent event; aircraft 2 and 3 have none recently.
        let fleet = vec![
            event(1, 2, 50, 9000.0, "ENG"),
            event(2, 200, 5, 10.0, "HYD"),
            event(3, 300, 5, 10.0, "HYD"),
        ];
        let result = calculate_risk_score(AircraftId(1), &fleet, &fleet, as_of(), &RiskSettings::default());

        // Fleet average = 1 recent event / 3 aircraft; ratio 3 -> 100.
        let frequency = factor(&result, RiskFactorKind::RecentFrequency).unwrap();
        assert!((frequency.sub_score - 100.0).abs() < 1e-9);
        assert!(factor(&result, RiskFactorKind::DowntimeTrend).is_none());
        assert!(factor(&result, RiskFactorKind::CostTrend).is_none());
        assert!(factor(&result, RiskFactorKind::RecurringIssues).is_none());
        assert!((result.score - 40.0).abs() < 1e-9);
        assert!((frequency.percentage - 100.0).abs() < 1e-9);
        assert_eq!(result.level, RiskLevel::Medium);
    }

    #[test]
    fn test_oversized_window_covers_all_history() {
        let fleet = vec![
            event(1, 2, 50, 9000.0, "ENG"),
            event(2, 200, 5, 10.0, "HYD"),
            event(3, 300, 5, 10.0, "HYD"),
        ];
        for days in [100_000_000, i64::MAX] {
            let settings = RiskSettings {
                recent_window_days: days,
                ..RiskSettings::default()
            };
            // Every aircraft has one event in the window: at the fleet average.
            let result = calculate_risk_score(AircraftId(1), &fleet, &fleet, as_of(), &settings);
            assert_eq!(result.score, 0.0);
        }
    }

    #[test]
    fn test_at_fleet_average_frequency_is_zero() {
        let fleet = vec![event(1, 1, 4, 0.0, ""), event(2, 1, 4, 0.0, "")];
        let result = calculate_risk_score(AircraftId(1), &fleet, &fleet, as_of(), &RiskSettings::default());
        assert_eq!(result.score, 0.0);
        assert!(result.factors.is_empty());
    }

    #[test]
    fn test_downtime_doubling_scores_full_trend() {
        let own = vec![
            event(1, 400, 10, 100.0, ""),
            event(1, 350, 10, 100.0, ""),
            event(1, 200, 20, 100.0, ""),
            event(1, 150, 20, 100.0, ""),
        ];
        let result = calculate_risk_score(AircraftId(1), &own, &own, as_of(), &RiskSettings::default());

        let trend = factor(&result, RiskFactorKind::DowntimeTrend).unwrap();
        assert!((trend.sub_score - 100.0).abs() < 1e-9);
        assert!((trend.contribution - 30.0).abs() < 1e-9);
        assert!(factor(&result, RiskFactorKind::CostTrend).is_none());
        assert!((result.score - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_improving_trend_is_zero_and_halves_are_chronological() {
        // Supplied newest first; sorting must put the long events in the first half.
        let own = vec![
            event(1, 100, 5, 50.0, ""),
            event(1, 200, 5, 50.0, ""),
            event(1, 300, 40, 500.0, ""),
            event(1, 400, 40, 500.0, ""),
        ];
        let result = calculate_risk_score(AircraftId(1), &own, &own, as_of(), &RiskSettings::default());
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_cost_trend_partial() {
        let own = vec![event(1, 300, 8, 100.0, ""), event(1, 200, 8, 150.0, "")];
        let result = calculate_risk_score(AircraftId(1), &own, &own, as_of(), &RiskSettings::default());
        let cost = factor(&result, RiskFactorKind::CostTrend).unwrap();
        assert!((cost.sub_score - 50.0).abs() < 1e-9);
        assert!((result.score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_recurring_issue_scaling() {
        let settings = RiskSettings::default();
        let make = |n: usize| -> Vec<GroundingEvent> {
            (0..n).map(|i| event(1, 100 + i as i64, 4, 0.0, "HYD")).collect()
        };

        let two = calculate_risk_score(AircraftId(1), &make(2), &make(2), as_of(), &settings);
        let sub = factor(&two, RiskFactorKind::RecurringIssues).unwrap().sub_score;
        assert!((sub - 25.0).abs() < 1e-9);

        let five = calculate_risk_score(AircraftId(1), &make(5), &make(5), as_of(), &settings);
        assert_eq!(factor(&five, RiskFactorKind::RecurringIssues).unwrap().sub_score, 100.0);

        let seven = calculate_risk_score(AircraftId(1), &make(7), &make(7), as_of(), &settings);
        assert_eq!(factor(&seven, RiskFactorKind::RecurringIssues).unwrap().sub_score, 100.0);
    }

    #[test]
    fn test_factor_percentages_sum_to_hundred() {
        let own = vec![
            event(1, 200, 10, 100.0, "HYD"),
            event(1, 20, 30, 300.0, "HYD"),
            event(1, 5, 30, 300.0, "HYD"),
        ];
        let mut fleet = own.clone();
        fleet.push(event(2, 400, 1, 0.0, ""));
        fleet.push(event(3, 400, 1, 0.0, ""));

        let result = calculate_risk_score(AircraftId(1), &own, &fleet, as_of(), &RiskSettings::default());
        assert!(result.score > 0.0 && result.score <= 100.0);
        let sum: f64 = result.factors.iter().map(|f| f.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_rank_fleet_risk_orders_by_score() {
        // 2: frequent recent events, 3: downtime doubling, 1: nothing notable.
        let fleet = vec![
            event(1, 400, 4, 0.0, ""),
            event(2, 3, 4, 0.0, ""),
            event(2, 2, 4, 0.0, ""),
            event(3, 400, 4, 0.0, ""),
            event(3, 300, 8, 0.0, ""),
        ];
        let ranking = rank_fleet_risk(&fleet, as_of(), &RiskSettings::default());
        let order: Vec<i64> = ranking.iter().map(|r| r.aircraft_id.value()).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert_eq!(ranking[2].score, 0.0);
    }

    #[test]
    fn test_scale_above_baseline() {
        assert_eq!(scale_above_baseline(0.5, 3.0), 0.0);
        assert_eq!(scale_above_baseline(1.0, 3.0), 0.0);
        assert_eq!(scale_above_baseline(2.0, 3.0), 50.0);
        assert_eq!(scale_above_baseline(9.0, 3.0), 100.0);
    }
}
