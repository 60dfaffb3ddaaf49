//! Read-only analytics views built from grounding events.
//!
//! None of these are persisted; every request recomputes them from the source
//! events.

use qtty::time::Hours;
use serde::{Deserialize, Serialize};

use super::event::AircraftId;

/// Totals for one downtime bucket across a set of complete events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    pub total_hours: Hours,
    /// Total divided by the number of complete events.
    pub average_hours: Hours,
    /// Share of the combined three-bucket total, 0-100.
    pub percentage: f64,
}

/// Downtime that cannot be decomposed into buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyDowntime {
    pub event_count: usize,
    pub total_downtime_hours: Hours,
}

/// Technical / procurement / ops split over a set of events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeBucketBreakdown {
    pub technical: BucketStats,
    pub procurement: BucketStats,
    pub ops: BucketStats,
    /// Reported next to the buckets, never folded into their percentages.
    pub legacy: LegacyDowntime,
    pub complete_event_count: usize,
    pub total_event_count: usize,
    /// Sum of the three bucket totals.
    pub bucket_total_hours: Hours,
}

/// Display category for a slice of downtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DowntimeCategory {
    Technical,
    Procurement,
    Ops,
    Legacy,
}

impl DowntimeCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Technical => "Technical",
            Self::Procurement => "Procurement",
            Self::Ops => "Ops",
            Self::Legacy => "Legacy",
        }
    }
}

/// One slice of the four-way view (three buckets plus legacy).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DowntimeSlice {
    pub category: DowntimeCategory,
    pub hours: Hours,
    /// Share of all four slices, 0-100.
    pub percentage: f64,
}

/// Breakdown for one value of a grouping key (aircraft, reason code, party).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedBreakdown {
    pub key: String,
    pub event_count: usize,
    pub total_downtime_hours: Hours,
    pub internal_cost: f64,
    pub external_cost: f64,
    pub breakdown: ThreeBucketBreakdown,
}

/// Bucket totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDowntime {
    pub year: i32,
    pub month: u32,
    /// `YYYY-MM`
    pub label: String,
    pub event_count: usize,
    pub technical_hours: Hours,
    pub procurement_hours: Hours,
    pub ops_hours: Hours,
    pub legacy_hours: Hours,
}

/// Current vs previous value of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub current: f64,
    pub previous: f64,
    pub delta: f64,
    /// Percentage change relative to `previous`, 0 when `previous` is 0.
    pub percent_change: f64,
}

/// Year-over-year comparison of downtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearOverYear {
    pub current_year: i32,
    pub previous_year: i32,
    pub event_count: MetricDelta,
    pub total_downtime_hours: MetricDelta,
    pub technical_hours: MetricDelta,
    pub procurement_hours: MetricDelta,
    pub ops_hours: MetricDelta,
    pub legacy_hours: MetricDelta,
}

/// Interval between two consecutive milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reported -> procurement requested
    Troubleshooting,
    /// Procurement requested -> available at store
    Procurement,
    /// Available at store -> issued back
    StoreIssue,
    /// Issued back -> installation complete
    Installation,
    /// Installation complete -> test start
    PreTest,
    /// Test start -> up and running
    Testing,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Troubleshooting,
        Stage::Procurement,
        Stage::StoreIssue,
        Stage::Installation,
        Stage::PreTest,
        Stage::Testing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Troubleshooting => "Reported → Procurement Requested",
            Stage::Procurement => "Procurement Requested → Available at Store",
            Stage::StoreIssue => "Available at Store → Issued Back",
            Stage::Installation => "Issued Back → Installation Complete",
            Stage::PreTest => "Installation Complete → Test Start",
            Stage::Testing => "Test Start → Up and Running",
        }
    }
}

/// Distribution of one stage across a cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    pub stage: Stage,
    pub label: String,
    pub count: usize,
    pub average_hours: Hours,
    pub median_hours: Hours,
    pub max_hours: Hours,
}

/// Stage distributions plus the bottleneck for one cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageAnalytics {
    pub event_count: usize,
    pub stages: Vec<StageStats>,
    /// Stage with the highest average, `None` when no stage has data.
    pub bottleneck: Option<Stage>,
}

/// Stage analytics for one cohort value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortStageAnalytics {
    pub cohort: String,
    pub analytics: StageAnalytics,
}

/// Factors feeding the aircraft risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactorKind {
    RecentFrequency,
    DowntimeTrend,
    CostTrend,
    RecurringIssues,
}

impl RiskFactorKind {
    /// Weight of this factor in the combined score.
    pub fn weight(&self) -> f64 {
        match self {
            Self::RecentFrequency => 0.4,
            Self::DowntimeTrend => 0.3,
            Self::CostTrend => 0.2,
            Self::RecurringIssues => 0.1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RecentFrequency => "Recent event frequency",
            Self::DowntimeTrend => "Downtime trend",
            Self::CostTrend => "Cost trend",
            Self::RecurringIssues => "Recurring issues",
        }
    }
}

/// One weighted contribution to a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub kind: RiskFactorKind,
    /// Sub-score before weighting, 0-100.
    pub sub_score: f64,
    pub weight: f64,
    /// `sub_score * weight`
    pub contribution: f64,
    /// Share of the final score, 0-100.
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            Self::Critical
        } else if score >= 50.0 {
            Self::High
        } else if score >= 25.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Per-aircraft risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScoreResult {
    pub aircraft_id: AircraftId,
    /// 0-100
    pub score: f64,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
}
