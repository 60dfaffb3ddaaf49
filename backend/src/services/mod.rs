//! Downtime decomposition engine.
//!
//! Everything in here is a pure, synchronous computation over events that
//! were already fetched from storage:
//!
//! - [`metrics`]: milestone timestamps -> technical / procurement / ops hours
//! - [`classifier`]: legacy vs complete events
//! - [`breakdown`], [`stages`], [`risk`], [`trends`]: fleet-level analytics

pub mod breakdown;
pub mod classifier;
pub mod metrics;
pub mod risk;
pub mod stages;
mod stats;
pub mod trends;

pub use breakdown::{compute_grouped_breakdown, compute_three_bucket_breakdown, GroupKey};
pub use classifier::{classify, is_legacy, EventClass};
pub use metrics::{
    backfill, compute_from_milestones, compute_metrics, recompute_derived_fields, ComputedMetrics,
    DowntimePath,
};
pub use risk::{calculate_risk_score, rank_fleet_risk, RiskSettings};
pub use stages::{compute_stage_analytics, compute_stage_analytics_by, stage_hours};
pub use trends::{compare_years, compute_monthly_trend};
