//! High-level database service layer.
//!
//! Repository-agnostic operations that work with any [`EventRepository`].
//! The write path keeps stored derived fields (the four hour buckets and the
//! legacy flag) in step with the milestones; the read path fetches events by
//! filter and hands them to the pure analytics in [`crate::services`].
//!
//! Reads never trust the stored derived fields: every analytics function
//! recomputes from milestones, so events written by other tools still report
//! correctly.
//!
//! # Usage
//!
//! ```no_run
//! use aog_rust::db::{services, repositories::LocalRepository, repository::EventFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let breakdown = services::get_three_bucket_breakdown(&repo, &EventFilter::all()).await?;
//!     println!("{} events", breakdown.total_event_count);
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::repository::{ErrorContext, EventFilter, EventRepository, RepositoryError, RepositoryResult};
use crate::models::{
    AircraftId, EventId, GroundingEvent, GroupedBreakdown, Milestones, MonthlyDowntime,
    RiskScoreResult, StageAnalytics, ThreeBucketBreakdown, YearOverYear,
};
use crate::services::{
    calculate_risk_score, compare_years, compute_grouped_breakdown, compute_monthly_trend,
    compute_stage_analytics, compute_three_bucket_breakdown, rank_fleet_risk,
    recompute_derived_fields, GroupKey, RiskSettings,
};

// ==================== Health & Connection ====================

/// Check if the repository is healthy.
pub async fn health_check<R: EventRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Write Path ====================

fn validate_event(event: &GroundingEvent) -> RepositoryResult<()> {
    let context = || {
        let ctx = ErrorContext::new("save_event").with_entity("event");
        match event.id {
            Some(id) => ctx.with_entity_id(id),
            None => ctx,
        }
    };

    if event.milestones.anchor().is_none() {
        return Err(RepositoryError::validation_with_context(
            "Event needs a detection or report time",
            context(),
        ));
    }
    if !(event.internal_cost.is_finite() && event.external_cost.is_finite())
        || event.internal_cost < 0.0
        || event.external_cost < 0.0
    {
        return Err(RepositoryError::validation_with_context(
            "Event costs must be finite and non-negative",
            context().with_details(format!(
                "internal={}, external={}",
                event.internal_cost, event.external_cost
            )),
        ));
    }
    Ok(())
}

/// Recompute derived fields and persist the event.
///
/// Events without an id are inserted; events with one replace the stored
/// record. Returns the event as stored.
pub async fn save_event<R: EventRepository + ?Sized>(
    repo: &R,
    event: &GroundingEvent,
) -> RepositoryResult<GroundingEvent> {
    validate_event(event)?;

    let mut prepared = event.clone();
    let computed = recompute_derived_fields(&mut prepared);
    debug!(
        "Saving event for aircraft {}: total={:.2}h legacy={}",
        prepared.aircraft_id,
        computed.metrics.total_downtime_hours.value(),
        prepared.is_legacy
    );

    match prepared.id {
        Some(_) => {
            repo.update_event(&prepared).await?;
            Ok(prepared)
        }
        None => repo.insert_event(&prepared).await,
    }
}

/// Replace the milestones of a stored event, recompute and persist.
pub async fn update_milestones<R: EventRepository + ?Sized>(
    repo: &R,
    id: EventId,
    milestones: Milestones,
) -> RepositoryResult<GroundingEvent> {
    let mut event = repo.get_event(id).await?;
    event.milestones = milestones;
    validate_event(&event).map_err(|e| e.with_operation("update_milestones"))?;

    recompute_derived_fields(&mut event);
    repo.update_event(&event).await?;
    info!(
        "Updated milestones for event {} (total {:.2}h)",
        id,
        event.metrics.total_downtime_hours.value()
    );
    Ok(event)
}

// ==================== Analytics Read Path ====================

/// Three-bucket breakdown over the events matching `filter`.
pub async fn get_three_bucket_breakdown<R: EventRepository + ?Sized>(
    repo: &R,
    filter: &EventFilter,
) -> RepositoryResult<ThreeBucketBreakdown> {
    let events = repo.list_events(filter).await?;
    Ok(compute_three_bucket_breakdown(&events))
}

/// One breakdown per aircraft, reason code or responsible party.
pub async fn get_grouped_breakdown<R: EventRepository + ?Sized>(
    repo: &R,
    filter: &EventFilter,
    key: GroupKey,
) -> RepositoryResult<Vec<GroupedBreakdown>> {
    let events = repo.list_events(filter).await?;
    Ok(compute_grouped_breakdown(&events, key))
}

/// Per-stage distributions and bottleneck over the events matching `filter`.
pub async fn get_stage_analytics<R: EventRepository + ?Sized>(
    repo: &R,
    filter: &EventFilter,
) -> RepositoryResult<StageAnalytics> {
    let events = repo.list_events(filter).await?;
    Ok(compute_stage_analytics(&events))
}

pub async fn get_monthly_trend<R: EventRepository + ?Sized>(
    repo: &R,
    filter: &EventFilter,
) -> RepositoryResult<Vec<MonthlyDowntime>> {
    let events = repo.list_events(filter).await?;
    Ok(compute_monthly_trend(&events))
}

/// Risk score of one aircraft against the whole fleet.
///
/// An aircraft with no events scores 0 rather than failing.
pub async fn get_risk_score<R: EventRepository + ?Sized>(
    repo: &R,
    aircraft_id: AircraftId,
    as_of: DateTime<Utc>,
    settings: &RiskSettings,
) -> RepositoryResult<RiskScoreResult> {
    let all_events = repo.list_events(&EventFilter::all()).await?;
    let own: Vec<GroundingEvent> = all_events
        .iter()
        .filter(|e| e.aircraft_id == aircraft_id)
        .cloned()
        .collect();
    Ok(calculate_risk_score(
        aircraft_id,
        &own,
        &all_events,
        as_of,
        settings,
    ))
}

/// Highest-risk aircraft first, at most `limit` entries.
pub async fn get_fleet_risk_ranking<R: EventRepository + ?Sized>(
    repo: &R,
    filter: &EventFilter,
    as_of: DateTime<Utc>,
    settings: &RiskSettings,
    limit: usize,
) -> RepositoryResult<Vec<RiskScoreResult>> {
    let events = repo.list_events(filter).await?;
    let mut ranking = rank_fleet_risk(&events, as_of, settings);
    ranking.truncate(limit);
    Ok(ranking)
}

/// Compare `current_year` with the year before it.
///
/// The filter's date window is ignored; the years select the events.
pub async fn get_year_over_year<R: EventRepository + ?Sized>(
    repo: &R,
    filter: &EventFilter,
    current_year: i32,
) -> RepositoryResult<YearOverYear> {
    let unbounded = EventFilter {
        from: None,
        to: None,
        ..filter.clone()
    };
    let events = repo.list_events(&unbounded).await?;
    Ok(compare_years(&events, current_year, current_year - 1))
}
