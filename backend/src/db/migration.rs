//! One-off migration of bulk-imported events.
//!
//! Imported records from the old system only carry detection and clearance
//! times. The migration fills the milestones the engine anchors on from those
//! bounds, flags records with no granular milestones as legacy, and stores
//! recomputed metrics. Running it twice changes nothing the second time.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::repository::{EventFilter, EventRepository, RepositoryResult};
use crate::models::{EventId, GroundingEvent};
use crate::services::recompute_derived_fields;

/// One event the migration could not persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationFailure {
    pub event_id: Option<EventId>,
    pub message: String,
}

/// Outcome counts of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub processed: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub failures: Vec<MigrationFailure>,
}

/// Apply the import backfill to one event in place.
///
/// Returns `false` when the event has neither bound and cannot be migrated.
pub fn migrate_event(event: &mut GroundingEvent) -> bool {
    let m = &mut event.milestones;
    if m.detected_at.is_none() && m.cleared_at.is_none() {
        return false;
    }

    if m.reported_at.is_none() {
        m.reported_at = m.detected_at;
    }
    if m.installation_complete_at.is_none() {
        m.installation_complete_at = m.cleared_at;
    }
    if m.up_and_running_at.is_none() {
        m.up_and_running_at = m.cleared_at;
    }
    if m.has_backfill_shape() {
        event.is_legacy = true;
    }

    recompute_derived_fields(event);
    true
}

/// Migrate every imported event in the repository.
///
/// Only the initial listing can fail the whole run; per-event write failures
/// are tallied in the report and the run continues.
pub async fn migrate_imported_events<R: EventRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<MigrationReport> {
    let events = repo.list_events(&EventFilter::imported()).await?;
    let mut report = MigrationReport::default();

    for original in events {
        report.processed += 1;

        let mut event = original.clone();
        if !migrate_event(&mut event) || event == original {
            report.skipped += 1;
            continue;
        }

        match repo.update_event(&event).await {
            Ok(()) => report.updated += 1,
            Err(e) => {
                warn!(
                    "Failed to migrate event {}: {}",
                    event
                        .id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "<unsaved>".to_string()),
                    e
                );
                report.errors += 1;
                report.failures.push(MigrationFailure {
                    event_id: event.id,
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        "Migration finished: processed={} updated={} skipped={} errors={}",
        report.processed, report.updated, report.skipped, report.errors
    );
    Ok(report)
}
