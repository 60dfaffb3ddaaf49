//! Repository trait for grounding-event storage.
//!
//! The analytics engine only ever sees slices of [`GroundingEvent`]; this
//! trait is the seam between it and whatever persists the events. Services
//! in [`crate::db::services`] take `&dyn EventRepository` so the backend can
//! be swapped without touching the computations.

pub mod error;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use crate::models::{Aircraft, AircraftId, EventId, GroundingEvent};

/// Selection criteria for listing events.
///
/// The date window is inclusive and applies to the event anchor
/// (detection time, else report time). Events without an anchor never match
/// a dated window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub aircraft_id: Option<AircraftId>,
    #[serde(default)]
    pub fleet_group: Option<String>,
    /// Only events that came in through a bulk import.
    #[serde(default)]
    pub imported_only: bool,
}

impl EventFilter {
    /// Filter matching every event.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_aircraft(aircraft_id: AircraftId) -> Self {
        Self {
            aircraft_id: Some(aircraft_id),
            ..Default::default()
        }
    }

    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        }
    }

    pub fn imported() -> Self {
        Self {
            imported_only: true,
            ..Default::default()
        }
    }

    /// Check an event against the filter.
    ///
    /// `fleet_group` is the group of the event's aircraft, resolved by the
    /// caller since events do not carry it.
    pub fn matches(&self, event: &GroundingEvent, fleet_group: Option<&str>) -> bool {
        if self.imported_only && !event.is_imported {
            return false;
        }
        if let Some(aircraft_id) = self.aircraft_id {
            if event.aircraft_id != aircraft_id {
                return false;
            }
        }
        if let Some(ref group) = self.fleet_group {
            if fleet_group != Some(group.as_str()) {
                return false;
            }
        }
        if self.from.is_some() || self.to.is_some() {
            let Some(anchor) = event.milestones.anchor() else {
                return false;
            };
            if self.from.is_some_and(|from| anchor < from) {
                return false;
            }
            if self.to.is_some_and(|to| anchor > to) {
                return false;
            }
        }
        true
    }
}

/// Storage operations for grounding events and aircraft.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Check if the storage backend is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Store a new event, returning it with its assigned id.
    ///
    /// An event that already carries an id keeps it; inserting a second event
    /// with the same id is a validation error.
    async fn insert_event(&self, event: &GroundingEvent) -> RepositoryResult<GroundingEvent>;

    /// Replace a stored event. The event must carry the id of an existing record.
    async fn update_event(&self, event: &GroundingEvent) -> RepositoryResult<()>;

    async fn get_event(&self, id: EventId) -> RepositoryResult<GroundingEvent>;

    /// List events matching `filter`, ordered by id.
    async fn list_events(&self, filter: &EventFilter) -> RepositoryResult<Vec<GroundingEvent>>;

    async fn upsert_aircraft(&self, aircraft: &Aircraft) -> RepositoryResult<()>;

    /// All known aircraft, ordered by id.
    async fn list_aircraft(&self) -> RepositoryResult<Vec<Aircraft>>;
}
