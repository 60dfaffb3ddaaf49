//! In-memory local repository implementation.
//!
//! Events and aircraft live in ordered maps behind a single lock, which gives
//! deterministic listing order for tests and for the command-line tool.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{Aircraft, AircraftId, EventId, GroundingEvent};

/// In-memory local repository.
///
/// # Example
/// ```
/// use aog_rust::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// repo.set_healthy(false);
/// assert_eq!(repo.event_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    events: BTreeMap<EventId, GroundingEvent>,
    aircraft: BTreeMap<AircraftId, Aircraft>,
    next_event_id: i64,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            events: BTreeMap::new(),
            aircraft: BTreeMap::new(),
            next_event_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Create a repository pre-populated with aircraft and events.
    ///
    /// Events keep the ids they carry; the rest are numbered after the
    /// highest id seen.
    pub fn with_data(aircraft: Vec<Aircraft>, events: Vec<GroundingEvent>) -> RepositoryResult<Self> {
        let repo = Self::new();
        {
            let mut data = repo.data.write();
            for a in aircraft {
                data.aircraft.insert(a.id, a);
            }
            let (with_id, without_id): (Vec<_>, Vec<_>) =
                events.into_iter().partition(|e| e.id.is_some());
            for event in with_id.into_iter().chain(without_id) {
                insert_locked(&mut data, event)?;
            }
        }
        Ok(repo)
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Get the number of events stored.
    pub fn event_count(&self) -> usize {
        self.data.read().events.len()
    }

    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Repository is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_locked(data: &mut LocalData, mut event: GroundingEvent) -> RepositoryResult<GroundingEvent> {
    let id = match event.id {
        Some(id) => {
            if data.events.contains_key(&id) {
                return Err(RepositoryError::validation_with_context(
                    format!("Grounding event {} already exists", id),
                    ErrorContext::new("insert_event")
                        .with_entity("event")
                        .with_entity_id(id),
                ));
            }
            id
        }
        None => EventId(data.next_event_id),
    };
    data.next_event_id = data.next_event_id.max(id.value() + 1);
    event.id = Some(id);
    data.events.insert(id, event.clone());
    Ok(event)
}

#[async_trait]
impl EventRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn insert_event(&self, event: &GroundingEvent) -> RepositoryResult<GroundingEvent> {
        self.check_health()?;
        let mut data = self.data.write();
        insert_locked(&mut data, event.clone())
    }

    async fn update_event(&self, event: &GroundingEvent) -> RepositoryResult<()> {
        self.check_health()?;
        let id = event.id.ok_or_else(|| {
            RepositoryError::validation_with_context(
                "Cannot update an event without an id",
                ErrorContext::new("update_event").with_entity("event"),
            )
        })?;

        let mut data = self.data.write();
        match data.events.get_mut(&id) {
            Some(slot) => {
                *slot = event.clone();
                Ok(())
            }
            None => Err(RepositoryError::event_not_found(id).with_operation("update_event")),
        }
    }

    async fn get_event(&self, id: EventId) -> RepositoryResult<GroundingEvent> {
        self.check_health()?;
        self.data
            .read()
            .events
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::event_not_found(id).with_operation("get_event"))
    }

    async fn list_events(&self, filter: &EventFilter) -> RepositoryResult<Vec<GroundingEvent>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .events
            .values()
            .filter(|event| {
                let group = data
                    .aircraft
                    .get(&event.aircraft_id)
                    .and_then(|a| a.fleet_group.as_deref());
                filter.matches(event, group)
            })
            .cloned()
            .collect())
    }

    async fn upsert_aircraft(&self, aircraft: &Aircraft) -> RepositoryResult<()> {
        self.check_health()?;
        self.data.write().aircraft.insert(aircraft.id, aircraft.clone());
        Ok(())
    }

    async fn list_aircraft(&self) -> RepositoryResult<Vec<Aircraft>> {
        self.check_health()?;
        Ok(self.data.read().aircraft.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_event(aircraft: i64, day: u32) -> GroundingEvent {
        GroundingEvent::new(
            AircraftId(aircraft),
            Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap(),
        )
    }

    fn aircraft(id: i64, group: &str) -> Aircraft {
        Aircraft {
            id: AircraftId(id),
            registration: format!("A6-{:03}", id),
            fleet_group: Some(group.to_string()),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());

        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo.list_events(&EventFilter::all()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let repo = LocalRepository::new();
        let first = repo.insert_event(&sample_event(1, 1)).await.unwrap();
        let second = repo.insert_event(&sample_event(1, 2)).await.unwrap();

        assert_eq!(first.id, Some(EventId(1)));
        assert_eq!(second.id, Some(EventId(2)));
        assert_eq!(repo.event_count(), 2);

        let fetched = repo.get_event(EventId(2)).await.unwrap();
        assert_eq!(fetched, second);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let repo = LocalRepository::new();
        let mut event = sample_event(1, 1);
        event.id = Some(EventId(40));
        repo.insert_event(&event).await.unwrap();

        let err = repo.insert_event(&event).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));

        let next = repo.insert_event(&sample_event(1, 3)).await.unwrap();
        assert_eq!(next.id, Some(EventId(41)));
    }

    #[tokio::test]
    async fn test_update_and_not_found() {
        let repo = LocalRepository::new();
        let mut stored = repo.insert_event(&sample_event(1, 1)).await.unwrap();
        stored.reason_code = Some("HYD".to_string());
        repo.update_event(&stored).await.unwrap();
        assert_eq!(
            repo.get_event(EventId(1)).await.unwrap().reason_code.as_deref(),
            Some("HYD")
        );

        stored.id = Some(EventId(99));
        let err = repo.update_event(&stored).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert_eq!(err.context().operation.as_deref(), Some("update_event"));

        stored.id = None;
        assert!(repo.update_event(&stored).await.is_err());
    }

    #[tokio::test]
    async fn test_list_filters_by_fleet_group() {
        let repo = LocalRepository::with_data(
            vec![aircraft(1, "A320"), aircraft(2, "B787")],
            vec![sample_event(1, 1), sample_event(2, 2), sample_event(1, 3)],
        )
        .unwrap();

        let filter = EventFilter {
            fleet_group: Some("A320".to_string()),
            ..Default::default()
        };
        let events = repo.list_events(&filter).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.aircraft_id == AircraftId(1)));

        let fleet = repo.list_aircraft().await.unwrap();
        assert_eq!(fleet.len(), 2);
        assert_eq!(fleet[0].id, AircraftId(1));
    }

    #[tokio::test]
    async fn test_seeded_ids_kept_and_continued() {
        let mut seeded = sample_event(1, 1);
        seeded.id = Some(EventId(10));
        let repo =
            LocalRepository::with_data(vec![], vec![sample_event(1, 2), seeded]).unwrap();

        let ids: Vec<_> = repo
            .list_events(&EventFilter::all())
            .await
            .unwrap()
            .into_iter()
            .filter_map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![EventId(10), EventId(11)]);
    }

    #[tokio::test]
    async fn test_clear_keeps_health_flag() {
        let repo = LocalRepository::new();
        repo.insert_event(&sample_event(1, 1)).await.unwrap();
        repo.set_healthy(false);
        repo.clear();
        assert_eq!(repo.event_count(), 0);
        assert!(!repo.health_check().await.unwrap());
    }
}
