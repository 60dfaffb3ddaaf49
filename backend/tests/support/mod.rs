#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};

use aog_rust::models::{AircraftId, GroundingEvent};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to process-global
/// env vars, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// ==================== Event fixtures ====================

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

pub fn hours_after(start: DateTime<Utc>, hours: i64) -> Option<DateTime<Utc>> {
    Some(start + Duration::hours(hours))
}

/// Imported record with only detection and clearance bounds.
pub fn imported_event(aircraft: i64, start: DateTime<Utc>, hours: i64) -> GroundingEvent {
    let mut event = GroundingEvent::new(AircraftId(aircraft), start);
    event.milestones.cleared_at = hours_after(start, hours);
    event.is_imported = true;
    event
}

/// Event with every workflow milestone, offsets in hours from `start`:
/// reported, procurement requested, available at store, issued back,
/// installation complete, test start, up and running.
pub fn full_event(aircraft: i64, start: DateTime<Utc>, offsets: [i64; 7]) -> GroundingEvent {
    let mut event = GroundingEvent::new(AircraftId(aircraft), start);
    let m = &mut event.milestones;
    m.reported_at = hours_after(start, offsets[0]);
    m.procurement_requested_at = hours_after(start, offsets[1]);
    m.available_at_store_at = hours_after(start, offsets[2]);
    m.issued_back_at = hours_after(start, offsets[3]);
    m.installation_complete_at = hours_after(start, offsets[4]);
    m.test_start_at = hours_after(start, offsets[5]);
    m.up_and_running_at = hours_after(start, offsets[6]);
    event
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
