//! Grounding (AOG) events and the aircraft they belong to.

use chrono::{DateTime, Datelike, Utc};
use qtty::time::Hours;
use serde::{Deserialize, Serialize};

use super::time::lenient;

crate::define_id_type!(i64, EventId);
crate::define_id_type!(i64, AircraftId);

/// An aircraft in the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aircraft {
    pub id: AircraftId,
    pub registration: String,
    /// Fleet group (type family or operator sub-fleet) used by analytics filters.
    #[serde(default)]
    pub fleet_group: Option<String>,
}

/// Milestone timestamps recorded against one grounding event.
///
/// `detected_at`/`cleared_at` are the coarse bounds every record has (or had
/// in the legacy system); the rest are the resolution workflow in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestones {
    #[serde(default, with = "optional_instant")]
    pub detected_at: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_instant")]
    pub cleared_at: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_instant")]
    pub reported_at: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_instant")]
    pub procurement_requested_at: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_instant")]
    pub available_at_store_at: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_instant")]
    pub issued_back_at: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_instant")]
    pub installation_complete_at: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_instant")]
    pub test_start_at: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_instant")]
    pub up_and_running_at: Option<DateTime<Utc>>,
}

impl Milestones {
    /// True when the event carries any milestone that a legacy backfill never writes.
    pub fn has_granular_milestones(&self) -> bool {
        self.procurement_requested_at.is_some()
            || self.available_at_store_at.is_some()
            || self.issued_back_at.is_some()
            || self.test_start_at.is_some()
    }

    /// True when the workflow anchors are exactly what a detect/clear backfill
    /// writes and nothing finer was recorded.
    pub fn has_backfill_shape(&self) -> bool {
        !self.has_granular_milestones()
            && self.reported_at == self.detected_at
            && self.installation_complete_at == self.cleared_at
            && self.up_and_running_at == self.cleared_at
    }

    /// Instant used to place the event on a calendar (detection, then report).
    pub fn anchor(&self) -> Option<DateTime<Utc>> {
        self.detected_at.or(self.reported_at)
    }
}

/// Derived downtime fields. Always recomputed from milestones, never entered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DowntimeMetrics {
    #[serde(default = "zero_hours")]
    pub technical_time_hours: Hours,
    #[serde(default = "zero_hours")]
    pub procurement_time_hours: Hours,
    #[serde(default = "zero_hours")]
    pub ops_time_hours: Hours,
    #[serde(default = "zero_hours")]
    pub total_downtime_hours: Hours,
}

fn zero_hours() -> Hours {
    Hours::new(0.0)
}

impl Default for DowntimeMetrics {
    fn default() -> Self {
        Self {
            technical_time_hours: zero_hours(),
            procurement_time_hours: zero_hours(),
            ops_time_hours: zero_hours(),
            total_downtime_hours: zero_hours(),
        }
    }
}

impl DowntimeMetrics {
    /// Sum of the three buckets (not necessarily equal to total downtime).
    pub fn bucket_sum(&self) -> f64 {
        self.technical_time_hours.value()
            + self.procurement_time_hours.value()
            + self.ops_time_hours.value()
    }

    /// True when no bucket received any hours.
    pub fn buckets_empty(&self) -> bool {
        self.technical_time_hours.value() == 0.0
            && self.procurement_time_hours.value() == 0.0
            && self.ops_time_hours.value() == 0.0
    }
}

/// One AOG occurrence for one aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    pub aircraft_id: AircraftId,
    #[serde(flatten)]
    pub milestones: Milestones,
    #[serde(flatten)]
    pub metrics: DowntimeMetrics,
    #[serde(default)]
    pub is_imported: bool,
    #[serde(default)]
    pub is_legacy: bool,
    #[serde(default)]
    pub internal_cost: f64,
    #[serde(default)]
    pub external_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_party: Option<String>,
}

impl GroundingEvent {
    /// A freshly logged event: identity and detection time only.
    pub fn new(aircraft_id: AircraftId, detected_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            aircraft_id,
            milestones: Milestones {
                detected_at: Some(detected_at),
                ..Default::default()
            },
            metrics: DowntimeMetrics::default(),
            is_imported: false,
            is_legacy: false,
            internal_cost: 0.0,
            external_cost: 0.0,
            reason_code: None,
            responsible_party: None,
        }
    }

    /// Internal plus external cost.
    pub fn total_cost(&self) -> f64 {
        self.internal_cost + self.external_cost
    }

    /// Calendar year of the event anchor, if any.
    pub fn year(&self) -> Option<i32> {
        self.milestones.anchor().map(|dt| dt.year())
    }
}

/// `with`-style wrapper pairing the fail-soft reader with plain RFC 3339 output.
mod optional_instant {
    use chrono::{DateTime, Utc};
    use serde::{Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::lenient::deserialize(deserializer)
    }
}
