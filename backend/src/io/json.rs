// ============================================================================
// JSON Event Files
// ============================================================================
//
// Two layouts are accepted: a bare array of events, or an object with an
// `events` array and an optional `aircraft` array. Timestamps inside events
// are read fail-soft (see `models::time::lenient`), so one malformed date
// does not reject the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::{Aircraft, GroundingEvent};

/// Events plus the aircraft they refer to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDataset {
    #[serde(default)]
    pub aircraft: Vec<Aircraft>,
    pub events: Vec<GroundingEvent>,
}

/// Parse an event dataset from a JSON string.
pub fn load_events_from_json_str(json: &str) -> Result<EventDataset> {
    let value: serde_json::Value = serde_json::from_str(json).context("Invalid events JSON")?;

    match value {
        serde_json::Value::Array(_) => {
            let events: Vec<GroundingEvent> = serde_json::from_value(value)
                .context("Failed to deserialize event array")?;
            Ok(EventDataset {
                aircraft: Vec::new(),
                events,
            })
        }
        serde_json::Value::Object(ref obj) => {
            if !obj.contains_key("events") {
                anyhow::bail!("Missing required 'events' field");
            }
            serde_json::from_value(value).context("Failed to deserialize event dataset")
        }
        _ => anyhow::bail!("Expected a JSON array of events or an object with 'events'"),
    }
}

/// Parse an event dataset from a JSON file.
pub fn load_events_from_file<P: AsRef<Path>>(path: P) -> Result<EventDataset> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events file: {}", path.display()))?;
    load_events_from_json_str(&content)
        .with_context(|| format!("Failed to parse events file: {}", path.display()))
}

/// Write a dataset as pretty-printed JSON in the object layout.
pub fn write_events_to_file<P: AsRef<Path>>(path: P, dataset: &EventDataset) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(dataset).context("Failed to serialize events")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write events file: {}", path.display()))
}
