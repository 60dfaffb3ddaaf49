//! Reading and writing grounding-event files.

pub mod json;

pub use json::{
    load_events_from_file, load_events_from_json_str, write_events_to_file, EventDataset,
};
