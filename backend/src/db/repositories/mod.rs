//! Repository implementations module.
//!
//! - `local`: In-memory implementation used by the command-line tool and tests
pub mod local;

pub use local::LocalRepository;
