//! # AOG Rust Backend
//!
//! Downtime decomposition engine for aircraft-on-ground (AOG) events.
//!
//! A grounding event records up to seven workflow milestones (reported,
//! procurement requested, part available at store, issued back, installation
//! complete, test start, up and running) plus the coarse detected/cleared
//! bounds every legacy record has. The engine turns those timestamps into
//! technical, procurement and ops hours, separates legacy records that only
//! have a total, and aggregates fleet analytics on top.
//!
//! ## Architecture
//!
//! - [`models`]: Events, milestones, ids and analytics result types
//! - [`services`]: Pure computations (metrics, classification, breakdowns,
//!   stage analytics, risk scoring, trends)
//! - [`db`]: Repository pattern, write path, analytics reads and the
//!   imported-event migration
//! - [`io`]: JSON event file loading
//!
//! ## Numeric behaviour
//!
//! Every duration is clamped to zero and every ratio goes through a guarded
//! division, so no result type ever contains NaN or infinity.

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod io;
pub mod models;
pub mod services;
