//! Storage for grounding events, via the Repository pattern.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (aog-analytics binary, tests)        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs, migration.rs)              │
//! │  - Derived-field recomputation on write                 │
//! │  - Analytics reads by filter                            │
//! │  - Imported-event migration                             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository/) - Abstract Interface    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────▼──────────────────────────────┐
//!     │             Local Repository                  │
//!     │               (in-memory)                     │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! ```ignore
//! use aog_rust::db::{services, AppConfig, RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_default_location()?;
//!     let repo = RepositoryFactory::from_config(&config).await?;
//!     let breakdown = services::get_three_bucket_breakdown(repo.as_ref(), &Default::default()).await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod migration;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// ==================== Service Layer ====================

pub use migration::{migrate_imported_events, MigrationFailure, MigrationReport};
pub use services::{
    get_fleet_risk_ranking, get_grouped_breakdown, get_monthly_trend, get_risk_score,
    get_stage_analytics, get_three_bucket_breakdown, get_year_over_year, health_check,
    save_event, update_milestones,
};

// ==================== Repository Pattern Exports ====================

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::{AnalyticsSettings, AppConfig, RepositorySettings};
pub use repositories::LocalRepository;
pub use repository::{
    ErrorContext, EventFilter, EventRepository, RepositoryError, RepositoryResult,
};
