//! Repository factory for dependency injection.
//!
//! Builds repository instances from runtime configuration: the
//! `REPOSITORY_TYPE` environment variable, an [`AppConfig`] file, or explicit
//! arguments.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::AppConfig;
use super::repositories::LocalRepository;
use super::repository::{ErrorContext, EventRepository, RepositoryError, RepositoryResult};
use crate::io::load_events_from_file;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("local", "memory").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" | "in-memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from the `REPOSITORY_TYPE` environment variable.
    ///
    /// Unset or unrecognised values fall back to Local.
    pub fn from_env() -> Self {
        match std::env::var("REPOSITORY_TYPE") {
            Ok(val) => val.parse().unwrap_or_else(|e| {
                log::warn!("{}; falling back to local repository", e);
                Self::Local
            }),
            Err(_) => Self::Local,
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use aog_rust::db::{AppConfig, RepositoryFactory};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = AppConfig::from_default_location()?;
///     let repo = RepositoryFactory::from_config(&config).await?;
///     assert!(repo.health_check().await?);
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create an empty repository of the given type.
    pub fn create(repo_type: RepositoryType) -> Arc<dyn EventRepository> {
        match repo_type {
            RepositoryType::Local => Self::create_local(),
        }
    }

    /// Create an empty local repository.
    pub fn create_local() -> Arc<dyn EventRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a local repository preloaded from a JSON events file.
    pub fn create_seeded<P: AsRef<Path>>(seed_file: P) -> RepositoryResult<Arc<LocalRepository>> {
        let path = seed_file.as_ref();
        let dataset = load_events_from_file(path).map_err(|e| {
            RepositoryError::ConfigurationError {
                message: format!("Failed to load seed file: {:#}", e),
                context: ErrorContext::new("seed_repository")
                    .with_details(path.display().to_string()),
            }
        })?;

        let event_count = dataset.events.len();
        let repo = LocalRepository::with_data(dataset.aircraft, dataset.events)?;
        log::info!(
            "Seeded local repository with {} events from {}",
            event_count,
            path.display()
        );
        Ok(Arc::new(repo))
    }

    /// Create a repository from the type in the environment.
    pub fn from_env() -> Arc<dyn EventRepository> {
        Self::create(RepositoryType::from_env())
    }

    /// Create a repository described by a configuration, seeding it when a
    /// seed file is configured.
    pub async fn from_config(config: &AppConfig) -> RepositoryResult<Arc<dyn EventRepository>> {
        let repo: Arc<dyn EventRepository> = match config.repository_type()? {
            RepositoryType::Local => match config.repository.seed_file {
                Some(ref seed) => Self::create_seeded(seed)? as Arc<dyn EventRepository>,
                None => Self::create_local(),
            },
        };

        if !repo.health_check().await? {
            return Err(RepositoryError::connection(
                "Repository failed its initial health check",
            ));
        }
        Ok(repo)
    }

    /// Create a repository from a configuration file.
    pub async fn from_config_file<P: AsRef<Path>>(
        path: P,
    ) -> RepositoryResult<Arc<dyn EventRepository>> {
        let config = AppConfig::from_file(path)?;
        Self::from_config(&config).await
    }
}
