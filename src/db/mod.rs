//! Persistence layer for time-control data.
//!
//! Storage is reached through the repository traits in [`repository`], so the
//! service layer never sees which backend is in use.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers / background jobs                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Services (crate::services) - business rules            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (repository/) - abstract interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!           ┌─────────┴──────────┐
//!      Postgres (Diesel)     Local (in-memory)
//! ```
//!
//! # Usage
//! ```ignore
//! use time_control::db::{RepositoryConfig, RepositoryFactory};
//!
//! let repo = RepositoryFactory::create(&RepositoryConfig::from_env()?).await?;
//! let users = repo.list_users(true).await?;
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use factory::RepositoryFactory;
pub use repo_config::{PostgresConfig, RepositoryConfig, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    CalendarRepository, ChangeRequestFilter, ChangeRequestRepository, DayStatusRepository,
    ErrorContext, FullRepository, NotificationRepository, OrganizationRepository,
    RepositoryError, RepositoryResult, TimeEntryRepository, UserRepository, VacationRepository,
    WorkplacePlanRepository,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Initialize the global repository from `repository.toml` when one is found,
/// otherwise from the environment.
pub async fn init_repository() -> Result<&'static Arc<dyn FullRepository>> {
    if let Some(repo) = REPOSITORY.get() {
        return Ok(repo);
    }

    let config = RepositoryConfig::load().context("Invalid repository settings")?;
    log::info!("Repository backend: {:?}", config.repository_type());
    let repo = RepositoryFactory::create(&config)
        .await
        .context("Failed to initialize repository")?;

    Ok(REPOSITORY.get_or_init(|| repo))
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    REPOSITORY
        .get()
        .context("Database not initialized. Call init_repository() first.")
}
