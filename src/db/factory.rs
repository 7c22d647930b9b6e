//! Builds the shared [`FullRepository`] for the configured backend.

use std::sync::Arc;

use super::repo_config::RepositoryConfig;
#[cfg(feature = "postgres-repo")]
use super::repo_config::PostgresConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::PostgresRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Factory for repository instances.
///
/// # Example
/// ```ignore
/// use time_control::db::{RepositoryConfig, RepositoryFactory};
///
/// let repo = RepositoryFactory::create(&RepositoryConfig::load()?).await?;
/// assert!(repo.health_check().await?);
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    pub async fn create(config: &RepositoryConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
        match config {
            RepositoryConfig::Local => Ok(Self::create_local()),
            #[cfg(feature = "postgres-repo")]
            RepositoryConfig::Postgres(pg) => {
                let repo = Self::create_postgres(pg.clone()).await?;
                Ok(repo as Arc<dyn FullRepository>)
            }
            #[cfg(not(feature = "postgres-repo"))]
            RepositoryConfig::Postgres(_) => Err(RepositoryError::configuration(
                "built without the postgres-repo feature",
            )),
        }
    }

    /// Connect to Postgres and run pending migrations.
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(config: PostgresConfig) -> RepositoryResult<Arc<PostgresRepository>> {
        // Pool setup and migrations block; keep them off the async workers.
        let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
        log::info!("Postgres repository ready");
        Ok(Arc::new(repo))
    }

    /// In-memory store seeded with the default departments.
    pub fn create_local() -> Arc<dyn FullRepository> {
        log::info!("Using in-memory repository; data is lost on restart");
        Arc::new(LocalRepository::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_local_repository() {
        let repo = RepositoryFactory::create(&RepositoryConfig::Local).await.unwrap();
        assert!(repo.health_check().await.unwrap());
        assert_eq!(repo.list_departments().await.unwrap().len(), 6);
    }

    #[cfg(not(feature = "postgres-repo"))]
    #[tokio::test]
    async fn test_postgres_needs_feature() {
        let config = RepositoryConfig::Postgres(crate::db::PostgresConfig {
            database_url: "postgres://localhost/tc".to_string(),
            max_connections: 1,
            connect_timeout_secs: 1,
            max_retries: 0,
        });
        let err = RepositoryFactory::create(&config).await.err().unwrap();
        assert!(matches!(err, RepositoryError::Configuration(_)));
    }
}
