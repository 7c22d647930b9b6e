//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::FullRepository;
use crate::services::{EmailService, TokenService};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Signs and verifies bearer tokens
    pub tokens: Arc<TokenService>,
    /// Outgoing mail
    pub mail: Arc<EmailService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new application state with the given repository.
    pub fn new(
        repository: Arc<dyn FullRepository>,
        config: AppConfig,
        mail: Arc<EmailService>,
    ) -> Self {
        Self {
            repository,
            tokens: Arc::new(TokenService::from_config(&config)),
            mail,
            config: Arc::new(config),
        }
    }

    pub fn repo(&self) -> &dyn FullRepository {
        self.repository.as_ref()
    }
}
