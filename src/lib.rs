//! Cause Pots identity layer
//!
//! Resolves wallet credentials into durable users, tracks profile
//! completeness, and bootstraps a client session's pots, friends and
//! activities in one coordinated load.

pub mod api_client;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod telemetry;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use api_client::ApiClient;
use repositories::{CredentialStore, UserRepository};
use services::{IdentityService, SessionBootstrapper};
use std::sync::Arc;

/// Application state wiring the store, resolver and bootstrapper together
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub identity: Arc<IdentityService>,
    pub bootstrapper: Arc<SessionBootstrapper>,
}

impl AppState {
    /// Build state on top of any credential store and bootstrap source
    pub fn with_store(
        store: Arc<dyn CredentialStore>,
        source: Arc<dyn services::BootstrapSource>,
    ) -> Self {
        Self {
            identity: Arc::new(IdentityService::new(store.clone())),
            bootstrapper: Arc::new(SessionBootstrapper::new(source)),
            store,
        }
    }

    /// Build state backed by Postgres and the HTTP API
    pub fn new(pool: sqlx::PgPool, api_client: ApiClient) -> Self {
        Self::with_store(
            Arc::new(UserRepository::new(pool)),
            Arc::new(api_client),
        )
    }
}
