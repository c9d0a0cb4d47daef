//! Cause Pots identity service
//!
//! Connects to the user database, resolves the configured wallet credential
//! into a user and bootstraps that user's session against the HTTP API.

use anyhow::Context;
use cause_pots_identity::api_client::ApiClient;
use cause_pots_identity::config::AppConfig;
use cause_pots_identity::database::{create_pool, run_migrations};
use cause_pots_identity::error::AppError;
use cause_pots_identity::services::LoadOutcome;
use cause_pots_identity::{telemetry, AppState};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().map_err(AppError::Config)?;
    telemetry::init_tracing(&config);

    info!("Cause Pots identity service starting");
    info!("Environment: {}", config.environment);
    info!("API base URL: {}", config.api.base_url);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");
    let pool = match create_pool(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            let err = AppError::from(e);
            if err.is_connection_error() {
                error!(
                    "User database unreachable (max connections {}, acquire timeout {}s): {}",
                    config.database.max_connections, config.database.acquire_timeout_secs, err
                );
            }
            return Err(err).context("failed to create database pool");
        }
    };
    info!("Max connections: {}", config.database.max_connections);

    run_migrations(&pool, None)
        .await
        .context("database migration failed")?;
    info!("Database migrations completed successfully");

    let api_client = ApiClient::new(&config.api).context("failed to build API client")?;
    let state = AppState::new(pool, api_client);

    // =========================================================================
    // IDENTITY
    // =========================================================================
    let pubkey = std::env::var("AUTH_PUBKEY").ok();
    let address = std::env::var("AUTH_ADDRESS").ok().or_else(|| pubkey.clone());

    let (Some(pubkey), Some(address)) = (pubkey, address) else {
        warn!("AUTH_PUBKEY not set - nothing to authenticate");
        let users = state.identity.list_users().await?;
        info!("{} users registered", users.len());
        return Ok(());
    };

    let name = std::env::var("AUTH_NAME").ok();
    let user = state
        .identity
        .authenticate(&pubkey, &address, name.as_deref())
        .await?;
    info!(
        "Resolved user {} (profile complete: {})",
        user.id, user.is_profile_complete
    );

    // =========================================================================
    // SESSION BOOTSTRAP
    // =========================================================================
    let load = state.bootstrapper.spawn_load(Some(user.address.clone()));

    let outcome = tokio::select! {
        joined = load => joined.context("session bootstrap task panicked")?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, abandoning session bootstrap");
            state.bootstrapper.shutdown();
            return Ok(());
        }
    };

    match outcome {
        LoadOutcome::Applied(load_state) => {
            if let Some(failure) = load_state.error {
                error!("Session bootstrap failed: {}", failure);
                return Err(AppError::from(failure).into());
            }
            info!("Session bootstrap complete");
        }
        LoadOutcome::Stale => warn!("Session bootstrap was superseded"),
    }

    Ok(())
}
