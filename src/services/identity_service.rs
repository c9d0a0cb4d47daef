use crate::error::{AppError, AppResult, RepositoryError};
use crate::models::{user, ProfileUpdate, User};
use crate::repositories::CredentialStore;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Resolves wallet credentials into durable users and maintains their
/// profiles.
///
/// `pubkey` and `address` are treated as aliases: a lookup with either value
/// resolves the same identity. Profile completeness is derived here and only
/// ever moves from false to true.
pub struct IdentityService {
    store: Arc<dyn CredentialStore>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Find the user owning either credential, or create one.
    ///
    /// An existing user is returned as stored, without any write. A new user
    /// gets `name` (when non-empty) and is complete exactly when it has one.
    /// A concurrent creator winning the insert is not an error: the winner's
    /// row is returned instead.
    pub async fn authenticate(
        &self,
        pubkey: &str,
        address: &str,
        name: Option<&str>,
    ) -> AppResult<User> {
        let pubkey = pubkey.trim();
        let address = address.trim();

        if pubkey.is_empty() || address.is_empty() {
            return Err(AppError::InvalidInput(
                "pubkey and address are required".to_string(),
            ));
        }

        let credentials = [pubkey, address];

        if let Some(user) = self.store.find_by_credentials(&credentials).await? {
            info!("User authenticated: {}", user.display_name());
            return Ok(user);
        }

        let new_user = User::new(
            pubkey.to_string(),
            address.to_string(),
            name.map(str::to_string),
        );

        match self.store.insert_user(&new_user).await {
            Ok(()) => {}
            Err(RepositoryError::DuplicateCredential(credential)) => {
                warn!(
                    "Credential {} was claimed concurrently, returning the existing user",
                    credential
                );
                return self
                    .store
                    .find_by_credentials(&credentials)
                    .await?
                    .ok_or(AppError::DuplicateCredential(credential));
            }
            Err(e) => return Err(e.into()),
        }

        let user = self
            .store
            .find_by_id(new_user.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} vanished after insert", new_user.id)))?;

        info!("Created new user: {} ({})", user.display_name(), user.id);
        Ok(user)
    }

    /// Get a user by id
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Get a user by wallet address or public key
    pub async fn get_by_address(&self, address_or_pubkey: &str) -> AppResult<User> {
        self.store
            .find_by_credential(address_or_pubkey.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Apply a partial profile update and return the row as stored
    /// afterwards.
    ///
    /// Fails with `NotFound` for an unknown id and with `NoFieldsProvided`
    /// when the update carries no field; neither case writes anything.
    pub async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> AppResult<User> {
        if self.store.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        if update.is_empty() {
            return Err(AppError::NoFieldsProvided);
        }

        let written = self.store.update_profile(id, update, user::now()).await?;
        if !written {
            // Deleted between the existence check and the write.
            return Err(AppError::NotFound("User not found".to_string()));
        }
        debug!("Updated profile for user {}", id);

        self.get_by_id(id).await
    }

    /// All users, newest first
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }
}
