//! In-memory credential store for tests and embedding.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{ProfileUpdate, User};
use crate::repositories::CredentialStore;

/// Credential store backed by a map. The uniqueness check and the insert
/// happen under one write lock, so concurrent creators of the same
/// credential see exactly one success.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryUserStore {
    async fn find_by_credentials(&self, values: &[&str]) -> RepositoryResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| values.iter().any(|v| u.matches_credential(v)))
            .min_by_key(|u| u.created_at)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn insert_user(&self, user: &User) -> RepositoryResult<()> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "user id {} already exists",
                user.id
            )));
        }

        for credential in user.credentials() {
            if users.values().any(|u| u.matches_credential(credential)) {
                return Err(RepositoryError::DuplicateCredential(credential.to_string()));
            }
        }

        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
        updated_at: DateTime<Utc>,
    ) -> RepositoryResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => Ok(user.apply(update, updated_at)),
            None => Ok(false),
        }
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        let users = self.users.read().await;
        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}
