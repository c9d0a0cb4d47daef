//! Storage contract the identity resolver runs against.

use crate::error::RepositoryResult;
use crate::models::{ProfileUpdate, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Durable table of users, queryable by id or by credential alias.
///
/// Implementations must enforce that a credential value belongs to at most
/// one user, across both the `pubkey` and `address` columns, and report a
/// violation as [`RepositoryError::DuplicateCredential`](crate::error::RepositoryError).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the user whose `pubkey` or `address` equals `value`.
    async fn find_by_credential(&self, value: &str) -> RepositoryResult<Option<User>> {
        self.find_by_credentials(&[value]).await
    }

    /// Find the user whose `pubkey` or `address` equals any of `values`.
    /// When several users match, the oldest one wins.
    async fn find_by_credentials(&self, values: &[&str]) -> RepositoryResult<Option<User>>;

    /// Find a user by id.
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;

    /// Insert a new user row together with its credential aliases.
    async fn insert_user(&self, user: &User) -> RepositoryResult<()>;

    /// Apply the present fields of `update`, mark the profile complete and
    /// stamp `updated_at`. Returns false when no row was written, either
    /// because the id is unknown or because `update` is empty.
    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
        updated_at: DateTime<Utc>,
    ) -> RepositoryResult<bool>;

    /// All users, newest first.
    async fn list_users(&self) -> RepositoryResult<Vec<User>>;
}
