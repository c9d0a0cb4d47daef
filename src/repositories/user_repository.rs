use crate::error::RepositoryResult;
use crate::models::{FieldPatch, ProfileUpdate, User, UserRow};
use crate::repositories::CredentialStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Repository for user data access
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn find_by_credentials(&self, values: &[&str]) -> RepositoryResult<Option<User>> {
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.pubkey, u.address, u.name, u.avatar_uri,
                   u.is_profile_complete, u.created_at, u.updated_at
            FROM users u
            JOIN user_credentials c ON c.user_id = u.id
            WHERE c.credential = ANY($1)
            ORDER BY u.created_at ASC
            LIMIT 1
            "#,
        )
        .bind(values)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, pubkey, address, name, avatar_uri,
                   is_profile_complete, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn insert_user(&self, user: &User) -> RepositoryResult<()> {
        let row = UserRow::from(user);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, pubkey, address, name, avatar_uri,
                               is_profile_complete, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(row.id)
        .bind(&row.pubkey)
        .bind(&row.address)
        .bind(&row.name)
        .bind(&row.avatar_uri)
        .bind(row.is_profile_complete)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&mut *tx)
        .await?;

        // The credential primary key rejects an alias already owned by
        // another user, whichever column it lives in there.
        for credential in user.credentials() {
            sqlx::query(
                r#"
                INSERT INTO user_credentials (credential, user_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(credential)
            .bind(row.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
        updated_at: DateTime<Utc>,
    ) -> RepositoryResult<bool> {
        if update.is_empty() {
            return Ok(false);
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut fields = builder.separated(", ");

        if let FieldPatch::Set(name) = &update.name {
            fields.push("name = ");
            fields.push_bind_unseparated(name.clone());
        }
        if let FieldPatch::Set(avatar_uri) = &update.avatar_uri {
            fields.push("avatar_uri = ");
            fields.push_bind_unseparated(avatar_uri.clone());
        }
        fields.push("is_profile_complete = 1");
        fields.push("updated_at = ");
        fields.push_bind_unseparated(updated_at);

        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let rows_affected = builder
            .build()
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, pubkey, address, name, avatar_uri,
                   is_profile_complete, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
