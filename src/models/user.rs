use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Current time at the precision Postgres stores (microseconds), so a
/// record built in memory compares equal to the same record read back.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// User resolved from a wallet credential.
///
/// `pubkey` and `address` are two aliases of the same wallet identity;
/// either one resolves the user, and they are not required to be equal.
/// Serializes to the wire shape clients consume (camelCase, boolean
/// `isProfileComplete`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub pubkey: String,
    pub address: String,
    pub name: Option<String>,
    pub avatar_uri: Option<String>,
    pub is_profile_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a brand-new user for a credential pair. An empty name counts
    /// as no name; any other string, whitespace included, is kept.
    pub fn new(pubkey: String, address: String, name: Option<String>) -> Self {
        let name = name.filter(|n| !n.is_empty());
        let now = now();

        Self {
            id: Uuid::new_v4(),
            pubkey,
            address,
            is_profile_complete: name.is_some(),
            name,
            avatar_uri: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The distinct credential values this user answers to
    pub fn credentials(&self) -> Vec<&str> {
        if self.pubkey == self.address {
            vec![self.pubkey.as_str()]
        } else {
            vec![self.pubkey.as_str(), self.address.as_str()]
        }
    }

    /// Whether `value` is one of this user's credential aliases
    pub fn matches_credential(&self, value: &str) -> bool {
        self.pubkey == value || self.address == value
    }

    /// Short label for log lines
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.address)
    }

    /// Apply the fields present in `update`. Returns false when nothing was
    /// applied, in which case the record is untouched.
    pub fn apply(&mut self, update: &ProfileUpdate, updated_at: DateTime<Utc>) -> bool {
        if update.is_empty() {
            return false;
        }

        if let FieldPatch::Set(name) = &update.name {
            self.name = name.clone();
        }
        if let FieldPatch::Set(avatar_uri) = &update.avatar_uri {
            self.avatar_uri = avatar_uri.clone();
        }

        // Completeness only ever moves to true.
        self.is_profile_complete = true;
        self.updated_at = updated_at;
        true
    }
}

/// Storage shape of a user row; the completeness flag is an INTEGER column
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub pubkey: String,
    pub address: String,
    pub name: Option<String>,
    pub avatar_uri: Option<String>,
    pub is_profile_complete: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            pubkey: row.pubkey,
            address: row.address,
            name: row.name,
            avatar_uri: row.avatar_uri,
            is_profile_complete: row.is_profile_complete != 0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            pubkey: user.pubkey.clone(),
            address: user.address.clone(),
            name: user.name.clone(),
            avatar_uri: user.avatar_uri.clone(),
            is_profile_complete: i32::from(user.is_profile_complete),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// A single field of a partial update: either left alone or set.
///
/// Deserializing a present key (including `null`) yields `Set`; combine with
/// `#[serde(default)]` so a missing key yields `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPatch<T> {
    Absent,
    Set(T),
}

impl<T> Default for FieldPatch<T> {
    fn default() -> Self {
        FieldPatch::Absent
    }
}

impl<T> FieldPatch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, FieldPatch::Set(_))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldPatch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(FieldPatch::Set)
    }
}

/// Partial profile update. A `Set(None)` clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: FieldPatch<Option<String>>,
    #[serde(default)]
    pub avatar_uri: FieldPatch<Option<String>>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = FieldPatch::Set(Some(name.into()));
        self
    }

    pub fn with_avatar_uri(mut self, avatar_uri: impl Into<String>) -> Self {
        self.avatar_uri = FieldPatch::Set(Some(avatar_uri.into()));
        self
    }

    /// True when no field is present
    pub fn is_empty(&self) -> bool {
        !self.name.is_set() && !self.avatar_uri.is_set()
    }
}
