//! Profile persistence (`users` table).

mod postgres;

pub use postgres::PgProfileStore;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A profile row, keyed by the identity provider's user id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub is_verified: bool,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Option<UserProfile>>;

    /// Insert or update by `id`; `updated_at` is set by the database.
    async fn upsert(&self, profile: &UserProfile) -> Result<()>;

    async fn count(&self) -> Result<i64>;

    /// Liveness check used by `/health`.
    async fn ping(&self) -> Result<()>;
}
