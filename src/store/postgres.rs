use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::{ProfileStore, UserProfile};

#[derive(Clone, Debug)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let query = r"
            SELECT id, email, full_name, username, avatar_url, is_verified
            FROM users
            WHERE id = $1
        ";
        let span = info_span!("db.query", db.system = "postgresql", db.operation = "SELECT");
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("Failed to fetch profile")?;

        row.map(|row| -> Result<UserProfile> {
            Ok(UserProfile {
                id: row.try_get("id")?,
                email: row.try_get::<Option<String>, _>("email")?.unwrap_or_default(),
                full_name: row.try_get("full_name")?,
                username: row.try_get("username")?,
                avatar_url: row.try_get("avatar_url")?,
                is_verified: row.try_get::<Option<bool>, _>("is_verified")?.unwrap_or(false),
            })
        })
        .transpose()
    }

    async fn upsert(&self, profile: &UserProfile) -> Result<()> {
        let query = r"
            INSERT INTO users (id, email, full_name, username, avatar_url, is_verified, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                full_name = EXCLUDED.full_name,
                username = EXCLUDED.username,
                avatar_url = EXCLUDED.avatar_url,
                is_verified = EXCLUDED.is_verified,
                updated_at = NOW()
        ";
        let span = info_span!("db.query", db.system = "postgresql", db.operation = "UPSERT");
        sqlx::query(query)
            .bind(profile.id)
            .bind(&profile.email)
            .bind(&profile.full_name)
            .bind(&profile.username)
            .bind(&profile.avatar_url)
            .bind(profile.is_verified)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("Failed to upsert profile")?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let span = info_span!("db.query", db.system = "postgresql", db.operation = "COUNT");
        let row = sqlx::query("SELECT COUNT(*) AS total FROM users")
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("Failed to count users")?;
        Ok(row.try_get("total")?)
    }

    async fn ping(&self) -> Result<()> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("Failed to acquire database connection")?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("Failed to ping database")?;
        Ok(())
    }
}
