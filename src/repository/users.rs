//! User and profile storage

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Profile, User};

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT id, email, created_at, updated_at FROM auth.users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, full_name, currency_preference, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Create or update the profile of a user.
    ///
    /// `None` leaves the stored value unchanged.
    pub async fn upsert_profile(
        &self,
        user_id: Uuid,
        full_name: Option<&str>,
        currency_preference: Option<&str>,
    ) -> Result<Profile, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO profiles (id, full_name, currency_preference)
            VALUES ($1, $2, COALESCE($3, 'USD'))
            ON CONFLICT (id) DO UPDATE SET
                full_name = COALESCE($2, profiles.full_name),
                currency_preference = COALESCE($3, profiles.currency_preference),
                updated_at = NOW()
            RETURNING id, full_name, currency_preference, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(currency_preference)
        .fetch_one(&self.pool)
        .await
    }
}
