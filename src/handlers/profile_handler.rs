//! Profile Handler
//!
//! The caller's identity, auth account row and display preferences.

use sqlx::PgPool;

use crate::domain::{OperationContext, Profile, User};
use crate::error::AppError;
use crate::repository::UserRepository;

use super::caller;

pub struct ProfileHandler {
    users: UserRepository,
}

impl ProfileHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Row of the auth provider's user table, if it has one for the caller
    pub async fn account(&self, context: &OperationContext) -> Result<Option<User>, AppError> {
        let user = caller(context)?;
        self.users
            .find_user(user.user_id)
            .await
            .map_err(AppError::storage("Failed to get user"))
    }

    pub async fn get(&self, context: &OperationContext) -> Result<Profile, AppError> {
        let user = caller(context)?;
        self.users
            .find_profile(user.user_id)
            .await
            .map_err(AppError::storage("Failed to get profile"))?
            .ok_or(AppError::NotFound("Profile"))
    }

    pub async fn update(
        &self,
        full_name: Option<String>,
        currency_preference: Option<String>,
        context: &OperationContext,
    ) -> Result<Profile, AppError> {
        let user = caller(context)?;

        let currency = currency_preference
            .as_deref()
            .map(normalize_currency)
            .transpose()?;

        let profile = self
            .users
            .upsert_profile(user.user_id, full_name.as_deref(), currency.as_deref())
            .await
            .map_err(AppError::storage("Failed to update profile"))?;

        tracing::info!(user_id = %user.user_id, "Profile updated");
        Ok(profile)
    }
}

/// Three-letter currency code, upper-cased
fn normalize_currency(raw: &str) -> Result<String, AppError> {
    let code = raw.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::validation(
            "currency_preference must be a 3-letter currency code",
        ));
    }
    Ok(code.to_ascii_uppercase())
}
