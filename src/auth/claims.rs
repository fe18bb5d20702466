//! Token claims

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::AuthenticatedUser;

use super::AuthError;

/// Claims issued by the auth provider.
///
/// Registered claims (`exp`, `iss`, `aud`) are checked by the validator and
/// are not repeated here.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidSubject)?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email.filter(|e| !e.is_empty()),
            role: claims.role.filter(|r| !r.is_empty()),
            session_id: claims.session_id.filter(|s| !s.is_empty()),
            is_anonymous: claims.is_anonymous,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_to_user() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "7d4c4f8e-2b57-4c9a-9d39-7b3f0c6f5a11",
            "email": "ana@example.com",
            "role": "authenticated",
            "session_id": "",
            "aud": "authenticated",
            "exp": 1_900_000_000
        }))
        .unwrap();

        let user = AuthenticatedUser::try_from(claims).unwrap();
        assert_eq!(user.user_id.to_string(), "7d4c4f8e-2b57-4c9a-9d39-7b3f0c6f5a11");
        assert_eq!(user.role.as_deref(), Some("authenticated"));
        assert!(user.session_id.is_none());
        assert!(!user.is_anonymous);
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let claims: Claims = serde_json::from_value(serde_json::json!({ "sub": "user-1" })).unwrap();
        assert!(matches!(
            AuthenticatedUser::try_from(claims),
            Err(AuthError::InvalidSubject)
        ));
    }
}
