//! Authentication errors

use jsonwebtoken::Algorithm;
use thiserror::Error;

/// Reasons a bearer token was not accepted
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingHeader,

    #[error("Invalid authorization header format")]
    InvalidHeaderFormat,

    #[error("failed to parse token header: {0}")]
    Decode(#[source] jsonwebtoken::errors::Error),

    #[error("token header has no key id")]
    MissingKeyId,

    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(String),

    #[error("no signing key found for kid {0}")]
    UnknownKey(String),

    #[error("signing key is unusable: {0}")]
    InvalidKey(String),

    #[error("unsupported signing algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("token validation failed: {0}")]
    Validation(#[source] jsonwebtoken::errors::Error),

    #[error("token subject is not a valid user id")]
    InvalidSubject,
}

impl AuthError {
    /// Message returned to the client
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "Authorization header required",
            AuthError::InvalidHeaderFormat => "Invalid authorization header format",
            _ => "Invalid token",
        }
    }

    /// Detail returned alongside the public message, for token failures only
    pub fn details(&self) -> Option<String> {
        match self {
            AuthError::MissingHeader | AuthError::InvalidHeaderFormat => None,
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_errors_have_no_details() {
        assert_eq!(
            AuthError::MissingHeader.public_message(),
            "Authorization header required"
        );
        assert!(AuthError::InvalidHeaderFormat.details().is_none());
    }

    #[test]
    fn test_token_errors_collapse_to_invalid_token() {
        let err = AuthError::UnknownKey("abc".to_string());

        assert_eq!(err.public_message(), "Invalid token");
        assert_eq!(err.details().as_deref(), Some("no signing key found for kid abc"));
    }
}
