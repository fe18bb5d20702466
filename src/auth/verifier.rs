//! Bearer token verification

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

use crate::config::Config;
use crate::domain::AuthenticatedUser;

use super::{AuthError, Claims, JwksCache};

/// Verifies tokens issued by the auth provider against its published keys.
pub struct TokenVerifier {
    keys: JwksCache,
    issuer: Option<String>,
    audience: Option<String>,
    /// PEM public key used when a published key cannot be converted
    fallback_pem: Option<String>,
}

impl TokenVerifier {
    pub fn new(keys: JwksCache) -> Self {
        Self {
            keys,
            issuer: None,
            audience: None,
            fallback_pem: None,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_fallback_pem(mut self, pem: impl Into<String>) -> Self {
        self.fallback_pem = Some(pem.into());
        self
    }

    /// Build a verifier for the configured issuer
    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        let keys = match config.key_set_url() {
            Some(url) => JwksCache::remote(url, config.jwks_cache_ttl, config.jwks_fetch_timeout)?,
            None => {
                tracing::warn!("No SUPABASE_URL or JWKS_URL configured; all tokens will be rejected");
                JwksCache::from_static(JwkSet { keys: Vec::new() })
            }
        };

        let mut verifier = Self::new(keys);
        verifier.issuer = config.expected_issuer();
        verifier.audience = config.jwt_audience.clone();
        verifier.fallback_pem = config.supabase_jwt_secret.clone();
        Ok(verifier)
    }

    /// Verify `token` and return the identity it carries
    pub async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let header = decode_header(token).map_err(AuthError::Decode)?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        if is_symmetric(header.alg) {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }

        let jwk = self.keys.find(&kid).await?;
        let decoding_key = self.decoding_key(&jwk, header.alg)?;

        let mut validation = Validation::new(header.alg);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        let token_data =
            decode::<Claims>(token, &decoding_key, &validation).map_err(AuthError::Validation)?;

        AuthenticatedUser::try_from(token_data.claims)
    }

    fn decoding_key(&self, jwk: &Jwk, alg: Algorithm) -> Result<DecodingKey, AuthError> {
        // An HMAC key published in the set must never verify an asymmetric token
        if matches!(jwk.algorithm, AlgorithmParameters::OctetKey(_)) {
            return Err(AuthError::UnsupportedAlgorithm(alg));
        }

        match DecodingKey::from_jwk(jwk) {
            Ok(key) => Ok(key),
            Err(err) => {
                let pem = self
                    .fallback_pem
                    .as_deref()
                    .ok_or_else(|| AuthError::InvalidKey(err.to_string()))?;

                tracing::debug!(error = %err, "Published key unusable, trying configured PEM");
                pem_decoding_key(pem, alg)
            }
        }
    }
}

fn is_symmetric(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

fn pem_decoding_key(pem: &str, alg: Algorithm) -> Result<DecodingKey, AuthError> {
    let bytes = pem.as_bytes();
    let key = match alg {
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(bytes),
        Algorithm::EdDSA => DecodingKey::from_ed_pem(bytes),
        _ => DecodingKey::from_rsa_pem(bytes),
    };
    key.map_err(|e| AuthError::InvalidKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[test]
    fn test_symmetric_algorithms() {
        assert!(is_symmetric(Algorithm::HS256));
        assert!(is_symmetric(Algorithm::HS512));
        assert!(!is_symmetric(Algorithm::RS256));
        assert!(!is_symmetric(Algorithm::ES256));
    }

    #[tokio::test]
    async fn test_hmac_token_rejected_before_key_lookup() {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some("any".to_string());
        let token = encode(
            &header,
            &serde_json::json!({ "sub": "x", "exp": 4_000_000_000u64 }),
            &EncodingKey::from_secret(b"shared-secret"),
        )
        .unwrap();

        let verifier = TokenVerifier::new(JwksCache::from_static(JwkSet { keys: Vec::new() }));
        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedAlgorithm(Algorithm::HS256)));
    }

    #[tokio::test]
    async fn test_token_without_kid_rejected() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "sub": "x" }),
            &EncodingKey::from_secret(b"shared-secret"),
        )
        .unwrap();

        let verifier = TokenVerifier::new(JwksCache::from_static(JwkSet { keys: Vec::new() }));
        assert!(matches!(
            verifier.verify(&token).await,
            Err(AuthError::MissingKeyId)
        ));
    }

    #[tokio::test]
    async fn test_fallback_pem_for_unusable_jwk() {
        let keys: JwkSet = serde_json::from_value(serde_json::json!({
            "keys": [{ "kty": "RSA", "kid": "rsa-1", "alg": "RS256", "n": "!!", "e": "AQAB" }]
        }))
        .unwrap();

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some("rsa-1".to_string());
        let user_id = uuid::Uuid::new_v4();
        let token = encode(
            &header,
            &serde_json::json!({ "sub": user_id.to_string(), "exp": 4_000_000_000u64 }),
            &EncodingKey::from_rsa_pem(include_bytes!("../../tests/fixtures/jwt_rsa.pem")).unwrap(),
        )
        .unwrap();

        let without_pem = TokenVerifier::new(JwksCache::from_static(keys.clone()));
        assert!(matches!(
            without_pem.verify(&token).await,
            Err(AuthError::InvalidKey(_))
        ));

        let with_pem = TokenVerifier::new(JwksCache::from_static(keys))
            .with_fallback_pem(include_str!("../../tests/fixtures/jwt_rsa_pub.pem"));
        let user = with_pem.verify(&token).await.unwrap();
        assert_eq!(user.user_id, user_id);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let verifier = TokenVerifier::new(JwksCache::from_static(JwkSet { keys: Vec::new() }));
        assert!(matches!(
            verifier.verify("not-a-jwt").await,
            Err(AuthError::Decode(_))
        ));
    }
}
