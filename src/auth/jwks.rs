//! Signing key cache
//!
//! Holds the issuer's published JWK set for a fixed time. Lookups share a
//! read lock; a refresh runs under a single-writer mutex and re-checks
//! freshness first, so concurrent misses trigger one fetch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use tokio::sync::{Mutex, RwLock};

use super::AuthError;

/// Where the key set comes from
pub enum KeySource {
    /// Fetched over HTTPS from the issuer
    Remote { url: String, client: reqwest::Client },
    /// Fixed set, never refetched
    Static(JwkSet),
}

struct CachedKeys {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
}

pub struct JwksCache {
    source: KeySource,
    ttl: Duration,
    cached: RwLock<Option<CachedKeys>>,
    refresh: Mutex<()>,
}

impl JwksCache {
    /// Cache backed by a remote key set URL
    pub fn remote(
        url: impl Into<String>,
        ttl: Duration,
        fetch_timeout: Duration,
    ) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        Ok(Self::with_source(
            KeySource::Remote {
                url: url.into(),
                client,
            },
            ttl,
        ))
    }

    /// Cache over a fixed key set
    pub fn from_static(keys: JwkSet) -> Self {
        Self::with_source(KeySource::Static(keys), Duration::MAX)
    }

    fn with_source(source: KeySource, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Key with the given `kid`
    pub async fn find(&self, kid: &str) -> Result<Jwk, AuthError> {
        let keys = self.key_set().await?;
        keys.find(kid)
            .cloned()
            .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
    }

    /// Current key set, fetching it when missing or expired
    pub async fn key_set(&self) -> Result<Arc<JwkSet>, AuthError> {
        if let Some(keys) = self.fresh().await {
            return Ok(keys);
        }

        let _guard = self.refresh.lock().await;
        // Another task may have refreshed while we waited
        if let Some(keys) = self.fresh().await {
            return Ok(keys);
        }

        let keys = Arc::new(self.fetch().await?);
        *self.cached.write().await = Some(CachedKeys {
            keys: Arc::clone(&keys),
            fetched_at: Instant::now(),
        });

        Ok(keys)
    }

    async fn fresh(&self) -> Option<Arc<JwkSet>> {
        let cached = self.cached.read().await;
        cached
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.ttl)
            .map(|c| Arc::clone(&c.keys))
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        match &self.source {
            KeySource::Static(keys) => Ok(keys.clone()),
            KeySource::Remote { url, client } => {
                tracing::debug!(url = %url, "Fetching signing keys");

                let response = client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

                if !response.status().is_success() {
                    return Err(AuthError::KeyFetch(format!(
                        "unexpected status {}",
                        response.status()
                    )));
                }

                let keys: JwkSet = response
                    .json()
                    .await
                    .map_err(|e| AuthError::KeyFetch(format!("invalid key set: {}", e)))?;

                tracing::info!(keys = keys.keys.len(), "Signing keys refreshed");
                Ok(keys)
            }
        }
    }
}
