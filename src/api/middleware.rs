//! API Middleware
//!
//! Bearer token authentication and request logging.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{AuthError, TokenVerifier};
use crate::domain::{AuthenticatedUser, OperationContext};
use crate::error::AppError;

/// Header carrying the per-request correlation id
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Correlation id assigned to a request by `logging_middleware`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

// =========================================================================
// Bearer token authentication
// =========================================================================

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeaderFormat)?;

    if value.is_empty() {
        return Err(AuthError::MissingHeader);
    }

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidHeaderFormat),
    }
}

fn context_for(request: &Request<Body>, user: Option<AuthenticatedUser>) -> OperationContext {
    let mut context = OperationContext::new();
    if let Some(user) = user {
        context = context.with_user(user);
    }
    match request.extensions().get::<CorrelationId>() {
        Some(CorrelationId(id)) => context = context.with_correlation_id(*id),
        None => {
            context.ensure_correlation_id();
        }
    }
    context
}

/// Reject the request unless it carries a valid bearer token.
///
/// On success the verified `AuthenticatedUser` and an `OperationContext`
/// are stored in the request extensions.
pub async fn require_auth(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    let user = verifier.verify(token).await.map_err(|err| {
        tracing::debug!(error = %err, "Bearer token rejected");
        err
    })?;

    let context = context_for(&request, Some(user.clone()));
    request.extensions_mut().insert(user);
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

/// Attach the caller when a valid bearer token is present, never reject.
pub async fn optional_auth(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user = match bearer_token(request.headers()) {
        Ok(token) => match verifier.verify(token).await {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::debug!(error = %err, "Ignoring invalid bearer token");
                None
            }
        },
        Err(_) => None,
    };

    let context = context_for(&request, user.clone());
    if let Some(user) = user {
        request.extensions_mut().insert(user);
    }
    request.extensions_mut().insert(context);

    next.run(request).await
}

// =========================================================================
// Request logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie", "apikey"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let masked_value = if SENSITIVE_HEADERS.contains(&name.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

/// Correlation id from the request header, or a fresh one
pub fn correlation_id_from(headers: &HeaderMap) -> Uuid {
    headers
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .unwrap_or_else(Uuid::new_v4)
}

/// Request logging middleware
pub async fn logging_middleware(mut request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();

    let headers = mask_headers_for_logging(request.headers());
    let correlation_id = correlation_id_from(request.headers());
    request.extensions_mut().insert(CorrelationId(correlation_id));

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        version = ?version,
        correlation_id = %correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let mut response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        correlation_id = %correlation_id,
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_authorization(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_missing() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingHeader)
        ));
    }

    #[test]
    fn test_bearer_token_formats() {
        assert_eq!(bearer_token(&with_authorization("Bearer abc.def")).unwrap(), "abc.def");

        for bad in ["abc.def", "Basic abc", "Bearer", "Bearer a b", "bearer abc"] {
            assert!(
                matches!(
                    bearer_token(&with_authorization(bad)),
                    Err(AuthError::InvalidHeaderFormat)
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_mask_headers_for_logging() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("authorization", "Bearer secret".parse().unwrap());
        headers.insert("apikey", "anon-key".parse().unwrap());
        headers.insert("x-correlation-id", "abc".parse().unwrap());

        let masked = mask_headers_for_logging(&headers);
        let value = |name: &str| {
            masked
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .unwrap()
        };

        assert_eq!(value("authorization"), "[REDACTED]");
        assert_eq!(value("apikey"), "[REDACTED]");
        assert_eq!(value("content-type"), "application/json");
        assert_eq!(value("x-correlation-id"), "abc");
    }

    #[test]
    fn test_correlation_id_from_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_HEADER, id.to_string().parse().unwrap());
        assert_eq!(correlation_id_from(&headers), id);

        headers.insert(CORRELATION_HEADER, "not-a-uuid".parse().unwrap());
        assert_ne!(correlation_id_from(&headers), id);
    }
}
