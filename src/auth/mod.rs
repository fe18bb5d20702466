//! Authentication module
//!
//! Verification of bearer tokens issued by the external auth provider.

mod claims;
mod error;
mod jwks;
mod verifier;

pub use claims::Claims;
pub use error::AuthError;
pub use jwks::{JwksCache, KeySource};
pub use verifier::TokenVerifier;
