//! Bearer token source for backend requests
//!
//! The HTTP client asks the provider for a token on every request and
//! invalidates it when the backend reports an expired session.

use jsonwebtoken::{decode, DecodingKey, Validation};
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::UploadError;

/// Source of the bearer token sent with each request
pub trait CredentialProvider: Send + Sync {
    /// Current token, or an error when none is usable
    fn bearer_token(&self) -> Result<String, UploadError>;

    /// Forget the token after the backend rejected it
    fn invalidate(&self);
}

/// Token fixed at startup (environment or prompt)
pub struct StaticTokenProvider {
    token: RwLock<Option<String>>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        let token = token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }
}

impl CredentialProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Result<String, UploadError> {
        let token = self.token.read().clone().ok_or(UploadError::MissingCredentials)?;

        if token_expired(&token, chrono::Utc::now().timestamp()) {
            warn!("API token has expired, not sending request");
            self.invalidate();
            return Err(UploadError::AuthExpired);
        }

        Ok(token)
    }

    fn invalidate(&self) {
        if self.token.write().take().is_some() {
            debug!("API token invalidated");
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    exp: Option<i64>,
}

/// True when `token` is a JWT whose `exp` is at or before `now`.
/// Opaque tokens never count as expired; the backend decides for them.
fn token_expired(token: &str, now: i64) -> bool {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data.claims.exp.is_some_and(|exp| exp <= now),
        Err(_) => false,
    }
}
