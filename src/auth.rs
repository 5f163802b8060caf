//! Caller identity resolution.
//!
//! The workflow only needs to know which user a bearer token belongs to;
//! issuing and refreshing tokens is the identity provider's business.

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// The caller's user id.
    pub id: Uuid,
}

/// Resolves a bearer token to the caller it identifies.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve `token` to a caller.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidCredential`] if the token is expired,
    /// malformed, or the provider rejects it.
    async fn resolve(&self, token: &str) -> Result<Caller>;
}

/// Identity provider reached over HTTP (hosted auth service).
pub struct HttpIdentityProvider {
    config: AuthConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: Uuid,
}

impl HttpIdentityProvider {
    /// Create a provider from the auth configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: AuthConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build auth client: {e}")))?;

        Ok(Self { config, http })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<Caller> {
        let url = format!("{}/auth/v1/user", self.config.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                warn!("Identity provider unreachable: {e}");
                Error::InvalidCredential
            })?;

        if !response.status().is_success() {
            debug!("Identity provider rejected token: {}", response.status());
            return Err(Error::InvalidCredential);
        }

        let user: UserResponse = response.json().await.map_err(|e| {
            warn!("Identity provider returned unparseable body: {e}");
            Error::InvalidCredential
        })?;

        Ok(Caller { id: user.id })
    }
}

/// Identity provider over a fixed token table. Used by the test suite.
#[derive(Default)]
pub struct StaticIdentityProvider {
    tokens: Mutex<HashMap<String, Uuid>>,
}

impl StaticIdentityProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token as belonging to `user_id`.
    pub fn register(&self, token: &str, user_id: Uuid) {
        self.tokens.lock().insert(token.to_string(), user_id);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<Caller> {
        self.tokens
            .lock()
            .get(token)
            .map(|id| Caller { id: *id })
            .ok_or(Error::InvalidCredential)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_resolves_registered_token() {
        let provider = StaticIdentityProvider::new();
        let user_id = Uuid::new_v4();
        provider.register("tok_valid", user_id);

        let caller = provider.resolve("tok_valid").await.expect("resolves");
        assert_eq!(caller.id, user_id);
    }

    #[tokio::test]
    async fn test_static_provider_rejects_unknown_token() {
        let provider = StaticIdentityProvider::new();
        let result = provider.resolve("tok_unknown").await;
        assert!(matches!(result, Err(Error::InvalidCredential)));
    }
}
