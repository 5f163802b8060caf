//! Paystack verification client.

use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::gateway::{GatewayTransaction, PaymentGateway, VerifyEnvelope};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Client for Paystack's transaction verification endpoint.
pub struct PaystackClient {
    config: GatewayConfig,
    http: reqwest::Client,
}

impl PaystackClient {
    /// Create a new client from the gateway configuration.
    ///
    /// The verification timeout is enforced at the HTTP client level; a
    /// timed-out lookup is indistinguishable from an unreachable gateway
    /// and never treated as success.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.verify_timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build gateway client: {e}")))?;

        Ok(Self { config, http })
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn verify_transaction(&self, reference: &str) -> Result<GatewayTransaction> {
        let url = format!("{}/transaction/verify/{reference}", self.config.base_url);
        debug!("Verifying transaction {reference} with gateway");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| {
                warn!("Gateway unreachable for {reference}: {e}");
                Error::GatewayVerification
            })?;

        let http_ok = response.status().is_success();
        let envelope: VerifyEnvelope = response.json().await.map_err(|e| {
            warn!("Gateway returned unparseable body for {reference}: {e}");
            Error::GatewayVerification
        })?;

        if !http_ok || !envelope.status {
            // Ambiguous outcome - the message stays in the logs only.
            warn!(
                "Gateway verification error for {reference}: {}",
                envelope.message.as_deref().unwrap_or("no message")
            );
            return Err(Error::GatewayVerification);
        }

        envelope.data.map(GatewayTransaction::from).ok_or_else(|| {
            warn!("Gateway success envelope without transaction data for {reference}");
            Error::GatewayVerification
        })
    }
}
