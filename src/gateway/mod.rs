//! Payment gateway verification.
//!
//! The gateway is the authority on whether a charge succeeded. This module
//! defines the client abstraction the workflow depends on and the wire
//! types of the gateway's verification endpoint.
//!
//! Two failure shapes are deliberately kept apart:
//! 1. The gateway could not be consulted, or answered with a failure
//!    envelope - the outcome is unknown and verification hard-fails.
//! 2. The gateway answered with a success envelope whose transaction status
//!    is not `success` - the payment genuinely failed, which is a valid
//!    negative result, not an error.

mod paystack;

pub use paystack::PaystackClient;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Status of a transaction as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// The charge succeeded.
    Success,
    /// The charge failed.
    Failed,
    /// The customer abandoned the checkout.
    Abandoned,
    /// Any other status the gateway may report.
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    /// Returns true if the gateway confirmed the charge.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Wire representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
            Self::Unknown => "unknown",
        }
    }
}

/// A transaction confirmed by the gateway.
#[derive(Debug, Clone)]
pub struct GatewayTransaction {
    /// Transaction status reported by the gateway.
    pub status: TransactionStatus,
    /// Amount in minor currency units (kobo for NGN).
    pub amount_minor: i64,
    /// ISO currency code.
    pub currency: String,
    /// When the gateway recorded the payment, if it did.
    pub paid_at: Option<DateTime<Utc>>,
}

/// Client for the external payment gateway.
///
/// `verify_transaction` is a read-only confirmation lookup, never a charge
/// action, so callers may safely retry it.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Look up the transaction identified by `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GatewayVerification`] when the gateway is
    /// unreachable, times out, or returns a failure envelope. A reported
    /// non-success transaction status is returned as data, not an error.
    async fn verify_transaction(&self, reference: &str) -> Result<GatewayTransaction>;
}

/// Response envelope of the gateway's verify endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct VerifyEnvelope {
    /// Whether the lookup itself succeeded.
    pub status: bool,
    /// Human-readable gateway message; logged, never surfaced to callers.
    #[serde(default)]
    pub message: Option<String>,
    /// Transaction payload, present when `status` is true.
    #[serde(default)]
    pub data: Option<TransactionData>,
}

/// Transaction payload within a verify response.
#[derive(Debug, Deserialize)]
pub(crate) struct TransactionData {
    pub status: TransactionStatus,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<TransactionData> for GatewayTransaction {
    fn from(data: TransactionData) -> Self {
        Self {
            status: data.status,
            amount_minor: data.amount,
            currency: data.currency,
            paid_at: data.paid_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_envelope() {
        let json = r#"{
            "status": true,
            "message": "Verification successful",
            "data": {
                "status": "success",
                "amount": 500000,
                "currency": "NGN",
                "paid_at": "2025-01-04T10:00:00Z"
            }
        }"#;
        let envelope: VerifyEnvelope = serde_json::from_str(json).expect("parse");
        assert!(envelope.status);
        let tx: GatewayTransaction = envelope.data.expect("data").into();
        assert_eq!(tx.status, TransactionStatus::Success);
        assert_eq!(tx.amount_minor, 500_000);
        assert_eq!(tx.currency, "NGN");
        assert!(tx.paid_at.is_some());
    }

    #[test]
    fn test_parse_failed_transaction_in_success_envelope() {
        // Envelope ok, charge failed: a valid negative outcome.
        let json = r#"{
            "status": true,
            "data": { "status": "failed", "amount": 500000, "currency": "NGN", "paid_at": null }
        }"#;
        let envelope: VerifyEnvelope = serde_json::from_str(json).expect("parse");
        assert!(envelope.status);
        let tx: GatewayTransaction = envelope.data.expect("data").into();
        assert_eq!(tx.status, TransactionStatus::Failed);
        assert!(tx.paid_at.is_none());
    }

    #[test]
    fn test_parse_failure_envelope() {
        let json = r#"{ "status": false, "message": "Transaction reference not found" }"#;
        let envelope: VerifyEnvelope = serde_json::from_str(json).expect("parse");
        assert!(!envelope.status);
        assert!(envelope.data.is_none());
        assert_eq!(
            envelope.message.as_deref(),
            Some("Transaction reference not found")
        );
    }

    #[test]
    fn test_unrecognized_status_maps_to_unknown() {
        let json = r#"{
            "status": true,
            "data": { "status": "reversed", "amount": 100, "currency": "NGN" }
        }"#;
        let envelope: VerifyEnvelope = serde_json::from_str(json).expect("parse");
        let tx: GatewayTransaction = envelope.data.expect("data").into();
        assert_eq!(tx.status, TransactionStatus::Unknown);
        assert!(!tx.status.is_success());
    }
}
