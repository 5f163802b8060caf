//! Error types for ajvs-pay.
//!
//! Every failure the verification workflow can surface maps to a stable
//! HTTP status and, where clients need to branch on it, a stable error code.

use thiserror::Error;

/// Errors produced by the payment verification service.
#[derive(Debug, Error)]
pub enum Error {
    /// No authorization credential was supplied with the request.
    #[error("Missing authorization header")]
    MissingCredential,

    /// The supplied credential did not resolve to a valid caller.
    #[error("Unauthorized")]
    InvalidCredential,

    /// The request carried no payment reference.
    #[error("Missing payment reference")]
    MissingReference,

    /// The request body could not be parsed. Parser detail stays out of
    /// the response.
    #[error("Malformed request body")]
    MalformedBody,

    /// The gateway was unreachable, timed out, or returned a failure
    /// envelope. The outcome of the charge is unknown; gateway internals
    /// are never included in the message.
    #[error("Payment verification failed. Please contact support if the issue persists.")]
    GatewayVerification,

    /// No payment record matches the gateway reference. Implies a
    /// referential-integrity gap and is logged as an operational alert.
    #[error("Payment record not found. Please contact support.")]
    PaymentNotFound,

    /// The payment belongs to a different user than the caller.
    #[error("You do not have permission to access this payment.")]
    OwnershipMismatch,

    /// A local storage read or write failed.
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Sending mail through the provider failed.
    #[error("Failed to send email")]
    Mail(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The stable machine-readable code for this error, if clients are
    /// expected to branch on it.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::GatewayVerification => Some("PAYMENT_VERIFICATION_FAILED"),
            Self::PaymentNotFound => Some("PAYMENT_NOT_FOUND"),
            Self::OwnershipMismatch => Some("PAYMENT_UNAUTHORIZED"),
            _ => None,
        }
    }

    /// Whether this error is safe for a client to retry.
    ///
    /// Gateway and storage failures are transient; credential, validation,
    /// and ownership failures are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::GatewayVerification | Self::Storage(_) | Self::Mail(_) | Self::Io(_)
        )
    }
}

/// Result type for ajvs-pay operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_codes() {
        assert_eq!(
            Error::GatewayVerification.code(),
            Some("PAYMENT_VERIFICATION_FAILED")
        );
        assert_eq!(Error::PaymentNotFound.code(), Some("PAYMENT_NOT_FOUND"));
        assert_eq!(Error::OwnershipMismatch.code(), Some("PAYMENT_UNAUTHORIZED"));
        assert_eq!(Error::MissingCredential.code(), None);
        assert_eq!(Error::MissingReference.code(), None);
        assert_eq!(Error::MalformedBody.code(), None);
    }

    #[test]
    fn test_retryability() {
        assert!(Error::GatewayVerification.is_retryable());
        assert!(Error::Storage("write failed".to_string()).is_retryable());
        assert!(!Error::OwnershipMismatch.is_retryable());
        assert!(!Error::InvalidCredential.is_retryable());
    }
}
