//! Service event system.
//!
//! The workflow and mailer emit events on a broadcast channel; subscribers
//! (operational logging, future metrics) observe without being in the
//! request path. Emitting with no subscriber is not an error.

use tokio::sync::broadcast;
use uuid::Uuid;

/// Events emitted by the service.
#[derive(Debug, Clone)]
pub enum ServiceEvent {
    /// A payment was confirmed successful at the gateway.
    PaymentVerified {
        /// Gateway transaction reference.
        reference: String,
    },

    /// The gateway reported a definitive negative outcome for a payment.
    PaymentFailed {
        /// Gateway transaction reference.
        reference: String,
    },

    /// A manuscript transitioned from draft to submitted.
    ManuscriptSubmitted {
        /// Manuscript identifier.
        manuscript_id: Uuid,
        /// Gateway transaction reference of the confirming payment.
        reference: String,
    },

    /// A confirmed payment has no matching payment record. Operational
    /// alert: implies a referential-integrity gap.
    PaymentRecordMissing {
        /// Gateway transaction reference.
        reference: String,
    },

    /// Transactional email was dispatched.
    EmailSent {
        /// Number of recipients accepted by the provider.
        delivered: usize,
        /// Number of recipients the provider rejected.
        failed: usize,
    },

    /// Error occurred.
    Error {
        /// Error message.
        message: String,
    },
}

/// Channel for receiving service events.
pub type ServiceEventsChannel = broadcast::Receiver<ServiceEvent>;

/// Sender for service events.
pub type ServiceEventsSender = broadcast::Sender<ServiceEvent>;

/// Create a new event channel pair.
#[must_use]
pub fn create_event_channel() -> (ServiceEventsSender, ServiceEventsChannel) {
    broadcast::channel(256)
}
