//! Payment verification and manuscript submission workflow.
//!
//! The one piece of this service with real invariants. Given a gateway
//! reference, it authoritatively determines whether the charge succeeded,
//! durably records that outcome, and - exactly once - advances the owning
//! manuscript from draft to submitted.
//!
//! The steps are strictly sequential: the payment outcome is recorded
//! before any manuscript mutation is attempted, so a crash in between
//! leaves a consistent, re-verifiable payment record. Replay safety comes
//! entirely from the store's conditional submit; the workflow holds no
//! locks and keeps no state across invocations.

use crate::auth::IdentityProvider;
use crate::error::{Error, Result};
use crate::event::{ServiceEvent, ServiceEventsSender};
use crate::gateway::{PaymentGateway, TransactionStatus};
use crate::store::{PaymentStatus, Store};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Result of a verification, returned to the caller.
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    /// Transaction status as the gateway reported it.
    pub status: TransactionStatus,
    /// Amount in major currency units.
    pub amount: f64,
    /// ISO currency code.
    pub currency: String,
    /// When the gateway recorded the payment.
    pub paid_at: Option<DateTime<Utc>>,
    /// Human-readable outcome.
    pub message: &'static str,
}

/// The payment-confirmation and submission-state-transition workflow.
///
/// Collaborators are injected at construction so tests can substitute
/// fakes; nothing here reads ambient configuration.
pub struct PaymentVerificationWorkflow {
    identity: Arc<dyn IdentityProvider>,
    gateway: Arc<dyn PaymentGateway>,
    store: Arc<dyn Store>,
    events: ServiceEventsSender,
}

impl PaymentVerificationWorkflow {
    /// Create a workflow over the given collaborators.
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        gateway: Arc<dyn PaymentGateway>,
        store: Arc<dyn Store>,
        events: ServiceEventsSender,
    ) -> Self {
        Self {
            identity,
            gateway,
            store,
            events,
        }
    }

    /// Verify the payment identified by `reference` on behalf of the caller
    /// identified by `auth_token`, and submit the owning manuscript if the
    /// charge succeeded.
    ///
    /// Validation is ordered and fail-fast: credential presence, credential
    /// validity, then reference presence - each with its own error.
    ///
    /// # Errors
    ///
    /// See [`crate::Error`] for the full taxonomy; every variant this
    /// returns maps to a distinct HTTP status.
    pub async fn verify_payment(
        &self,
        auth_token: Option<&str>,
        reference: Option<&str>,
    ) -> Result<VerificationOutcome> {
        let token = auth_token.ok_or(Error::MissingCredential)?;
        let caller = self.identity.resolve(token).await?;

        let reference = match reference {
            Some(r) if !r.is_empty() => r,
            _ => return Err(Error::MissingReference),
        };

        info!("Verifying payment with reference: {reference}");

        // Step 1: the gateway is the authority on the charge outcome. A
        // non-success transaction status is data; only an ambiguous answer
        // is an error.
        let transaction = self.gateway.verify_transaction(reference).await?;

        // Step 2: durably record the outcome before touching the manuscript.
        let payment_status = if transaction.status.is_success() {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Failed
        };
        self.store
            .record_payment_outcome(reference, payment_status, transaction.paid_at, Utc::now())
            .await
            .map_err(|e| self.alert(e))?;

        // Step 3: only a confirmed success may advance the manuscript.
        if transaction.status.is_success() {
            self.submit_manuscript(reference, caller.id).await?;
            let _ = self.events.send(ServiceEvent::PaymentVerified {
                reference: reference.to_string(),
            });
        } else {
            info!(
                "Payment {reference} reported {} by gateway; manuscript untouched",
                transaction.status.as_str()
            );
            let _ = self.events.send(ServiceEvent::PaymentFailed {
                reference: reference.to_string(),
            });
        }

        let message = if transaction.status.is_success() {
            "Payment verified successfully"
        } else {
            "Payment failed"
        };

        Ok(VerificationOutcome {
            status: transaction.status,
            amount: transaction.amount_minor as f64 / 100.0,
            currency: transaction.currency,
            paid_at: transaction.paid_at,
            message,
        })
    }

    /// Put a storage failure on the event bus before propagating it.
    fn alert(&self, err: Error) -> Error {
        let _ = self.events.send(ServiceEvent::Error {
            message: err.to_string(),
        });
        err
    }

    /// Resolve the payment's parties, enforce ownership, and apply the
    /// conditional draft-to-submitted transition.
    async fn submit_manuscript(&self, reference: &str, caller_id: uuid::Uuid) -> Result<()> {
        let parties = match self
            .store
            .payment_parties(reference)
            .await
            .map_err(|e| self.alert(e))?
        {
            Some(parties) => parties,
            None => {
                // A confirmed charge with no local record is a
                // referential-integrity gap, not a client mistake.
                error!("No payment record matches confirmed reference {reference}");
                let _ = self.events.send(ServiceEvent::PaymentRecordMissing {
                    reference: reference.to_string(),
                });
                return Err(Error::PaymentNotFound);
            }
        };

        if parties.user_id != caller_id {
            warn!(
                "Payment ownership mismatch for {reference}: record owner {} != caller {caller_id}",
                parties.user_id
            );
            return Err(Error::OwnershipMismatch);
        }

        let transitioned = self
            .store
            .submit_manuscript_if_draft(parties.manuscript_id, Utc::now())
            .await
            .map_err(|e| self.alert(e))?;

        if transitioned {
            info!(
                "Payment verified and manuscript submitted: reference={reference} manuscript_id={} user_id={caller_id}",
                parties.manuscript_id
            );
            let _ = self.events.send(ServiceEvent::ManuscriptSubmitted {
                manuscript_id: parties.manuscript_id,
                reference: reference.to_string(),
            });
        } else {
            // Replayed or duplicate confirmation; the first writer won.
            info!(
                "Manuscript {} already past draft; confirmation for {reference} is a no-op",
                parties.manuscript_id
            );
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::auth::StaticIdentityProvider;
    use crate::event::{create_event_channel, ServiceEvent};
    use crate::gateway::GatewayTransaction;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use uuid::Uuid;

    /// Gateway fake returning a scripted answer.
    struct ScriptedGateway {
        answer: std::sync::Mutex<Option<Result<GatewayTransaction>>>,
    }

    impl ScriptedGateway {
        fn success() -> Self {
            Self::with(Ok(GatewayTransaction {
                status: TransactionStatus::Success,
                amount_minor: 500_000,
                currency: "NGN".to_string(),
                paid_at: Some(Utc::now()),
            }))
        }

        fn with(answer: Result<GatewayTransaction>) -> Self {
            Self {
                answer: std::sync::Mutex::new(Some(answer)),
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for ScriptedGateway {
        async fn verify_transaction(&self, _reference: &str) -> Result<GatewayTransaction> {
            self.answer
                .lock()
                .expect("lock")
                .take()
                .expect("gateway scripted for one call")
        }
    }

    fn workflow_over(
        gateway: ScriptedGateway,
        store: Arc<MemoryStore>,
        identity: Arc<StaticIdentityProvider>,
    ) -> PaymentVerificationWorkflow {
        let (events, _rx) = create_event_channel();
        PaymentVerificationWorkflow::new(identity, Arc::new(gateway), store, events)
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_anything_else() {
        let workflow = workflow_over(
            ScriptedGateway::success(),
            Arc::new(MemoryStore::new()),
            Arc::new(StaticIdentityProvider::new()),
        );
        let result = workflow.verify_payment(None, Some("ref_1")).await;
        assert!(matches!(result, Err(Error::MissingCredential)));
    }

    #[tokio::test]
    async fn test_invalid_token_rejected_before_reference_check() {
        let workflow = workflow_over(
            ScriptedGateway::success(),
            Arc::new(MemoryStore::new()),
            Arc::new(StaticIdentityProvider::new()),
        );
        // Reference is also missing, but the credential is checked first.
        let result = workflow.verify_payment(Some("tok_bogus"), None).await;
        assert!(matches!(result, Err(Error::InvalidCredential)));
    }

    #[tokio::test]
    async fn test_storage_failure_reaches_event_bus() {
        let identity = Arc::new(StaticIdentityProvider::new());
        identity.register("tok", Uuid::new_v4());
        let store = Arc::new(MemoryStore::new());
        store.fail_writes(true);

        let (events, mut rx) = create_event_channel();
        let workflow = PaymentVerificationWorkflow::new(
            identity,
            Arc::new(ScriptedGateway::success()),
            store,
            events,
        );

        let result = workflow.verify_payment(Some("tok"), Some("ref_1")).await;
        assert!(matches!(result, Err(Error::Storage(_))));

        match rx.recv().await.expect("event") {
            ServiceEvent::Error { message } => {
                assert!(message.contains("write failure injected"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_reference_rejected() {
        let identity = Arc::new(StaticIdentityProvider::new());
        identity.register("tok", Uuid::new_v4());
        let workflow = workflow_over(
            ScriptedGateway::success(),
            Arc::new(MemoryStore::new()),
            identity,
        );
        let result = workflow.verify_payment(Some("tok"), Some("")).await;
        assert!(matches!(result, Err(Error::MissingReference)));
    }
}
