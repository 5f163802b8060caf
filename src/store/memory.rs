//! In-memory store backend.
//!
//! Backs the test suite and local development. Each record table sits
//! behind its own mutex; the conditional manuscript submit performs its
//! check and write under a single lock acquisition, matching the atomicity
//! of the SQL backend's conditional `UPDATE`.

use crate::error::{Error, Result};
use crate::store::{ManuscriptStatus, PaymentParties, PaymentStatus, Store};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

/// A payment record, keyed by the gateway reference.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    /// Owning user.
    pub user_id: Uuid,
    /// Manuscript whose submission fee this payment covers.
    pub manuscript_id: Uuid,
    /// Amount in minor currency units.
    pub amount_minor: i64,
    /// ISO currency code.
    pub currency: String,
    /// Lifecycle status.
    pub status: PaymentStatus,
    /// When the gateway recorded the payment; set on confirmation.
    pub payment_date: Option<DateTime<Utc>>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// A manuscript record.
#[derive(Debug, Clone)]
pub struct ManuscriptRecord {
    /// Owning author.
    pub author_id: Uuid,
    /// Lifecycle status.
    pub status: ManuscriptStatus,
    /// When the manuscript was submitted, if it has been.
    pub submission_date: Option<DateTime<Utc>>,
}

/// In-memory store over hash maps.
#[derive(Default)]
pub struct MemoryStore {
    payments: Mutex<HashMap<String, PaymentRecord>>,
    manuscripts: Mutex<HashMap<Uuid, ManuscriptRecord>>,
    /// When set, every write fails. Lets tests exercise persistence errors.
    fail_writes: Mutex<bool>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a payment record under the given gateway reference.
    pub fn insert_payment(&self, reference: &str, record: PaymentRecord) {
        self.payments.lock().insert(reference.to_string(), record);
    }

    /// Insert a manuscript record.
    pub fn insert_manuscript(&self, id: Uuid, record: ManuscriptRecord) {
        self.manuscripts.lock().insert(id, record);
    }

    /// Fetch a payment record by reference.
    #[must_use]
    pub fn payment(&self, reference: &str) -> Option<PaymentRecord> {
        self.payments.lock().get(reference).cloned()
    }

    /// Fetch a manuscript record by id.
    #[must_use]
    pub fn manuscript(&self, id: &Uuid) -> Option<ManuscriptRecord> {
        self.manuscripts.lock().get(id).cloned()
    }

    /// Make all subsequent writes fail.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    fn check_writable(&self) -> Result<()> {
        if *self.fail_writes.lock() {
            return Err(Error::Storage("write failure injected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn record_payment_outcome(
        &self,
        reference: &str,
        status: PaymentStatus,
        paid_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.check_writable()?;
        // Zero rows matched is not an error, mirroring the SQL backend.
        if let Some(record) = self.payments.lock().get_mut(reference) {
            record.status = status;
            record.payment_date = paid_at;
            record.updated_at = updated_at;
        }
        Ok(())
    }

    async fn payment_parties(&self, reference: &str) -> Result<Option<PaymentParties>> {
        Ok(self.payments.lock().get(reference).map(|r| PaymentParties {
            user_id: r.user_id,
            manuscript_id: r.manuscript_id,
        }))
    }

    async fn submit_manuscript_if_draft(
        &self,
        manuscript_id: Uuid,
        submitted_at: DateTime<Utc>,
    ) -> Result<bool> {
        self.check_writable()?;
        let mut manuscripts = self.manuscripts.lock();
        match manuscripts.get_mut(&manuscript_id) {
            Some(record) if record.status == ManuscriptStatus::Draft => {
                record.status = ManuscriptStatus::Submitted;
                record.submission_date = Some(submitted_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn draft_manuscript(author_id: Uuid) -> ManuscriptRecord {
        ManuscriptRecord {
            author_id,
            status: ManuscriptStatus::Draft,
            submission_date: None,
        }
    }

    #[tokio::test]
    async fn test_submit_transitions_draft_exactly_once() {
        let store = MemoryStore::new();
        let manuscript_id = Uuid::new_v4();
        store.insert_manuscript(manuscript_id, draft_manuscript(Uuid::new_v4()));

        let now = Utc::now();
        let first = store
            .submit_manuscript_if_draft(manuscript_id, now)
            .await
            .expect("write");
        let second = store
            .submit_manuscript_if_draft(manuscript_id, now)
            .await
            .expect("write");

        assert!(first);
        assert!(!second);
        let record = store.manuscript(&manuscript_id).expect("exists");
        assert_eq!(record.status, ManuscriptStatus::Submitted);
        assert_eq!(record.submission_date, Some(now));
    }

    #[tokio::test]
    async fn test_concurrent_submits_have_one_winner() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let manuscript_id = Uuid::new_v4();
        store.insert_manuscript(manuscript_id, draft_manuscript(Uuid::new_v4()));

        let now = Utc::now();
        let (a, b) = tokio::join!(
            store.submit_manuscript_if_draft(manuscript_id, now),
            store.submit_manuscript_if_draft(manuscript_id, now),
        );

        let a = a.expect("write");
        let b = b.expect("write");
        assert!(a != b, "exactly one writer must observe draft");
    }

    #[tokio::test]
    async fn test_submit_missing_manuscript_is_noop() {
        let store = MemoryStore::new();
        let applied = store
            .submit_manuscript_if_draft(Uuid::new_v4(), Utc::now())
            .await
            .expect("write");
        assert!(!applied);
    }

    #[tokio::test]
    async fn test_record_outcome_on_missing_reference_is_not_an_error() {
        let store = MemoryStore::new();
        store
            .record_payment_outcome("no_such_ref", PaymentStatus::Failed, None, Utc::now())
            .await
            .expect("matching zero rows is fine");
    }

    #[tokio::test]
    async fn test_record_outcome_updates_record() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let manuscript_id = Uuid::new_v4();
        store.insert_payment(
            "ref_1",
            PaymentRecord {
                user_id,
                manuscript_id,
                amount_minor: 500_000,
                currency: "NGN".to_string(),
                status: PaymentStatus::Pending,
                payment_date: None,
                updated_at: Utc::now(),
            },
        );

        let paid_at = Utc::now();
        store
            .record_payment_outcome("ref_1", PaymentStatus::Completed, Some(paid_at), Utc::now())
            .await
            .expect("write");

        let record = store.payment("ref_1").expect("exists");
        assert_eq!(record.status, PaymentStatus::Completed);
        assert_eq!(record.payment_date, Some(paid_at));

        let parties = store
            .payment_parties("ref_1")
            .await
            .expect("lookup")
            .expect("exists");
        assert_eq!(parties.user_id, user_id);
        assert_eq!(parties.manuscript_id, manuscript_id);
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let result = store
            .record_payment_outcome("ref_1", PaymentStatus::Completed, None, Utc::now())
            .await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
