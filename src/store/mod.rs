//! Storage layer for payment and manuscript records.
//!
//! The workflow needs exactly three storage operations: record a payment
//! outcome, look up who a payment belongs to, and conditionally submit a
//! manuscript. The conditional submit is the sole concurrency primitive in
//! the system: a single atomic `UPDATE ... WHERE id = $1 AND status =
//! 'draft'` whose affected-row count says whether the transition applied.
//! It must never be decomposed into a read followed by a write.

mod memory;
mod postgres;

pub use memory::{ManuscriptRecord, MemoryStore, PaymentRecord};
pub use postgres::PgStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a payment record.
///
/// Transitions only `pending -> completed` or `pending -> failed`; this
/// service never reverses a settled payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Created at charge initiation, outcome not yet confirmed.
    Pending,
    /// Gateway confirmed the charge succeeded.
    Completed,
    /// Gateway reported a definitive negative outcome.
    Failed,
}

/// Lifecycle status of a manuscript.
///
/// This service only ever performs the `draft -> submitted` transition;
/// the remaining states belong to the editorial workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum ManuscriptStatus {
    /// Being authored; submission fee not yet paid.
    Draft,
    /// Submitted for editorial consideration.
    Submitted,
    /// Under peer review.
    UnderReview,
    /// Returned to the author for revision.
    RevisionRequested,
    /// Accepted for publication.
    Accepted,
    /// Rejected.
    Rejected,
    /// Published.
    Published,
}

/// The parties a payment record ties together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentParties {
    /// Owning user.
    pub user_id: Uuid,
    /// Manuscript whose submission fee this payment covers.
    pub manuscript_id: Uuid,
}

/// Storage operations the verification workflow depends on.
#[async_trait]
pub trait Store: Send + Sync {
    /// Record the confirmed outcome on the payment record matched by the
    /// gateway `reference`.
    ///
    /// Matching no row is not an error here; the missing-record case is
    /// surfaced distinctly by [`Store::payment_parties`] on the success
    /// path, where it indicates a referential-integrity gap.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the write fails.
    async fn record_payment_outcome(
        &self,
        reference: &str,
        status: PaymentStatus,
        paid_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Look up the user and manuscript a payment record belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the lookup fails.
    async fn payment_parties(&self, reference: &str) -> Result<Option<PaymentParties>>;

    /// Transition the manuscript to `submitted`, guarded on its current
    /// status still being `draft`.
    ///
    /// Returns whether a row actually transitioned. A `false` result means
    /// the manuscript was already past `draft` (e.g. a replayed
    /// confirmation) and is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the write fails.
    async fn submit_manuscript_if_draft(
        &self,
        manuscript_id: Uuid,
        submitted_at: DateTime<Utc>,
    ) -> Result<bool>;
}
