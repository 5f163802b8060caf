//! PostgreSQL store backend.

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::store::{PaymentParties, PaymentStatus, Store};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

/// Store backed by the journal's PostgreSQL database.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| Error::Config(format!("failed to connect to database: {e}")))?;

        info!(
            "Connected to database (max_connections={})",
            config.max_connections
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool, for callers that manage their own.
    #[must_use]
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn record_payment_outcome(
        &self,
        reference: &str,
        status: PaymentStatus,
        paid_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE payments
             SET status = $1, payment_date = $2, updated_at = $3
             WHERE gateway_reference = $4",
        )
        .bind(status)
        .bind(paid_at)
        .bind(updated_at)
        .bind(reference)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Storage(format!("payment update failed: {e}")))?;

        Ok(())
    }

    async fn payment_parties(&self, reference: &str) -> Result<Option<PaymentParties>> {
        let row = sqlx::query(
            "SELECT user_id, manuscript_id FROM payments WHERE gateway_reference = $1",
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Storage(format!("payment lookup failed: {e}")))?;

        match row {
            Some(row) => {
                let user_id: Uuid = row
                    .try_get("user_id")
                    .map_err(|e| Error::Storage(format!("payment row decode failed: {e}")))?;
                let manuscript_id: Uuid = row
                    .try_get("manuscript_id")
                    .map_err(|e| Error::Storage(format!("payment row decode failed: {e}")))?;
                Ok(Some(PaymentParties {
                    user_id,
                    manuscript_id,
                }))
            }
            None => Ok(None),
        }
    }

    async fn submit_manuscript_if_draft(
        &self,
        manuscript_id: Uuid,
        submitted_at: DateTime<Utc>,
    ) -> Result<bool> {
        // Single conditional statement; the status predicate is the
        // compare-and-swap that makes replayed confirmations a no-op.
        let result = sqlx::query(
            "UPDATE manuscripts
             SET status = 'submitted', submission_date = $1
             WHERE id = $2 AND status = 'draft'",
        )
        .bind(submitted_at)
        .bind(manuscript_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Storage(format!("manuscript update failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
