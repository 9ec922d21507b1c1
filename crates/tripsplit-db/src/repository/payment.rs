//! # Payment Repository
//!
//! Transfers persisted by `settle_trip`. A payment starts outstanding
//! (`settled = false`) and is marked settled once the debtor has actually
//! paid the creditor.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tripsplit_core::{Money, PaymentRecord};

const PAYMENT_COLUMNS: &str =
    "id, trip_id, from_person, to_person, amount_cents, settled, created_at, settled_at";

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Lists all payments of a trip in plan order.
    pub async fn list_for_trip(&self, trip_id: &str) -> DbResult<Vec<PaymentRecord>> {
        // rowid follows insertion, which follows plan order
        let payments = sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE trip_id = ?1 ORDER BY rowid"
        ))
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Lists payments of a trip that have not been paid yet.
    pub async fn list_outstanding(&self, trip_id: &str) -> DbResult<Vec<PaymentRecord>> {
        let payments = sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE trip_id = ?1 AND settled = 0 \
             ORDER BY rowid"
        ))
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Marks an outstanding payment as paid.
    ///
    /// ## Errors
    /// - `NotFound` if the payment doesn't exist or is already settled
    pub async fn mark_settled(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE payments SET settled = 1, settled_at = ?2 WHERE id = ?1 AND settled = 0",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment (outstanding)", id));
        }

        info!(id = %id, "Payment settled");
        Ok(())
    }

    /// Sum of a trip's outstanding payments.
    pub async fn outstanding_total(&self, trip_id: &str) -> DbResult<Money> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM payments WHERE trip_id = ?1 AND settled = 0",
        )
        .bind(trip_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(total))
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Inserts one payment row on any executor.
pub(crate) async fn insert_payment(
    executor: impl SqliteExecutor<'_>,
    payment: &PaymentRecord,
) -> DbResult<()> {
    debug!(
        trip_id = %payment.trip_id,
        from = %payment.from_person,
        to = %payment.to_person,
        amount_cents = payment.amount_cents,
        "Inserting payment"
    );

    sqlx::query(
        r#"
        INSERT INTO payments (
            id, trip_id, from_person, to_person, amount_cents, settled, created_at, settled_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.trip_id)
    .bind(&payment.from_person)
    .bind(&payment.to_person)
    .bind(payment.amount_cents)
    .bind(payment.settled)
    .bind(payment.created_at)
    .bind(payment.settled_at)
    .execute(executor)
    .await?;

    Ok(())
}
