//! # Expense Repository
//!
//! Who paid what. Every write recalculates the trip's cached
//! `total_cents` inside the same transaction, so the total never drifts
//! from the expense rows.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::participant::find_participant;
use crate::repository::trip::{recalculate_total, require_open_trip};
use tripsplit_core::validation::{
    validate_expense_amount, validate_expense_description, validate_uuid,
};
use tripsplit_core::{CoreError, Expense, ExpenseRecord, NewExpense};

const EXPENSE_COLUMNS: &str = "id, trip_id, description, amount_cents, paid_by, date, created_at";

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records an expense on an open trip.
    ///
    /// ## What This Does
    /// 1. Validates description and amount
    /// 2. Checks the trip is open and the payer is one of its participants
    /// 3. Inserts the expense (dated today unless a date is given)
    /// 4. Recalculates the trip total
    ///
    /// ## Errors
    /// - `Core(Validation)` for a malformed trip id, a blank description or a
    ///   negative amount
    /// - `Core(UnknownPayer)` if `paid_by` is not on the trip
    /// - `NotFound` / `Core(TripAlreadySettled)` for a missing or settled trip
    pub async fn add(&self, trip_id: &str, new_expense: &NewExpense) -> DbResult<ExpenseRecord> {
        validate_uuid(trip_id)?;
        let description = new_expense.description.trim();
        validate_expense_description(description)?;
        validate_expense_amount(new_expense.amount)?;

        let mut tx = self.pool.begin().await?;
        require_open_trip(&mut tx, trip_id).await?;

        if find_participant(&mut tx, trip_id, &new_expense.paid_by)
            .await?
            .is_none()
        {
            return Err(CoreError::UnknownPayer {
                payer: new_expense.paid_by.clone(),
            }
            .into());
        }

        let now = Utc::now();
        let record = ExpenseRecord {
            id: Uuid::new_v4().to_string(),
            trip_id: trip_id.to_string(),
            description: description.to_string(),
            amount_cents: new_expense.amount.cents(),
            paid_by: new_expense.paid_by.clone(),
            date: new_expense.date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO expenses (id, trip_id, description, amount_cents, paid_by, date, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&record.id)
        .bind(&record.trip_id)
        .bind(&record.description)
        .bind(record.amount_cents)
        .bind(&record.paid_by)
        .bind(record.date)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        let total = recalculate_total(&mut tx, trip_id).await?;
        tx.commit().await?;

        debug!(
            trip_id = %trip_id,
            paid_by = %record.paid_by,
            amount = %record.amount(),
            total_cents = total,
            "Expense recorded"
        );
        Ok(record)
    }

    /// Lists a trip's expenses, most recent date first.
    pub async fn list(&self, trip_id: &str) -> DbResult<Vec<ExpenseRecord>> {
        let expenses = sqlx::query_as::<_, ExpenseRecord>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE trip_id = ?1 \
             ORDER BY date DESC, created_at DESC"
        ))
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Gets an expense by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ExpenseRecord>> {
        let expense = sqlx::query_as::<_, ExpenseRecord>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Deletes an expense from an open trip and recalculates its total.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let trip_id: String = sqlx::query_scalar("SELECT trip_id FROM expenses WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Expense", id))?;

        require_open_trip(&mut tx, &trip_id).await?;

        sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let total = recalculate_total(&mut tx, &trip_id).await?;
        tx.commit().await?;

        info!(id = %id, trip_id = %trip_id, total_cents = total, "Expense deleted");
        Ok(())
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Engine inputs for a trip, in recording order.
pub(crate) async fn load_expenses(
    executor: impl SqliteExecutor<'_>,
    trip_id: &str,
) -> DbResult<Vec<Expense>> {
    let records = sqlx::query_as::<_, ExpenseRecord>(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE trip_id = ?1 ORDER BY created_at"
    ))
    .bind(trip_id)
    .fetch_all(executor)
    .await?;

    Ok(records.iter().map(ExpenseRecord::to_expense).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::trip::NewTrip;
    use chrono::NaiveDate;
    use tripsplit_core::Money;

    async fn db_with_trip() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let trip = db
            .trips()
            .create(NewTrip::new("Lisbon").owned_by("user-1", "Alice"))
            .await
            .unwrap();
        db.participants().add(&trip.id, "Bob").await.unwrap();
        (db, trip.id)
    }

    fn expense(description: &str, cents: i64, paid_by: &str, day: u32) -> NewExpense {
        NewExpense {
            description: description.to_string(),
            amount: Money::from_cents(cents),
            paid_by: paid_by.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 5, day),
        }
    }

    #[tokio::test]
    async fn test_add_updates_trip_total() {
        let (db, trip_id) = db_with_trip().await;
        db.expenses()
            .add(&trip_id, &expense("Hotel", 30000, "Alice", 1))
            .await
            .unwrap();
        db.expenses()
            .add(&trip_id, &expense("Dinner", 4550, "Bob", 2))
            .await
            .unwrap();

        let trip = db.trips().get_by_id(&trip_id).await.unwrap().unwrap();
        assert_eq!(trip.total_cents, 34550);
    }

    #[tokio::test]
    async fn test_list_is_newest_date_first() {
        let (db, trip_id) = db_with_trip().await;
        db.expenses()
            .add(&trip_id, &expense("Hotel", 30000, "Alice", 1))
            .await
            .unwrap();
        db.expenses()
            .add(&trip_id, &expense("Museum", 1200, "Bob", 3))
            .await
            .unwrap();
        db.expenses()
            .add(&trip_id, &expense("Dinner", 4550, "Bob", 2))
            .await
            .unwrap();

        let descriptions: Vec<String> = db
            .expenses()
            .list(&trip_id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.description)
            .collect();
        assert_eq!(descriptions, vec!["Museum", "Dinner", "Hotel"]);
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_payer_and_negative_amount() {
        let (db, trip_id) = db_with_trip().await;

        let err = db
            .expenses()
            .add(&trip_id, &expense("Taxi", 1000, "Dave", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::UnknownPayer { .. })));

        let err = db
            .expenses()
            .add(&trip_id, &expense("Refund", -1000, "Bob", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));

        assert!(db.expenses().list(&trip_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_amount_is_allowed() {
        let (db, trip_id) = db_with_trip().await;
        let record = db
            .expenses()
            .add(&trip_id, &expense("Placeholder", 0, "Bob", 1))
            .await
            .unwrap();
        assert!(record.amount().is_zero());
    }

    #[tokio::test]
    async fn test_delete_recalculates_total() {
        let (db, trip_id) = db_with_trip().await;
        let hotel = db
            .expenses()
            .add(&trip_id, &expense("Hotel", 30000, "Alice", 1))
            .await
            .unwrap();
        db.expenses()
            .add(&trip_id, &expense("Dinner", 4550, "Bob", 2))
            .await
            .unwrap();

        db.expenses().delete(&hotel.id).await.unwrap();

        let trip = db.trips().get_by_id(&trip_id).await.unwrap().unwrap();
        assert_eq!(trip.total_cents, 4550);
        assert!(db.expenses().get_by_id(&hotel.id).await.unwrap().is_none());
        assert!(matches!(
            db.expenses().delete(&hotel.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
