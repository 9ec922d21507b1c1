//! # Settlement Service
//!
//! Connects the trip store to the settlement engine.
//!
//! ## settle_trip Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      settle_trip(trip_id)                               │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  UPDATE trips SET settled = 1 WHERE id = ? AND settled = 0             │
//! │    │  0 rows? → NotFound or TripAlreadySettled (ROLLBACK)               │
//! │    ▼                                                                    │
//! │  Snapshot participants (position order) + expenses                     │
//! │    │  no expenses? → NothingToSettle (ROLLBACK)                         │
//! │    ▼                                                                    │
//! │  SettlementEngine::settle  ← pure; an error here rolls everything back │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  INSERT one payment per transfer (settled = 0)                         │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The settled flag is claimed first, so the transaction holds the write
//! lock before reading the snapshot. A concurrent second settle either
//! waits and then matches zero rows, or fails; it never inserts a second
//! set of payments.

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::expense::load_expenses;
use crate::repository::participant::load_participants;
use crate::repository::payment::insert_payment;
use crate::repository::trip::fetch_trip;
use tripsplit_core::validation::validate_uuid;
use tripsplit_core::{
    CoreError, Expense, Participant, PaymentRecord, SettlementEngine, SettlementPlan, Trip,
};

/// A consistent read of one trip's engine inputs.
#[derive(Debug, Clone)]
pub struct TripSnapshot {
    pub trip: Trip,
    /// In insertion order.
    pub participants: Vec<Participant>,
    pub expenses: Vec<Expense>,
}

/// Result of settling a trip.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementOutcome {
    pub trip_id: String,
    pub plan: SettlementPlan,
    /// One row per transfer, in plan order.
    pub payments: Vec<PaymentRecord>,
}

/// Runs the settlement engine against stored trips.
#[derive(Debug, Clone)]
pub struct SettlementService {
    pool: SqlitePool,
    engine: SettlementEngine,
}

impl SettlementService {
    /// Creates a service using `engine` for every computation.
    pub fn new(pool: SqlitePool, engine: SettlementEngine) -> Self {
        SettlementService { pool, engine }
    }

    /// Returns the engine in use.
    pub fn engine(&self) -> &SettlementEngine {
        &self.engine
    }

    /// Reads a trip with its participants and expenses.
    ///
    /// All three reads share one transaction, so they see the same state.
    pub async fn snapshot(&self, trip_id: &str) -> DbResult<TripSnapshot> {
        validate_uuid(trip_id)?;
        let mut tx = self.pool.begin().await?;
        let snapshot = read_snapshot(&mut tx, trip_id).await?;
        tx.commit().await?;
        Ok(snapshot)
    }

    /// Computes the plan a settle would produce, without writing anything.
    ///
    /// Works for settled trips too: it shows the plan their current
    /// expenses imply.
    pub async fn preview(&self, trip_id: &str) -> DbResult<SettlementPlan> {
        let snapshot = self.snapshot(trip_id).await?;
        let plan = self
            .engine
            .settle(&snapshot.participants, &snapshot.expenses)?;

        debug!(
            trip_id = %trip_id,
            transfers = plan.transfers.len(),
            "Settlement previewed"
        );
        Ok(plan)
    }

    /// Settles a trip: persists its transfers as payments and marks it
    /// settled, atomically.
    ///
    /// ## Errors
    /// - `Core(Validation)` if `trip_id` is not a UUID
    /// - `NotFound` if the trip doesn't exist
    /// - `Core(TripAlreadySettled)` if it was settled before
    /// - `Core(NothingToSettle)` if no expense was recorded; the trip stays open
    /// - `Core(..)` from the engine (e.g. an expense whose payer left the
    ///   trip under the strict policy); nothing is written in that case
    pub async fn settle_trip(&self, trip_id: &str) -> DbResult<SettlementOutcome> {
        validate_uuid(trip_id)?;
        let mut tx = self.pool.begin().await?;

        let now = Utc::now();
        let claimed = sqlx::query(
            "UPDATE trips SET settled = 1, updated_at = ?2 WHERE id = ?1 AND settled = 0",
        )
        .bind(trip_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            return match fetch_trip(&mut *tx, trip_id).await? {
                Some(_) => {
                    warn!(trip_id = %trip_id, "Trip already settled");
                    Err(DbError::already_settled(trip_id))
                }
                None => Err(DbError::not_found("Trip", trip_id)),
            };
        }

        let snapshot = read_snapshot(&mut tx, trip_id).await?;
        if snapshot.expenses.is_empty() {
            // Dropping tx rolls the claim back
            warn!(trip_id = %trip_id, "Refusing to settle a trip without expenses");
            return Err(CoreError::NothingToSettle {
                trip_id: trip_id.to_string(),
            }
            .into());
        }

        let plan = self
            .engine
            .settle(&snapshot.participants, &snapshot.expenses)?;

        let mut payments = Vec::with_capacity(plan.transfers.len());
        for transfer in &plan.transfers {
            let payment = PaymentRecord {
                id: Uuid::new_v4().to_string(),
                trip_id: trip_id.to_string(),
                from_person: transfer.from.clone(),
                to_person: transfer.to.clone(),
                amount_cents: transfer.amount.cents(),
                settled: false,
                created_at: now,
                settled_at: None,
            };
            insert_payment(&mut *tx, &payment).await?;
            payments.push(payment);
        }

        tx.commit().await?;

        let residual = plan.balances.apply_transfers(&plan.transfers);
        info!(
            trip_id = %trip_id,
            participants = snapshot.participants.len(),
            expenses = snapshot.expenses.len(),
            payments = payments.len(),
            transferred = %plan.transferred(),
            max_residual = %residual.max_abs(),
            "Trip settled"
        );

        Ok(SettlementOutcome {
            trip_id: trip_id.to_string(),
            plan,
            payments,
        })
    }
}

async fn read_snapshot(conn: &mut SqliteConnection, trip_id: &str) -> DbResult<TripSnapshot> {
    let trip = fetch_trip(&mut *conn, trip_id)
        .await?
        .ok_or_else(|| DbError::not_found("Trip", trip_id))?;
    let participants = load_participants(&mut *conn, trip_id).await?;
    let expenses = load_expenses(&mut *conn, trip_id).await?;

    Ok(TripSnapshot {
        trip,
        participants,
        expenses,
    })
}
