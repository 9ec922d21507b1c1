//! # Trip Repository
//!
//! Database operations for trips.
//!
//! ## Trip Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Trip Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create() → Trip { settled: false } + owner participant         │
//! │                                                                         │
//! │  2. OPEN                                                               │
//! │     └── participants().add() / expenses().add() / expenses().delete()  │
//! │     └── total_cents recalculated on every expense change              │
//! │                                                                         │
//! │  3. SETTLE                                                             │
//! │     └── settlement().settle_trip() → payments + { settled: true }      │
//! │                                                                         │
//! │  4. SETTLED (read-only)                                                │
//! │     └── further changes fail with TripAlreadySettled                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tripsplit_core::validation::{validate_participant_name, validate_trip_name};
use tripsplit_core::{Trip, DEFAULT_OWNER_NAME};

const TRIP_COLUMNS: &str =
    "id, name, date, total_cents, settled, owner_id, created_at, updated_at";

/// Input for creating a trip.
///
/// ## Example
/// ```rust,ignore
/// let new_trip = NewTrip::new("Lisbon weekend")
///     .on(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap())
///     .owned_by("user-42", "Alice");
/// ```
#[derive(Debug, Clone)]
pub struct NewTrip {
    pub name: String,
    pub date: Option<NaiveDate>,
    /// User creating the trip.
    pub owner_id: Option<String>,
    /// Display name of the owner's participant row. Defaults to "Me".
    pub owner_name: Option<String>,
}

impl NewTrip {
    /// Creates an undated trip with an anonymous owner.
    pub fn new(name: impl Into<String>) -> Self {
        NewTrip {
            name: name.into(),
            date: None,
            owner_id: None,
            owner_name: None,
        }
    }

    /// Sets the trip date.
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the owning user and the name they appear under.
    pub fn owned_by(mut self, owner_id: impl Into<String>, owner_name: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self.owner_name = Some(owner_name.into());
        self
    }
}

/// Repository for trip database operations.
#[derive(Debug, Clone)]
pub struct TripRepository {
    pool: SqlitePool,
}

impl TripRepository {
    /// Creates a new TripRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TripRepository { pool }
    }

    /// Creates a trip together with its owner's participant row.
    ///
    /// Both rows are written in one transaction. The owner is always the
    /// first participant (position 0).
    pub async fn create(&self, new_trip: NewTrip) -> DbResult<Trip> {
        let name = new_trip.name.trim().to_string();
        validate_trip_name(&name)?;

        let owner_name = new_trip
            .owner_name
            .unwrap_or_else(|| DEFAULT_OWNER_NAME.to_string());
        validate_participant_name(&owner_name)?;

        let now = Utc::now();
        let trip = Trip {
            id: Uuid::new_v4().to_string(),
            name,
            date: new_trip.date,
            total_cents: 0,
            settled: false,
            owner_id: new_trip.owner_id,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %trip.id, name = %trip.name, "Creating trip");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO trips (
                id, name, date, total_cents, settled, owner_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&trip.id)
        .bind(&trip.name)
        .bind(trip.date)
        .bind(trip.total_cents)
        .bind(trip.settled)
        .bind(&trip.owner_id)
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO participants (id, trip_id, name, user_id, position, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&trip.id)
        .bind(&owner_name)
        .bind(&trip.owner_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %trip.id, owner = %owner_name, "Trip created");
        Ok(trip)
    }

    /// Gets a trip by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Trip>> {
        fetch_trip(&self.pool, id).await
    }

    /// Lists all trips, newest first.
    pub async fn list(&self) -> DbResult<Vec<Trip>> {
        let trips = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    /// Lists trips that are (or are not yet) settled, newest first.
    pub async fn list_by_status(&self, settled: bool) -> DbResult<Vec<Trip>> {
        let trips = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE settled = ?1 ORDER BY created_at DESC"
        ))
        .bind(settled)
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    /// Recomputes `total_cents` from the trip's expenses and returns it.
    pub async fn recalculate_total(&self, trip_id: &str) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        recalculate_total(&mut conn, trip_id).await
    }

    /// Counts all trips.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trips")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Fetches a trip on any executor (pool, connection or transaction).
pub(crate) async fn fetch_trip(
    executor: impl SqliteExecutor<'_>,
    id: &str,
) -> DbResult<Option<Trip>> {
    let trip = sqlx::query_as::<_, Trip>(&format!(
        "SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(trip)
}

/// Fetches a trip that still accepts changes.
///
/// ## Errors
/// - `NotFound` if the trip doesn't exist
/// - `Core(TripAlreadySettled)` if it has been settled
pub(crate) async fn require_open_trip(conn: &mut SqliteConnection, id: &str) -> DbResult<Trip> {
    let trip = fetch_trip(&mut *conn, id)
        .await?
        .ok_or_else(|| DbError::not_found("Trip", id))?;

    if trip.settled {
        return Err(DbError::already_settled(id));
    }

    Ok(trip)
}

/// Sets `total_cents` to the sum of the trip's expenses.
pub(crate) async fn recalculate_total(conn: &mut SqliteConnection, trip_id: &str) -> DbResult<i64> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses WHERE trip_id = ?1",
    )
    .bind(trip_id)
    .fetch_one(&mut *conn)
    .await?;

    let result = sqlx::query("UPDATE trips SET total_cents = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(trip_id)
        .bind(total)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Trip", trip_id));
    }

    debug!(trip_id = %trip_id, total_cents = total, "Trip total recalculated");
    Ok(total)
}
