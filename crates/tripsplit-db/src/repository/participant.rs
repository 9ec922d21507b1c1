//! # Participant Repository
//!
//! Who is on a trip. A participant's name is their identity within the
//! trip: expenses and payments refer to it directly.
//!
//! ## Rules
//! - Names are validated and unique per trip (case-sensitive)
//! - Participants keep their insertion `position`; listing is always in
//!   that order, which is the settlement tie-break order
//! - Settled trips accept no new participants
//! - A participant who paid for something, or who owns the trip, stays

use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::trip::require_open_trip;
use tripsplit_core::validation::{
    validate_participant_count, validate_participant_name, validate_uuid,
};
use tripsplit_core::{CoreError, Participant, ParticipantRecord};

const PARTICIPANT_COLUMNS: &str = "id, trip_id, name, user_id, position, created_at";

/// Repository for participant database operations.
#[derive(Debug, Clone)]
pub struct ParticipantRepository {
    pool: SqlitePool,
}

impl ParticipantRepository {
    /// Creates a new ParticipantRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ParticipantRepository { pool }
    }

    /// Adds a participant to an open trip.
    ///
    /// ## Errors
    /// - `Core(Validation)` for a malformed trip id, a blank or over-long
    ///   name, or a full trip
    /// - `UniqueViolation` if the name is already on the trip
    /// - `NotFound` / `Core(TripAlreadySettled)` for a missing or settled trip
    pub async fn add(&self, trip_id: &str, name: &str) -> DbResult<ParticipantRecord> {
        validate_uuid(trip_id)?;
        validate_participant_name(name)?;

        let mut tx = self.pool.begin().await?;
        require_open_trip(&mut tx, trip_id).await?;

        let existing = list_participants(&mut *tx, trip_id).await?;
        if existing.iter().any(|p| p.name == name) {
            return Err(DbError::duplicate("participant", name));
        }
        validate_participant_count(existing.len() + 1)?;

        let position = existing.last().map(|p| p.position + 1).unwrap_or(0);
        let record = ParticipantRecord {
            id: Uuid::new_v4().to_string(),
            trip_id: trip_id.to_string(),
            name: name.to_string(),
            user_id: None,
            position,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO participants (id, trip_id, name, user_id, position, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&record.id)
        .bind(&record.trip_id)
        .bind(&record.name)
        .bind(&record.user_id)
        .bind(record.position)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(trip_id = %trip_id, name = %name, position, "Participant added");
        Ok(record)
    }

    /// Lists a trip's participants in insertion order.
    pub async fn list(&self, trip_id: &str) -> DbResult<Vec<ParticipantRecord>> {
        list_participants(&self.pool, trip_id).await
    }

    /// Lists participant names in insertion order.
    pub async fn names(&self, trip_id: &str) -> DbResult<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM participants WHERE trip_id = ?1 ORDER BY position",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    /// Removes a participant from an open trip.
    ///
    /// ## Errors
    /// - `Core(Validation)` for a malformed trip id
    /// - `NotFound` if the trip or participant doesn't exist
    /// - `Core(TripAlreadySettled)` for a settled trip
    /// - `Core(CannotRemoveOwner)` for the trip owner
    /// - `Core(ParticipantHasExpenses)` if they paid for any expense
    pub async fn remove(&self, trip_id: &str, name: &str) -> DbResult<()> {
        validate_uuid(trip_id)?;
        let mut tx = self.pool.begin().await?;
        let trip = require_open_trip(&mut tx, trip_id).await?;

        let participant = find_participant(&mut tx, trip_id, name)
            .await?
            .ok_or_else(|| DbError::not_found("Participant", name))?;

        if trip.owner_id.is_some() && participant.user_id == trip.owner_id {
            return Err(CoreError::CannotRemoveOwner {
                name: name.to_string(),
            }
            .into());
        }

        let paid: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM expenses WHERE trip_id = ?1 AND paid_by = ?2",
        )
        .bind(trip_id)
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        if paid > 0 {
            return Err(CoreError::ParticipantHasExpenses {
                name: name.to_string(),
            }
            .into());
        }

        sqlx::query("DELETE FROM participants WHERE id = ?1")
            .bind(&participant.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(trip_id = %trip_id, name = %name, "Participant removed");
        Ok(())
    }

    /// True when `name` is on the trip.
    pub async fn exists(&self, trip_id: &str, name: &str) -> DbResult<bool> {
        let mut conn = self.pool.acquire().await?;
        Ok(find_participant(&mut conn, trip_id, name).await?.is_some())
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Lists participants in position order on any executor.
pub(crate) async fn list_participants(
    executor: impl SqliteExecutor<'_>,
    trip_id: &str,
) -> DbResult<Vec<ParticipantRecord>> {
    let participants = sqlx::query_as::<_, ParticipantRecord>(&format!(
        "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE trip_id = ?1 ORDER BY position"
    ))
    .bind(trip_id)
    .fetch_all(executor)
    .await?;

    Ok(participants)
}

/// Engine inputs for a trip, in position order.
pub(crate) async fn load_participants(
    executor: impl SqliteExecutor<'_>,
    trip_id: &str,
) -> DbResult<Vec<Participant>> {
    let records = list_participants(executor, trip_id).await?;
    Ok(records.iter().map(ParticipantRecord::to_participant).collect())
}

pub(crate) async fn find_participant(
    conn: &mut SqliteConnection,
    trip_id: &str,
    name: &str,
) -> DbResult<Option<ParticipantRecord>> {
    let participant = sqlx::query_as::<_, ParticipantRecord>(&format!(
        "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE trip_id = ?1 AND name = ?2"
    ))
    .bind(trip_id)
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(participant)
}
