//! # Error Types
//!
//! Domain-specific error types for tripsplit-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tripsplit-core errors (this file)                                     │
//! │  ├── CoreError        - Settlement and trip rule violations            │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tripsplit-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures (wraps CoreError)  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (payer name, trip ID, etc.)
//! 3. Errors are enum variants, never String
//! 4. Engine failures are all-or-nothing: no partial balances or plans

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent settlement rule violations or trip lifecycle
/// failures. They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An expense names a payer who is not a participant of the trip.
    ///
    /// ## When This Occurs
    /// - The strict unknown-payer policy is active (the default)
    /// - A participant was renamed or removed after paying
    ///
    /// ## User Workflow
    /// ```text
    /// Settle Trip
    ///      │
    ///      ▼
    /// Expense { paid_by: "Dave", amount: 40.00 }
    /// Participants: [Alice, Bob, Carol]
    ///      │
    ///      ▼
    /// UnknownPayer { payer: "Dave" }
    ///      │
    ///      ▼
    /// UI shows: "Dave is not a participant of this trip"
    /// ```
    #[error("Expense payer '{payer}' is not a participant of this trip")]
    UnknownPayer { payer: String },

    /// The participant list is empty and the strict policy forbids it.
    #[error("Cannot compute balances without participants")]
    EmptyParticipants,

    /// A monetary sum does not fit in 64-bit cents.
    #[error("Amount overflow while computing {context}")]
    AmountOverflow { context: String },

    /// The trip has already been settled.
    ///
    /// ## When This Occurs
    /// - Settling a trip twice
    /// - Adding or deleting expenses after settlement
    /// - Adding participants after settlement
    #[error("Trip {trip_id} is already settled")]
    TripAlreadySettled { trip_id: String },

    /// The trip has no expenses, so settling it would only lock it.
    #[error("Trip {trip_id} has no expenses to settle")]
    NothingToSettle { trip_id: String },

    /// A participant cannot be removed because they paid for expenses.
    #[error("Cannot remove {name}: they have expenses on this trip")]
    ParticipantHasExpenses { name: String },

    /// The trip owner cannot be removed from their own trip.
    #[error("Cannot remove {name}: they own this trip")]
    CannotRemoveOwner { name: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any balance is computed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Floating point input was NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format (e.g., invalid UUID, malformed amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate participant name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnknownPayer {
            payer: "Dave".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Expense payer 'Dave' is not a participant of this trip"
        );

        let err = CoreError::ParticipantHasExpenses {
            name: "Bob".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot remove Bob: they have expenses on this trip"
        );

        let err = CoreError::NothingToSettle {
            trip_id: "t-1".to_string(),
        };
        assert_eq!(err.to_string(), "Trip t-1 has no expenses to settle");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBeNonNegative {
            field: "amount".to_string(),
        };
        assert_eq!(err.to_string(), "amount must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::NotFinite {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
