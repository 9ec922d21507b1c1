//! # Validation Module
//!
//! Input validation utilities for Tripsplit.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend form                                                │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Trip store (tripsplit-db)                                    │
//! │  └── THIS MODULE: Business rule validation before insert               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Settlement engine                                            │
//! │  └── Re-checks amounts and names before computing anything             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  ├── CHECK (amount_cents >= 0)                                         │
//! │  └── UNIQUE (trip_id, name)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tripsplit_core::validation::{validate_participant_name, validate_expense_amount};
//! use tripsplit_core::Money;
//!
//! validate_participant_name("Alice").unwrap();
//! validate_expense_amount(Money::from_cents(1099)).unwrap();
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_PARTICIPANT_NAME_LEN, MAX_TRIP_PARTICIPANTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a participant display name.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most `MAX_PARTICIPANT_NAME_LEN` characters
/// - Must not carry leading/trailing whitespace (names are identity keys,
///   so `"Bob "` and `"Bob"` would silently become two people)
///
/// ## Example
/// ```rust
/// use tripsplit_core::validation::validate_participant_name;
///
/// assert!(validate_participant_name("Alice").is_ok());
/// assert!(validate_participant_name("").is_err());
/// assert!(validate_participant_name(" Alice").is_err());
/// ```
pub fn validate_participant_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_PARTICIPANT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PARTICIPANT_NAME_LEN,
        });
    }

    if name.trim() != name {
        return Err(ValidationError::InvalidFormat {
            field: "name".to_string(),
            reason: "must not start or end with whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a trip name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_trip_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "trip name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "trip name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an expense description ("Dinner at Time Out Market").
pub fn validate_expense_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.chars().count() > 500 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 500,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an expense amount.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (placeholder entries such as "Bob paid nothing")
///
/// ## Example
/// ```rust
/// use tripsplit_core::validation::validate_expense_amount;
/// use tripsplit_core::Money;
///
/// assert!(validate_expense_amount(Money::from_cents(15050)).is_ok());
/// assert!(validate_expense_amount(Money::zero()).is_ok());
/// assert!(validate_expense_amount(Money::from_cents(-1)).is_err());
/// ```
pub fn validate_expense_amount(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Parses and validates a raw amount typed by a user.
///
/// Combines `Money::from_str` with [`validate_expense_amount`].
pub fn parse_expense_amount(raw: &str) -> ValidationResult<Money> {
    let amount: Money = raw.parse()?;
    validate_expense_amount(amount)?;
    Ok(amount)
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of participants on a trip.
///
/// ## Rules
/// - Must not exceed `MAX_TRIP_PARTICIPANTS`
pub fn validate_participant_count(count: usize) -> ValidationResult<()> {
    if count > MAX_TRIP_PARTICIPANTS {
        return Err(ValidationError::OutOfRange {
            field: "participants".to_string(),
            min: 0,
            max: MAX_TRIP_PARTICIPANTS as i64,
        });
    }

    Ok(())
}

/// Validates that no name appears twice (case-sensitive).
///
/// ## Example
/// ```rust
/// use tripsplit_core::validation::validate_unique_names;
///
/// assert!(validate_unique_names(["Alice", "alice"]).is_ok());
/// assert!(validate_unique_names(["Alice", "Bob", "Alice"]).is_err());
/// ```
pub fn validate_unique_names<'a, I>(names: I) -> ValidationResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ValidationError::Duplicate {
                field: "participant".to_string(),
                value: name.to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use tripsplit_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_participant_name() {
        assert!(validate_participant_name("Alice").is_ok());
        assert!(validate_participant_name("Mary Ann").is_ok());

        assert!(validate_participant_name("").is_err());
        assert!(validate_participant_name("   ").is_err());
        assert!(validate_participant_name("Bob ").is_err());
        assert!(validate_participant_name(&"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_trip_name() {
        assert!(validate_trip_name("Lisbon weekend").is_ok());
        assert!(validate_trip_name("").is_err());
        assert!(validate_trip_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_expense_description() {
        assert!(validate_expense_description("Dinner").is_ok());
        assert!(validate_expense_description("  ").is_err());
    }

    #[test]
    fn test_parse_expense_amount() {
        assert_eq!(parse_expense_amount("150.50").unwrap().cents(), 15050);
        assert_eq!(parse_expense_amount("0").unwrap().cents(), 0);

        assert_eq!(
            parse_expense_amount("-1"),
            Err(ValidationError::MustBeNonNegative {
                field: "amount".to_string()
            })
        );
        assert!(matches!(
            parse_expense_amount("twelve"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_participant_count() {
        assert!(validate_participant_count(0).is_ok());
        assert!(validate_participant_count(MAX_TRIP_PARTICIPANTS).is_ok());
        assert!(validate_participant_count(MAX_TRIP_PARTICIPANTS + 1).is_err());
    }

    #[test]
    fn test_validate_unique_names_is_case_sensitive() {
        assert!(validate_unique_names(["A", "B", "a"]).is_ok());
        assert_eq!(
            validate_unique_names(["A", "B", "A"]),
            Err(ValidationError::Duplicate {
                field: "participant".to_string(),
                value: "A".to_string()
            })
        );
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
