//! # tripsplit-core: Pure Business Logic for Tripsplit
//!
//! This crate is the **heart** of Tripsplit. It turns a trip's participants
//! and expenses into per-person balances and a settlement plan, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tripsplit Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │    Trips ──► Participants ──► Expenses ──► Settle Trip          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               tripsplit-db (Trip Service)                       │   │
//! │  │     snapshot trip ──► run engine ──► persist payments           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tripsplit-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ settlement │  │ validation│  │   │
//! │  │   │  Expense  │  │   Money   │  │  balances  │  │   rules   │  │   │
//! │  │   │  Transfer │  │  rounding │  │  transfers │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Participant, Expense, Transfer, Trip, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`settlement`] - Balance computation and greedy settlement planning
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same participants + expenses = same transfer sequence
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use tripsplit_core::settlement::{compute_balances, plan_settlement};
//! use tripsplit_core::{Expense, Money, Participant};
//!
//! let participants = vec![
//!     Participant::new("Alice"),
//!     Participant::new("Bob"),
//!     Participant::new("Carol"),
//! ];
//! let expenses = vec![Expense::new("Alice", Money::from_cents(30000))];
//!
//! let balances = compute_balances(&participants, &expenses).unwrap();
//! assert_eq!(balances.get("Alice"), Some(Money::from_cents(20000)));
//!
//! let transfers = plan_settlement(&balances);
//! assert_eq!(transfers.len(), 2);
//! assert_eq!(transfers[0].from, "Bob");
//! assert_eq!(transfers[0].to, "Alice");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod settlement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tripsplit_core::Money` instead of
// `use tripsplit_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use settlement::{SettlementEngine, SettlementPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Name given to the trip owner's participant row when no display name is known.
pub const DEFAULT_OWNER_NAME: &str = "Me";

/// Maximum participants allowed on a single trip.
///
/// ## Business Reason
/// Keeps settlement plans readable and bounds the i128 intermediate sums.
pub const MAX_TRIP_PARTICIPANTS: usize = 100;

/// Maximum length of a participant display name.
pub const MAX_PARTICIPANT_NAME_LEN: usize = 100;

/// Default settlement tolerance in cents.
///
/// Balances within ±1 cent are treated as settled, and transfers of 1 cent
/// or less are not emitted.
pub const DEFAULT_TOLERANCE_CENTS: i64 = 1;
