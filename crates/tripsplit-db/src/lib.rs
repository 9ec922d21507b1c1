//! # tripsplit-db: Trip Store for Tripsplit
//!
//! This crate stores trips, participants, expenses and payments in SQLite,
//! and runs the settlement engine against them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tripsplit Data Flow                              │
//! │                                                                         │
//! │  Caller (web handler, CLI, seed binary)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  tripsplit-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Settlement  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │   Service    │  │   │
//! │  │   │               │    │ Trips         │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Participants  │◄───│ preview      │  │   │
//! │  │   │ Migrations    │    │ Expenses      │    │ settle_trip  │  │   │
//! │  │   │               │    │ Payments      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────┬───────┘  │   │
//! │  └──────────────────────────────────────────────────────┼──────────┘   │
//! │                                                         │              │
//! │                                                         ▼              │
//! │                                          tripsplit-core engine         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Trip, participant, expense and payment repositories
//! - [`settlement`] - Snapshot, preview and atomic settle
//! - [`config`] - Environment configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tripsplit_core::{Money, NewExpense};
//! use tripsplit_db::{Database, DbConfig, NewTrip};
//!
//! let db = Database::new(DbConfig::new("tripsplit.db")).await?;
//!
//! let trip = db.trips().create(NewTrip::new("Lisbon")).await?;
//! db.participants().add(&trip.id, "Bob").await?;
//! db.expenses().add(&trip.id, &NewExpense {
//!     description: "Dinner".into(),
//!     amount: Money::from_cents(6000),
//!     paid_by: "Bob".into(),
//!     date: None,
//! }).await?;
//!
//! let outcome = db.settlement().settle_trip(&trip.id).await?;
//! for payment in &outcome.payments {
//!     println!("{} pays {} {}", payment.from_person, payment.to_person, payment.amount());
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod settlement;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::TripsplitConfig;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use settlement::{SettlementOutcome, SettlementService, TripSnapshot};

// Repository re-exports for convenience
pub use repository::expense::ExpenseRepository;
pub use repository::participant::ParticipantRepository;
pub use repository::payment::PaymentRepository;
pub use repository::trip::{NewTrip, TripRepository};
