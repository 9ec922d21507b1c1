//! # Repository Module
//!
//! Database repository implementations for the trip store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories                                         │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │  db.expenses().add(trip_id, &new_expense)                      │
//! │       ▼                                                                 │
//! │  ExpenseRepository                                                     │
//! │  ├── validate input (tripsplit-core validators)                        │
//! │  ├── BEGIN                                                              │
//! │  ├── check trip is open, payer is a participant                        │
//! │  ├── INSERT + recalculate trip total                                   │
//! │  └── COMMIT                                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository owns a pool clone. Free functions taking an
//! `SqliteExecutor` are shared between repositories so multi-step writes
//! can run on one transaction.
//!
//! ## Available Repositories
//!
//! - [`TripRepository`](trip::TripRepository) - Trip lifecycle and totals
//! - [`ParticipantRepository`](participant::ParticipantRepository) - Who is on a trip
//! - [`ExpenseRepository`](expense::ExpenseRepository) - Who paid what
//! - [`PaymentRepository`](payment::PaymentRepository) - Transfers from settled trips

pub mod expense;
pub mod participant;
pub mod payment;
pub mod trip;
