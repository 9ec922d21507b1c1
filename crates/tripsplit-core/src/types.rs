//! # Domain Types
//!
//! Core domain types used throughout Tripsplit.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Engine values (immutable, passed in / returned)                       │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Participant    │   │    Expense      │   │    Transfer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name           │   │  paid_by        │   │  from / to      │       │
//! │  │                 │   │  amount (Money) │   │  amount (Money) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Persistent records (rows owned by tripsplit-db)                       │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Trip        │   │  ExpenseRecord  │   │  PaymentRecord  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  total_cents    │   │  amount_cents   │   │  amount_cents   │       │
//! │  │  settled        │   │  paid_by        │   │  settled        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Within a trip, a participant is identified by `name` (case-sensitive).
//! Expenses and payments reference participants by name, not by row id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Engine Inputs
// =============================================================================

/// A named party sharing expenses on a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Participant {
    pub name: String,
}

impl Participant {
    /// Creates a participant with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Participant { name: name.into() }
    }
}

/// A recorded payment by one participant, split equally among all participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Name of the participant who paid.
    pub paid_by: String,
    /// Amount paid (non-negative).
    pub amount: Money,
}

impl Expense {
    /// Creates an expense paid by `paid_by`.
    pub fn new(paid_by: impl Into<String>, amount: Money) -> Self {
        Expense {
            paid_by: paid_by.into(),
            amount,
        }
    }
}

// =============================================================================
// Engine Outputs
// =============================================================================

/// One participant's net position.
///
/// Positive = creditor (is owed money), negative = debtor (owes money).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Balance {
    pub name: String,
    pub amount: Money,
}

/// Net balances for a trip, in participant order.
///
/// ## Ordering
/// Entries keep the order participants were supplied in, followed by any
/// implicitly admitted payers in order of first appearance. This order is
/// the tie-break key of the settlement planner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Balances(Vec<Balance>);

impl Balances {
    /// Builds balances from `(name, amount)` pairs, keeping their order.
    ///
    /// ## Example
    /// ```rust
    /// use tripsplit_core::{Balances, Money};
    ///
    /// let balances = Balances::from_pairs([
    ///     ("A", Money::from_cents(50)),
    ///     ("B", Money::from_cents(-50)),
    /// ]);
    /// assert_eq!(balances.len(), 2);
    /// assert_eq!(balances.get("B"), Some(Money::from_cents(-50)));
    /// ```
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Money)>,
        S: Into<String>,
    {
        Balances(
            pairs
                .into_iter()
                .map(|(name, amount)| Balance {
                    name: name.into(),
                    amount,
                })
                .collect(),
        )
    }

    /// Returns the balance of `name`, if present.
    pub fn get(&self, name: &str) -> Option<Money> {
        self.0.iter().find(|b| b.name == name).map(|b| b.amount)
    }

    /// Iterates balances in order.
    pub fn iter(&self) -> impl Iterator<Item = &Balance> {
        self.0.iter()
    }

    /// Number of balance holders.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no balance holders.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all balances. Zero up to rounding for a consistent trip.
    pub fn sum(&self) -> Money {
        self.0.iter().map(|b| b.amount).sum()
    }

    /// Largest absolute balance (zero when empty).
    pub fn max_abs(&self) -> Money {
        self.0
            .iter()
            .map(|b| b.amount.abs())
            .max()
            .unwrap_or_default()
    }

    /// Replays transfers against these balances and returns what is left.
    ///
    /// A transfer moves `amount` from debtor to creditor, so the debtor's
    /// balance rises and the creditor's falls. After a complete plan every
    /// residual is within the settlement tolerance of zero.
    ///
    /// Transfers naming someone without a balance are ignored.
    pub fn apply_transfers(&self, transfers: &[Transfer]) -> Balances {
        let mut residual = self.clone();
        for transfer in transfers {
            for entry in residual.0.iter_mut() {
                if entry.name == transfer.from {
                    entry.amount += transfer.amount;
                } else if entry.name == transfer.to {
                    entry.amount -= transfer.amount;
                }
            }
        }
        residual
    }

    pub(crate) fn push(&mut self, name: String, amount: Money) {
        self.0.push(Balance { name, amount });
    }
}

impl<'a> IntoIterator for &'a Balances {
    type Item = &'a Balance;
    type IntoIter = std::slice::Iter<'a, Balance>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A single payment that moves money from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transfer {
    /// Debtor paying.
    pub from: String,
    /// Creditor receiving.
    pub to: String,
    /// Positive amount.
    pub amount: Money,
}

/// Balances plus the transfers that clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SettlementPlan {
    pub balances: Balances,
    pub transfers: Vec<Transfer>,
}

impl SettlementPlan {
    /// True when nobody owes anybody.
    pub fn is_noop(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Total money moved by the plan.
    pub fn transferred(&self) -> Money {
        self.transfers.iter().map(|t| t.amount).sum()
    }
}

/// Trip-level figures shown alongside the expense list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub total: Money,
    pub participant_count: usize,
    /// Equal share, rounded to the cent (display only).
    pub per_person_share: Money,
}

// =============================================================================
// Trip
// =============================================================================

/// A named, dated collection of participants and expenses.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Trip {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name ("Lisbon weekend").
    pub name: String,

    /// Trip date, if the user gave one.
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,

    /// Sum of all expense amounts in cents. Recomputed on every expense change.
    pub total_cents: i64,

    /// True once a settlement plan has been persisted.
    pub settled: bool,

    /// User who created the trip.
    pub owner_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Returns the trip total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Participant Record
// =============================================================================

/// A participant row.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ParticipantRecord {
    pub id: String,
    pub trip_id: String,
    pub name: String,
    /// Set for the trip owner; friends get one when they accept an invite.
    pub user_id: Option<String>,
    /// Insertion order within the trip.
    pub position: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl ParticipantRecord {
    /// Converts the row into an engine input.
    pub fn to_participant(&self) -> Participant {
        Participant::new(self.name.clone())
    }
}

// =============================================================================
// Expense Record
// =============================================================================

/// An expense row.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ExpenseRecord {
    pub id: String,
    pub trip_id: String,
    pub description: String,
    /// Amount in cents.
    pub amount_cents: i64,
    /// Participant name of the payer.
    pub paid_by: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl ExpenseRecord {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Converts the row into an engine input.
    pub fn to_expense(&self) -> Expense {
        Expense::new(self.paid_by.clone(), self.amount())
    }
}

/// Input for recording a new expense.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub description: String,
    pub amount: Money,
    pub paid_by: String,
    /// Defaults to today when absent.
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
}

// =============================================================================
// Payment Record
// =============================================================================

/// A persisted transfer from a settled trip.
///
/// Created with `settled = false`; flipped when the debtor actually pays.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentRecord {
    pub id: String,
    pub trip_id: String,
    pub from_person: String,
    pub to_person: String,
    /// Amount in cents.
    pub amount_cents: i64,
    pub settled: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub settled_at: Option<DateTime<Utc>>,
}

impl PaymentRecord {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Returns the transfer this payment was created from.
    pub fn to_transfer(&self) -> Transfer {
        Transfer {
            from: self.from_person.clone(),
            to: self.to_person.clone(),
            amount: self.amount(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
