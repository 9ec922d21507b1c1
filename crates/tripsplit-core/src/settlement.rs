//! # Settlement Engine
//!
//! Turns who-paid-what into net balances, then into the transfers that
//! clear them.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Settle Trip                                        │
//! │                                                                         │
//! │  participants + expenses                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  compute_balances ← exact `paid × n − total` in 1/n cents              │
//! │       │             rounded ONCE to cents (half away from zero)        │
//! │       ▼                                                                 │
//! │  Balances { Alice: +200.00, Bob: -100.00, Carol: -100.00 }             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  plan_settlement ← greedy: largest debtor pays largest creditor        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  [Bob → Alice 100.00, Carol → Alice 100.00]                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Points
//! 1. Balance output: each balance is an exact ratio rounded to the cent.
//! 2. Transfer amount: the minimum of two whole-cent amounts, so it is
//!    already a whole cent and needs no further rounding.
//!
//! Both stages are pure and deterministic. Equal amounts keep participant
//! order, so identical inputs always yield an identical transfer sequence.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Balances, Expense, Participant, SettlementPlan, Transfer, TripSummary};
use crate::validation::{validate_expense_amount, validate_unique_names};
use crate::DEFAULT_TOLERANCE_CENTS;

// =============================================================================
// Policy
// =============================================================================

/// What to do with an expense whose payer is not a participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPayerPolicy {
    /// Fail with [`CoreError::UnknownPayer`].
    #[default]
    Reject,
    /// Add the payer as a balance holder who bears no share of the total.
    #[serde(alias = "admit")]
    AdmitAsHolder,
}

impl FromStr for UnknownPayerPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(UnknownPayerPolicy::Reject),
            "admit" | "admit_as_holder" => Ok(UnknownPayerPolicy::AdmitAsHolder),
            other => Err(ValidationError::InvalidFormat {
                field: "unknown payer policy".to_string(),
                reason: format!("'{}' is not one of: reject, admit", other),
            }),
        }
    }
}

/// What to do when the participant list is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyParticipantsPolicy {
    /// Divide by `max(count, 1)`; an empty trip has no balances.
    #[default]
    Guard,
    /// Fail with [`CoreError::EmptyParticipants`].
    Reject,
}

impl FromStr for EmptyParticipantsPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guard" => Ok(EmptyParticipantsPolicy::Guard),
            "reject" => Ok(EmptyParticipantsPolicy::Reject),
            other => Err(ValidationError::InvalidFormat {
                field: "empty participants policy".to_string(),
                reason: format!("'{}' is not one of: guard, reject", other),
            }),
        }
    }
}

/// Tunable behavior of the settlement engine.
///
/// ## Defaults
/// - Unknown payers are rejected
/// - Empty participant lists are guarded (no error, no balances)
/// - Tolerance is one cent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementPolicy {
    pub unknown_payer: UnknownPayerPolicy,
    pub empty_participants: EmptyParticipantsPolicy,
    /// Balances within ±tolerance are settled; transfers of at most
    /// tolerance are not emitted.
    pub tolerance: Money,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        SettlementPolicy {
            unknown_payer: UnknownPayerPolicy::default(),
            empty_participants: EmptyParticipantsPolicy::default(),
            tolerance: Money::from_cents(DEFAULT_TOLERANCE_CENTS),
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Stateless settlement calculator configured by a [`SettlementPolicy`].
///
/// Safe to share across threads and call concurrently: every call works on
/// caller-supplied inputs and returns a fresh result.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementEngine {
    policy: SettlementPolicy,
}

impl SettlementEngine {
    /// Creates an engine with the given policy.
    pub fn new(policy: SettlementPolicy) -> Self {
        SettlementEngine { policy }
    }

    /// Returns the active policy.
    pub fn policy(&self) -> &SettlementPolicy {
        &self.policy
    }

    /// Computes each participant's net balance.
    ///
    /// ## Formula
    /// ```text
    /// share      = total / max(n, 1)
    /// balance[p] = paid[p] − share
    ///            = (paid[p] × n − total) / n      ← exact, then rounded
    /// ```
    ///
    /// ## Errors
    /// - [`CoreError::Validation`] for a negative amount or a duplicate name
    /// - [`CoreError::UnknownPayer`] under [`UnknownPayerPolicy::Reject`]
    /// - [`CoreError::EmptyParticipants`] under [`EmptyParticipantsPolicy::Reject`]
    /// - [`CoreError::AmountOverflow`] if a balance does not fit in i64 cents
    ///
    /// No partial result is ever returned.
    pub fn compute_balances(
        &self,
        participants: &[Participant],
        expenses: &[Expense],
    ) -> CoreResult<Balances> {
        if participants.is_empty()
            && self.policy.empty_participants == EmptyParticipantsPolicy::Reject
        {
            return Err(CoreError::EmptyParticipants);
        }

        validate_unique_names(participants.iter().map(|p| p.name.as_str()))?;

        let index: HashMap<&str, usize> = participants
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.as_str(), i))
            .collect();

        let mut paid: Vec<i128> = vec![0; participants.len()];
        // Payers admitted under AdmitAsHolder, in first-appearance order
        let mut holders: Vec<(&str, i128)> = Vec::new();
        let mut total: i128 = 0;

        for expense in expenses {
            validate_expense_amount(expense.amount)?;
            let cents = expense.amount.cents() as i128;
            total += cents;

            if let Some(&i) = index.get(expense.paid_by.as_str()) {
                paid[i] += cents;
                continue;
            }

            match self.policy.unknown_payer {
                UnknownPayerPolicy::Reject => {
                    return Err(CoreError::UnknownPayer {
                        payer: expense.paid_by.clone(),
                    });
                }
                UnknownPayerPolicy::AdmitAsHolder => {
                    match holders
                        .iter_mut()
                        .find(|(name, _)| *name == expense.paid_by.as_str())
                    {
                        Some((_, sum)) => *sum += cents,
                        None => holders.push((expense.paid_by.as_str(), cents)),
                    }
                }
            }
        }

        let divisor = participants.len().max(1) as i128;
        let overflow = || CoreError::AmountOverflow {
            context: "balances".to_string(),
        };

        let mut balances = Balances::default();
        for (participant, paid) in participants.iter().zip(paid) {
            let scaled = paid
                .checked_mul(divisor)
                .and_then(|p| p.checked_sub(total))
                .ok_or_else(overflow)?;
            let amount = Money::from_ratio_rounded(scaled, divisor).ok_or_else(overflow)?;
            balances.push(participant.name.clone(), amount);
        }

        // Holders bear no share, so their balance is exactly what they paid
        for (name, paid) in holders {
            let amount = i64::try_from(paid).map_err(|_| overflow())?;
            balances.push(name.to_string(), Money::from_cents(amount));
        }

        Ok(balances)
    }

    /// Plans the transfers that clear `balances`.
    ///
    /// ## Algorithm
    /// ```text
    /// creditors = balances >  tolerance, sorted by amount desc (stable)
    /// debtors   = balances < −tolerance, sorted by |amount| desc (stable)
    ///
    /// while creditors and debtors remain:
    ///     t = min(creditor, debtor)
    ///     if t > tolerance: emit debtor → creditor (t)
    ///     creditor −= t; debtor −= t
    ///     advance whichever reached zero
    /// ```
    ///
    /// Output is in generation order. Every iteration exhausts at least one
    /// side, so a plan has at most `creditors + debtors − 1` transfers.
    pub fn plan_settlement(&self, balances: &Balances) -> Vec<Transfer> {
        let tolerance = self.policy.tolerance.max(Money::zero());

        let mut creditors: Vec<(&str, Money)> = balances
            .iter()
            .filter(|b| b.amount > tolerance)
            .map(|b| (b.name.as_str(), b.amount))
            .collect();
        let mut debtors: Vec<(&str, Money)> = balances
            .iter()
            .filter(|b| b.amount < -tolerance)
            .map(|b| (b.name.as_str(), b.amount.abs()))
            .collect();

        // sort_by is stable: equal amounts keep participant order
        creditors.sort_by(|a, b| b.1.cmp(&a.1));
        debtors.sort_by(|a, b| b.1.cmp(&a.1));

        let mut transfers = Vec::new();
        let (mut i, mut j) = (0, 0);

        while i < creditors.len() && j < debtors.len() {
            let (creditor, owed) = creditors[i];
            let (debtor, owes) = debtors[j];
            let amount = owed.min(owes);

            if amount > tolerance {
                transfers.push(Transfer {
                    from: debtor.to_string(),
                    to: creditor.to_string(),
                    amount,
                });
            }

            creditors[i].1 -= amount;
            debtors[j].1 -= amount;

            if !creditors[i].1.is_positive() {
                i += 1;
            }
            if !debtors[j].1.is_positive() {
                j += 1;
            }
        }

        transfers
    }

    /// Runs both stages.
    pub fn settle(
        &self,
        participants: &[Participant],
        expenses: &[Expense],
    ) -> CoreResult<SettlementPlan> {
        let balances = self.compute_balances(participants, expenses)?;
        let transfers = self.plan_settlement(&balances);
        Ok(SettlementPlan {
            balances,
            transfers,
        })
    }
}

// =============================================================================
// Default-Policy Shortcuts
// =============================================================================

/// [`SettlementEngine::compute_balances`] with the default policy.
pub fn compute_balances(participants: &[Participant], expenses: &[Expense]) -> CoreResult<Balances> {
    SettlementEngine::default().compute_balances(participants, expenses)
}

/// [`SettlementEngine::plan_settlement`] with the default policy.
pub fn plan_settlement(balances: &Balances) -> Vec<Transfer> {
    SettlementEngine::default().plan_settlement(balances)
}

/// [`SettlementEngine::settle`] with the default policy.
pub fn settle(participants: &[Participant], expenses: &[Expense]) -> CoreResult<SettlementPlan> {
    SettlementEngine::default().settle(participants, expenses)
}

/// Trip total and equal share for display.
///
/// The divisor is floored at 1, matching [`EmptyParticipantsPolicy::Guard`].
pub fn summarize(participants: &[Participant], expenses: &[Expense]) -> TripSummary {
    let total: Money = expenses.iter().map(|e| e.amount).sum();
    TripSummary {
        total,
        participant_count: participants.len(),
        per_person_share: total.split_evenly(participants.len()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn people(names: &[&str]) -> Vec<Participant> {
        names.iter().map(|n| Participant::new(*n)).collect()
    }

    fn paid(name: &str, cents: i64) -> Expense {
        Expense::new(name, Money::from_cents(cents))
    }

    fn transfer(from: &str, to: &str, cents: i64) -> Transfer {
        Transfer {
            from: from.to_string(),
            to: to.to_string(),
            amount: Money::from_cents(cents),
        }
    }

    #[test]
    fn test_one_payer_for_three() {
        let participants = people(&["Alice", "Bob", "Carol"]);
        let expenses = vec![paid("Alice", 30000), paid("Bob", 0), paid("Carol", 0)];

        let balances = compute_balances(&participants, &expenses).unwrap();
        assert_eq!(
            balances,
            Balances::from_pairs([
                ("Alice", Money::from_cents(20000)),
                ("Bob", Money::from_cents(-10000)),
                ("Carol", Money::from_cents(-10000)),
            ])
        );

        let transfers = plan_settlement(&balances);
        assert_eq!(
            transfers,
            vec![
                transfer("Bob", "Alice", 10000),
                transfer("Carol", "Alice", 10000)
            ]
        );
    }

    #[test]
    fn test_two_people_fifty_cents_apart() {
        let participants = people(&["A", "B"]);
        let expenses = vec![paid("A", 15050), paid("B", 14950)];

        let plan = settle(&participants, &expenses).unwrap();
        assert_eq!(plan.balances.get("A"), Some(Money::from_cents(50)));
        assert_eq!(plan.balances.get("B"), Some(Money::from_cents(-50)));
        assert_eq!(plan.transfers, vec![transfer("B", "A", 50)]);
    }

    #[test]
    fn test_no_expenses_means_no_transfers() {
        let participants = people(&["A", "B", "C"]);

        let plan = settle(&participants, &[]).unwrap();
        assert!(plan.balances.iter().all(|b| b.amount.is_zero()));
        assert_eq!(plan.balances.len(), 3);
        assert!(plan.is_noop());
    }

    #[test]
    fn test_single_participant_never_transfers() {
        let participants = people(&["Solo"]);
        let expenses = vec![paid("Solo", 12345), paid("Solo", 999)];

        let plan = settle(&participants, &expenses).unwrap();
        assert_eq!(plan.balances.get("Solo"), Some(Money::zero()));
        assert!(plan.transfers.is_empty());
    }

    #[test]
    fn test_everyone_paid_their_share() {
        let participants = people(&["A", "B", "C"]);
        let expenses = vec![paid("A", 4000), paid("B", 2500), paid("B", 1500), paid("C", 4000)];

        let plan = settle(&participants, &expenses).unwrap();
        assert!(plan.is_noop());
    }

    #[test]
    fn test_odd_split_rounds_each_balance_once() {
        // $100.00 / 3: share is 3333.33.. cents
        let participants = people(&["A", "B", "C"]);
        let expenses = vec![paid("A", 10000)];

        let plan = settle(&participants, &expenses).unwrap();
        assert_eq!(plan.balances.get("A"), Some(Money::from_cents(6667)));
        assert_eq!(plan.balances.get("B"), Some(Money::from_cents(-3333)));
        assert_eq!(plan.balances.get("C"), Some(Money::from_cents(-3333)));
        assert_eq!(plan.balances.sum().cents(), 1);

        assert_eq!(
            plan.transfers,
            vec![transfer("B", "A", 3333), transfer("C", "A", 3333)]
        );

        let residual = plan.balances.apply_transfers(&plan.transfers);
        assert_eq!(residual.get("A"), Some(Money::from_cents(1)));
        assert!(residual.max_abs() <= Money::from_cents(1));
    }

    #[test]
    fn test_ties_follow_participant_order() {
        let balances = Balances::from_pairs([
            ("Zoe", Money::from_cents(-500)),
            ("Yan", Money::from_cents(1000)),
            ("Abe", Money::from_cents(-500)),
        ]);
        assert_eq!(
            plan_settlement(&balances),
            vec![transfer("Zoe", "Yan", 500), transfer("Abe", "Yan", 500)]
        );

        let reordered = Balances::from_pairs([
            ("Abe", Money::from_cents(-500)),
            ("Yan", Money::from_cents(1000)),
            ("Zoe", Money::from_cents(-500)),
        ]);
        assert_eq!(
            plan_settlement(&reordered),
            vec![transfer("Abe", "Yan", 500), transfer("Zoe", "Yan", 500)]
        );
    }

    #[test]
    fn test_largest_creditor_meets_largest_debtor() {
        let balances = Balances::from_pairs([
            ("A", Money::from_cents(3000)),
            ("B", Money::from_cents(7000)),
            ("C", Money::from_cents(-6000)),
            ("D", Money::from_cents(-4000)),
        ]);

        assert_eq!(
            plan_settlement(&balances),
            vec![
                transfer("C", "B", 6000),
                transfer("D", "B", 1000),
                transfer("D", "A", 3000),
            ]
        );
    }

    #[test]
    fn test_one_cent_balances_are_settled() {
        let balances = Balances::from_pairs([
            ("A", Money::from_cents(1)),
            ("B", Money::from_cents(-1)),
        ]);
        assert!(plan_settlement(&balances).is_empty());
    }

    #[test]
    fn test_one_cent_remainders_are_not_emitted() {
        let balances = Balances::from_pairs([
            ("A", Money::from_cents(5)),
            ("B", Money::from_cents(-4)),
            ("C", Money::from_cents(-3)),
        ]);
        // B pays 4; A is left with 1 cent which C's 3 would cover, but a
        // 1-cent transfer is below tolerance
        assert_eq!(plan_settlement(&balances), vec![transfer("B", "A", 4)]);
    }

    #[test]
    fn test_custom_tolerance() {
        let engine = SettlementEngine::new(SettlementPolicy {
            tolerance: Money::from_cents(100),
            ..SettlementPolicy::default()
        });
        let balances = Balances::from_pairs([
            ("A", Money::from_cents(150)),
            ("B", Money::from_cents(-90)),
            ("C", Money::from_cents(-60)),
        ]);
        assert!(engine.plan_settlement(&balances).is_empty());
    }

    #[test]
    fn test_unknown_payer_rejected_by_default() {
        let participants = people(&["A", "B"]);
        let expenses = vec![paid("A", 1000), paid("Dave", 500)];

        let err = compute_balances(&participants, &expenses).unwrap_err();
        assert!(matches!(err, CoreError::UnknownPayer { ref payer } if payer == "Dave"));
    }

    #[test]
    fn test_unknown_payer_admitted_as_holder() {
        let engine = SettlementEngine::new(SettlementPolicy {
            unknown_payer: UnknownPayerPolicy::AdmitAsHolder,
            ..SettlementPolicy::default()
        });
        let participants = people(&["A", "B"]);
        let expenses = vec![paid("Dave", 600), paid("A", 1000), paid("Dave", 400)];

        let balances = engine.compute_balances(&participants, &expenses).unwrap();
        // Total 2000 shared by A and B only
        assert_eq!(
            balances,
            Balances::from_pairs([
                ("A", Money::from_cents(0)),
                ("B", Money::from_cents(-1000)),
                ("Dave", Money::from_cents(1000)),
            ])
        );
        assert!(balances.sum().is_zero());
        assert_eq!(
            engine.plan_settlement(&balances),
            vec![transfer("B", "Dave", 1000)]
        );
    }

    #[test]
    fn test_empty_participants_guarded_by_default() {
        let balances = compute_balances(&[], &[]).unwrap();
        assert!(balances.is_empty());
        assert!(plan_settlement(&balances).is_empty());
    }

    #[test]
    fn test_empty_participants_rejected_when_strict() {
        let engine = SettlementEngine::new(SettlementPolicy {
            empty_participants: EmptyParticipantsPolicy::Reject,
            ..SettlementPolicy::default()
        });
        assert!(matches!(
            engine.compute_balances(&[], &[]),
            Err(CoreError::EmptyParticipants)
        ));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let participants = people(&["A", "B"]);
        let expenses = vec![paid("A", 1000), paid("B", -1)];

        let err = compute_balances(&participants, &expenses).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBeNonNegative { .. })
        ));
    }

    #[test]
    fn test_duplicate_participants_rejected() {
        let participants = people(&["A", "B", "A"]);
        let err = compute_balances(&participants, &[]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let participants = people(&["alice", "Alice"]);
        let expenses = vec![paid("Alice", 1000)];

        let balances = compute_balances(&participants, &expenses).unwrap();
        assert_eq!(balances.get("alice"), Some(Money::from_cents(-500)));
        assert_eq!(balances.get("Alice"), Some(Money::from_cents(500)));
    }

    #[test]
    fn test_settle_is_deterministic() {
        let participants = people(&["A", "B", "C", "D"]);
        let expenses = vec![paid("A", 1234), paid("B", 5678), paid("A", 999), paid("D", 1)];

        let first = settle(&participants, &expenses).unwrap();
        let second = settle(&participants, &expenses).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_summarize() {
        let participants = people(&["A", "B", "C"]);
        let expenses = vec![paid("A", 10000)];

        let summary = summarize(&participants, &expenses);
        assert_eq!(summary.total.cents(), 10000);
        assert_eq!(summary.participant_count, 3);
        assert_eq!(summary.per_person_share.cents(), 3333);

        let empty = summarize(&[], &expenses);
        assert_eq!(empty.per_person_share.cents(), 10000);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "admit".parse::<UnknownPayerPolicy>().unwrap(),
            UnknownPayerPolicy::AdmitAsHolder
        );
        assert_eq!(
            " REJECT ".parse::<EmptyParticipantsPolicy>().unwrap(),
            EmptyParticipantsPolicy::Reject
        );
        assert!("maybe".parse::<UnknownPayerPolicy>().is_err());
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: SettlementPolicy =
            serde_json::from_str(r#"{"unknown_payer":"admit"}"#).unwrap();
        assert_eq!(policy.unknown_payer, UnknownPayerPolicy::AdmitAsHolder);
        assert_eq!(policy.empty_participants, EmptyParticipantsPolicy::Guard);
        assert_eq!(policy.tolerance, Money::from_cents(1));
    }
}
