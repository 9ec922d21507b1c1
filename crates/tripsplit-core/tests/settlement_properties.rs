use proptest::prelude::*;
use tripsplit_core::settlement::{compute_balances, plan_settlement, settle};
use tripsplit_core::{Expense, Money, Participant};

const NAMES: [&str; 8] = ["Ana", "Ben", "Cho", "Dev", "Eli", "Fay", "Gus", "Hal"];

fn trip(
    participant_count: usize,
    amounts: &[i64],
    payer_indexes: &[usize],
) -> (Vec<Participant>, Vec<Expense>) {
    let participants: Vec<Participant> = NAMES[..participant_count]
        .iter()
        .map(|name| Participant::new(*name))
        .collect();
    let expenses = amounts
        .iter()
        .zip(payer_indexes)
        .map(|(amount, idx)| {
            Expense::new(NAMES[idx % participant_count], Money::from_cents(*amount))
        })
        .collect();
    (participants, expenses)
}

proptest! {
    #[test]
    fn balances_sum_to_zero_within_rounding(
        participant_count in 1usize..=8,
        amounts in prop::collection::vec(0i64..=1_000_000, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=7, 30),
    ) {
        let (participants, expenses) = trip(participant_count, &amounts, &payer_indexes);

        let balances = compute_balances(&participants, &expenses).expect("balances failed");
        prop_assert_eq!(balances.len(), participant_count);

        // Each balance is off by at most half a cent
        let drift = balances.sum().cents().abs();
        prop_assert!(drift * 2 <= participant_count as i64);
    }
}

proptest! {
    #[test]
    fn plan_moves_money_from_debtors_to_creditors(
        participant_count in 1usize..=8,
        amounts in prop::collection::vec(0i64..=1_000_000, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=7, 30),
    ) {
        let (participants, expenses) = trip(participant_count, &amounts, &payer_indexes);
        let plan = settle(&participants, &expenses).expect("settle failed");

        let creditors = plan.balances.iter().filter(|b| b.amount.cents() > 1).count();
        let debtors = plan.balances.iter().filter(|b| b.amount.cents() < -1).count();
        prop_assert!(plan.transfers.len() <= (creditors + debtors).saturating_sub(1));

        for transfer in &plan.transfers {
            prop_assert!(transfer.amount.cents() > 1);
            prop_assert_ne!(&transfer.from, &transfer.to);
            prop_assert!(plan.balances.get(&transfer.from).unwrap().is_negative());
            prop_assert!(plan.balances.get(&transfer.to).unwrap().is_positive());
        }

        // Transfers conserve money, and nobody ends up far from zero
        let residual = plan.balances.apply_transfers(&plan.transfers);
        prop_assert_eq!(residual.sum(), plan.balances.sum());
        let bound = 3 * participant_count as i64;
        prop_assert!(residual.max_abs().cents() <= bound);
        prop_assert!(residual.max_abs() <= plan.balances.max_abs());
    }
}

proptest! {
    #[test]
    fn exact_shares_settle_exactly(
        participant_count in 1usize..=8,
        dollars in prop::collection::vec(0i64..=500, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=7, 30),
    ) {
        // Totals divisible by the head count in whole dollars: nothing to round
        let amounts: Vec<i64> = dollars
            .iter()
            .map(|d| d * 100 * participant_count as i64)
            .collect();
        let (participants, expenses) = trip(participant_count, &amounts, &payer_indexes);
        let plan = settle(&participants, &expenses).expect("settle failed");

        prop_assert!(plan.balances.sum().is_zero());
        let residual = plan.balances.apply_transfers(&plan.transfers);
        prop_assert!(residual.iter().all(|b| b.amount.is_zero()));
    }
}

proptest! {
    #[test]
    fn equal_payments_need_no_transfers(
        participant_count in 1usize..=8,
        each in 0i64..=1_000_000,
    ) {
        let amounts = vec![each; participant_count];
        let payer_indexes: Vec<usize> = (0..participant_count).collect();
        let (participants, expenses) = trip(participant_count, &amounts, &payer_indexes);

        let balances = compute_balances(&participants, &expenses).expect("balances failed");
        prop_assert!(balances.iter().all(|b| b.amount.is_zero()));
        prop_assert!(plan_settlement(&balances).is_empty());
    }
}

proptest! {
    #[test]
    fn identical_inputs_give_identical_plans(
        participant_count in 1usize..=8,
        amounts in prop::collection::vec(0i64..=1_000_000, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=7, 30),
    ) {
        let (participants, expenses) = trip(participant_count, &amounts, &payer_indexes);

        let first = settle(&participants, &expenses).expect("settle failed");
        let second = settle(&participants, &expenses).expect("settle failed");
        prop_assert_eq!(first, second);
    }
}
