//! Conservation tests for session settlement.
//!
//! Every settlement, creation or edit, bonus on or off, must satisfy
//! `system_earnings + prize + bonus_deduction == total_stake` exactly,
//! and the bonus pool must never go negative across any edit history.

use bingo_hall::session::{GameSession, SessionParams, SettlementPlan, plan_creation, plan_update};
use chrono::Utc;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn conserved(plan: &SettlementPlan) -> bool {
    plan.system_earnings + plan.prize + plan.bonus_deduction == plan.total_stake
}

fn session_with(plan: &SettlementPlan, params: &SessionParams) -> GameSession {
    GameSession {
        house_id: params.house_id,
        game_id: params.game_id.unwrap_or(1),
        stake_amount: params.stake_amount,
        number_of_players: params.number_of_players,
        cut_percentage: params.cut_percentage,
        total_stake: plan.total_stake,
        system_earnings: plan.system_earnings,
        prize: plan.prize,
        bonus_deduction: plan.bonus_deduction,
        dynamic_bonus: params.dynamic_bonus,
        cartela: BTreeSet::new(),
        drawn_numbers: Vec::new(),
        winner_card_id: None,
        finished: false,
        started_at: Utc::now(),
    }
}

fn params(stake: i64, players: i64, cut: i64, dynamic_bonus: bool) -> SessionParams {
    SessionParams {
        house_id: 1,
        game_id: Some(1),
        stake_amount: stake,
        number_of_players: players,
        cut_percentage: cut,
        cartela: BTreeSet::new(),
        dynamic_bonus,
    }
}

#[test]
fn handbook_example_conserves() {
    // stake 10.00 x 5 at 20%: total 50.00, earnings 10.00, prize 40.00.
    let plan = plan_creation(1000, 5, 20, false).unwrap();
    assert_eq!(plan.total_stake, 5000);
    assert_eq!(plan.system_earnings, 1000);
    assert_eq!(plan.prize, 4000);
    assert!(conserved(&plan));

    // With the dynamic bonus: 2.00 to the pool, prize 38.00.
    let plan = plan_creation(1000, 5, 20, true).unwrap();
    assert_eq!(plan.bonus_deduction, 200);
    assert_eq!(plan.prize, 3800);
    assert!(conserved(&plan));
}

#[test]
fn handbook_edit_example_moves_only_the_delta() {
    let created = plan_creation(1000, 5, 20, false).unwrap();
    let p0 = params(1000, 5, 20, false);
    let session = session_with(&created, &p0);

    let plan = plan_update(&session, &params(1000, 7, 20, false)).unwrap();
    assert_eq!(plan.total_stake, 7000);
    assert_eq!(plan.system_earnings, 1400);
    assert_eq!(plan.prize, 5600);
    // The original 10.00 commission is never re-debited.
    assert_eq!(plan.wallet_delta, 400);
    assert!(conserved(&plan));
}

#[test]
fn awkward_amounts_conserve() {
    let cases = [
        (1, 1, 1, false),
        (1, 1, 99, true),
        (999, 3, 33, true),
        (12345, 17, 7, true),
        (250, 120, 45, false),
        (100_000, 250, 60, true),
    ];
    for (stake, players, cut, bonus) in cases {
        let plan = plan_creation(stake, players, cut, bonus).unwrap();
        assert!(conserved(&plan), "not conserved for {stake}x{players}@{cut}");
        assert!(plan.prize >= 0);
        assert!(plan.bonus_deduction >= 0);
    }
}

proptest! {
    #[test]
    fn creation_always_conserves(
        stake in 1i64..=500_000,
        players in 1i64..=1_000,
        cut in 1i64..=99,
        bonus in any::<bool>(),
    ) {
        let plan = plan_creation(stake, players, cut, bonus).unwrap();
        prop_assert!(conserved(&plan));
        prop_assert!(plan.prize >= 0);
        prop_assert!(plan.bonus_deduction >= 0);
        prop_assert_eq!(plan.wallet_delta, plan.system_earnings);
    }

    #[test]
    fn edit_chains_conserve_and_pool_stays_non_negative(
        stake in 1i64..=50_000,
        players in 1i64..=200,
        cut in 1i64..=99,
        bonus in any::<bool>(),
        edits in prop::collection::vec(
            (1i64..=50_000, 1i64..=200, 1i64..=99, any::<bool>()),
            1..8,
        ),
    ) {
        let plan = plan_creation(stake, players, cut, bonus).unwrap();
        let p0 = params(stake, players, cut, bonus);
        let mut session = session_with(&plan, &p0);
        let mut pool = plan.bonus_delta;
        let mut wallet_spent = plan.wallet_delta;

        for (s, n, c, b) in edits {
            let p = params(s, n, c, b);
            let plan = plan_update(&session, &p).unwrap();
            prop_assert!(conserved(&plan));
            prop_assert!(plan.prize >= 0, "negative prize: {:?}", plan);
            prop_assert!(plan.bonus_deduction >= 0);

            pool += plan.bonus_delta;
            wallet_spent += plan.wallet_delta;
            prop_assert!(pool >= 0, "pool went negative: {pool}");
            // The pool holds exactly this session's banked deduction.
            prop_assert_eq!(pool, plan.bonus_deduction);
            // Cumulative wallet movement equals the current commission.
            prop_assert_eq!(wallet_spent, plan.system_earnings);

            session = session_with(&plan, &p);
        }
    }
}
