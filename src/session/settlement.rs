//! Pure settlement arithmetic.
//!
//! All money is integer cents. The prize is always computed as the
//! residual of the total stake after commission and bonus, so
//! `system_earnings + prize + bonus_deduction == total_stake` holds
//! exactly for every plan this module can produce.
//!
//! Edits are settled as deltas against the stored session: only the
//! change in commission moves through the wallet, and the dynamic
//! bonus applies its 5% to the change in gross prize, never to the
//! whole pool again.

use crate::constants::DYNAMIC_BONUS_PERCENT;
use crate::wallet::Cents;

use super::errors::SessionError;
use super::models::{GameSession, SessionParams};

/// The financial effect of one settlement, ready for an atomic commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPlan {
    /// New session totals.
    pub total_stake: Cents,
    pub system_earnings: Cents,
    pub prize: Cents,
    pub bonus_deduction: Cents,
    /// Wallet movement: positive debits the house wallet, negative
    /// refunds it.
    pub wallet_delta: Cents,
    /// Bonus pool movement: positive reserves into the pool, negative
    /// releases from it.
    pub bonus_delta: Cents,
}

fn totals(
    stake_amount: Cents,
    number_of_players: i64,
    cut_percentage: i64,
) -> Result<(Cents, Cents), SessionError> {
    let total_stake = stake_amount
        .checked_mul(number_of_players)
        .ok_or(SessionError::AmountOverflow)?;
    let system_earnings = total_stake
        .checked_mul(cut_percentage)
        .ok_or(SessionError::AmountOverflow)?
        / 100;
    Ok((total_stake, system_earnings))
}

/// Plan a brand-new session settlement.
pub fn plan_creation(
    stake_amount: Cents,
    number_of_players: i64,
    cut_percentage: i64,
    dynamic_bonus: bool,
) -> Result<SettlementPlan, SessionError> {
    let (total_stake, system_earnings) = totals(stake_amount, number_of_players, cut_percentage)?;
    let gross_prize = total_stake - system_earnings;
    let bonus_deduction = if dynamic_bonus {
        gross_prize * DYNAMIC_BONUS_PERCENT / 100
    } else {
        0
    };

    Ok(SettlementPlan {
        total_stake,
        system_earnings,
        prize: gross_prize - bonus_deduction,
        bonus_deduction,
        wallet_delta: system_earnings,
        bonus_delta: bonus_deduction,
    })
}

/// Plan an edit of an unfinished session as a delta settlement.
pub fn plan_update(
    current: &GameSession,
    params: &SessionParams,
) -> Result<SettlementPlan, SessionError> {
    let (total_stake, system_earnings) = totals(
        params.stake_amount,
        params.number_of_players,
        params.cut_percentage,
    )?;

    let old_gross = current.total_stake - current.system_earnings;
    let new_gross = total_stake - system_earnings;

    // The banked deduction can never exceed the gross prize it was
    // cut from, or a shrinking edit would leave a negative prize.
    let bonus_deduction = if params.dynamic_bonus {
        let incremental_bonus = (new_gross - old_gross) * DYNAMIC_BONUS_PERCENT / 100;
        (current.bonus_deduction + incremental_bonus).clamp(0, new_gross)
    } else {
        // Turning the bonus off stops further deductions; what is
        // already banked stays in the pool up to that same cap.
        current.bonus_deduction.min(new_gross)
    };

    Ok(SettlementPlan {
        total_stake,
        system_earnings,
        prize: new_gross - bonus_deduction,
        bonus_deduction,
        wallet_delta: system_earnings - current.system_earnings,
        bonus_delta: bonus_deduction - current.bonus_deduction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn session_from(plan: &SettlementPlan, dynamic_bonus: bool) -> GameSession {
        GameSession {
            house_id: 1,
            game_id: 1,
            stake_amount: 1000,
            number_of_players: 5,
            cut_percentage: 20,
            total_stake: plan.total_stake,
            system_earnings: plan.system_earnings,
            prize: plan.prize,
            bonus_deduction: plan.bonus_deduction,
            dynamic_bonus,
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

    fn assert_conserved(plan: &SettlementPlan) {
        assert_eq!(
            plan.system_earnings + plan.prize + plan.bonus_deduction,
            plan.total_stake,
            "conservation violated: {plan:?}"
        );
    }

    #[test]
    fn creation_without_bonus() {
        let plan = plan_creation(1000, 5, 20, false).unwrap();
        assert_eq!(plan.total_stake, 5000);
        assert_eq!(plan.system_earnings, 1000);
        assert_eq!(plan.prize, 4000);
        assert_eq!(plan.bonus_deduction, 0);
        assert_eq!(plan.wallet_delta, 1000);
        assert_conserved(&plan);
    }

    #[test]
    fn creation_with_bonus() {
        // stake 10.00 x 5 players at 20%: earnings 10.00, bonus 2.00,
        // prize 38.00, the worked example from the cashier handbook.
        let plan = plan_creation(1000, 5, 20, true).unwrap();
        assert_eq!(plan.system_earnings, 1000);
        assert_eq!(plan.bonus_deduction, 200);
        assert_eq!(plan.prize, 3800);
        assert_eq!(plan.bonus_delta, 200);
        assert_conserved(&plan);
    }

    #[test]
    fn player_growth_debits_only_the_delta() {
        let created = plan_creation(1000, 5, 20, false).unwrap();
        let session = session_from(&created, false);
        let plan = plan_update(&session, &params(1000, 7, 20, false)).unwrap();
        assert_eq!(plan.total_stake, 7000);
        assert_eq!(plan.system_earnings, 1400);
        assert_eq!(plan.wallet_delta, 400);
        assert_eq!(plan.prize, 5600);
        assert_conserved(&plan);
    }

    #[test]
    fn player_shrink_refunds_the_delta() {
        let created = plan_creation(1000, 5, 20, false).unwrap();
        let session = session_from(&created, false);
        let plan = plan_update(&session, &params(1000, 3, 20, false)).unwrap();
        assert_eq!(plan.wallet_delta, -400);
        assert_eq!(plan.prize, 2400);
        assert_conserved(&plan);
    }

    #[test]
    fn bonus_applies_only_to_incremental_stake() {
        let created = plan_creation(1000, 5, 20, true).unwrap();
        let session = session_from(&created, true);
        // Growing to 7 players adds 1600 gross prize; the new bonus is
        // the old 200 plus 5% of 1600, not 5% of the whole 5600.
        let plan = plan_update(&session, &params(1000, 7, 20, true)).unwrap();
        assert_eq!(plan.bonus_deduction, 280);
        assert_eq!(plan.bonus_delta, 80);
        assert_eq!(plan.prize, 7000 - 1400 - 280);
        assert_conserved(&plan);
    }

    #[test]
    fn repeated_identical_update_is_stable() {
        let created = plan_creation(1000, 5, 20, true).unwrap();
        let session = session_from(&created, true);
        let plan = plan_update(&session, &params(1000, 5, 20, true)).unwrap();
        assert_eq!(plan.wallet_delta, 0);
        assert_eq!(plan.bonus_delta, 0);
        assert_eq!(plan.bonus_deduction, session.bonus_deduction);
        assert_eq!(plan.prize, session.prize);
        assert_conserved(&plan);
    }

    #[test]
    fn bonus_never_goes_negative_on_shrink() {
        let created = plan_creation(1000, 5, 20, true).unwrap();
        let mut session = session_from(&created, true);
        // Shrink in two steps; the second shrink would push the naive
        // incremental bonus below zero.
        let step1 = plan_update(&session, &params(1000, 2, 20, true)).unwrap();
        assert_conserved(&step1);
        assert!(step1.bonus_deduction >= 0);

        session.total_stake = step1.total_stake;
        session.system_earnings = step1.system_earnings;
        session.prize = step1.prize;
        session.bonus_deduction = step1.bonus_deduction;
        session.number_of_players = 2;

        let step2 = plan_update(&session, &params(100, 1, 20, true)).unwrap();
        assert_conserved(&step2);
        assert!(step2.bonus_deduction >= 0);

        // The pool saw +200, then the two releases; it ends exactly at
        // the session's final deduction and never below zero.
        let pool = 200 + step1.bonus_delta + step2.bonus_delta;
        assert_eq!(pool, step2.bonus_deduction);
        assert!(pool >= 0);
    }

    #[test]
    fn shrink_below_banked_bonus_caps_at_gross() {
        // Truncation on successive shrinks can leave more bonus banked
        // than the shrunken gross prize; the cap releases the excess
        // instead of producing a negative prize.
        let created = plan_creation(125, 20, 20, true).unwrap();
        assert_eq!(created.bonus_deduction, 100);
        let mut session = session_from(&created, true);

        for (stake, expect_gross) in [(51, 41), (27, 22), (1, 1)] {
            let plan = plan_update(&session, &params(stake, 1, 20, true)).unwrap();
            assert_eq!(plan.total_stake - plan.system_earnings, expect_gross);
            assert!(plan.prize >= 0, "negative prize: {plan:?}");
            assert!(plan.bonus_deduction <= expect_gross);
            assert_conserved(&plan);

            session.stake_amount = stake;
            session.number_of_players = 1;
            session.total_stake = plan.total_stake;
            session.system_earnings = plan.system_earnings;
            session.prize = plan.prize;
            session.bonus_deduction = plan.bonus_deduction;
        }
        assert_eq!(session.bonus_deduction, 1);
        assert_eq!(session.prize, 0);
    }

    #[test]
    fn disabling_bonus_keeps_banked_deduction() {
        let created = plan_creation(1000, 5, 20, true).unwrap();
        let session = session_from(&created, true);
        let plan = plan_update(&session, &params(1000, 7, 20, false)).unwrap();
        assert_eq!(plan.bonus_deduction, 200);
        assert_eq!(plan.bonus_delta, 0);
        assert_conserved(&plan);
    }

    #[test]
    fn truncating_cut_still_conserves() {
        // 3 players x 9.99 at 33%: earnings floor to 989 cents.
        let plan = plan_creation(999, 3, 33, true).unwrap();
        assert_eq!(plan.total_stake, 2997);
        assert_eq!(plan.system_earnings, 989);
        assert_conserved(&plan);
    }

    #[test]
    fn overflow_is_rejected() {
        assert!(matches!(
            plan_creation(i64::MAX / 2, 3, 20, false),
            Err(SessionError::AmountOverflow)
        ));
    }
}
