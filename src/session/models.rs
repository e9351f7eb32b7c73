//! Game session data models.

use crate::cartela::CardId;
use crate::wallet::{Cents, HouseId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::errors::SessionError;

/// Per-house monotonically increasing game number.
pub type GameId = i64;

/// One bingo game session, owned by the ledger. Settlement fields are
/// only ever written through ledger operations; `finished` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub house_id: HouseId,
    pub game_id: GameId,
    pub stake_amount: Cents,
    pub number_of_players: i64,
    pub cut_percentage: i64,
    pub total_stake: Cents,
    pub system_earnings: Cents,
    pub prize: Cents,
    pub bonus_deduction: Cents,
    pub dynamic_bonus: bool,
    pub cartela: BTreeSet<CardId>,
    pub drawn_numbers: Vec<u8>,
    pub winner_card_id: Option<CardId>,
    pub finished: bool,
    pub started_at: DateTime<Utc>,
}

impl GameSession {
    /// The settlement conservation check: commission, prize, and bonus
    /// always add back up to the total stake, to the cent.
    pub fn conserves_total_stake(&self) -> bool {
        self.system_earnings + self.prize + self.bonus_deduction == self.total_stake
    }
}

/// Caller-supplied parameters for `create_or_update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    pub house_id: HouseId,
    /// `None` asks the store to allocate the next game number.
    pub game_id: Option<GameId>,
    pub stake_amount: Cents,
    pub number_of_players: i64,
    pub cut_percentage: i64,
    pub cartela: BTreeSet<CardId>,
    pub dynamic_bonus: bool,
}

impl SessionParams {
    /// Reject invalid parameters before any mutation happens.
    pub(crate) fn validate(&self) -> Result<(), SessionError> {
        if self.stake_amount <= 0 {
            return Err(SessionError::InvalidStake(self.stake_amount));
        }
        if self.number_of_players <= 0 {
            return Err(SessionError::InvalidPlayerCount(self.number_of_players));
        }
        if self.cut_percentage <= 0 || self.cut_percentage >= 100 {
            return Err(SessionError::InvalidCutPercentage(self.cut_percentage));
        }
        Ok(())
    }

    /// True when a repeat call carries nothing new; such calls must be
    /// side-effect free.
    pub(crate) fn matches(&self, session: &GameSession) -> bool {
        self.stake_amount == session.stake_amount
            && self.number_of_players == session.number_of_players
            && self.cut_percentage == session.cut_percentage
            && self.cartela == session.cartela
            && self.dynamic_bonus == session.dynamic_bonus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SessionParams {
        SessionParams {
            house_id: 1,
            game_id: None,
            stake_amount: 1000,
            number_of_players: 5,
            cut_percentage: 20,
            cartela: BTreeSet::from([1, 2, 3]),
            dynamic_bonus: false,
        }
    }

    #[test]
    fn session_round_trips_through_json() {
        let session = GameSession {
            house_id: 1,
            game_id: 4,
            stake_amount: 1000,
            number_of_players: 5,
            cut_percentage: 20,
            total_stake: 5000,
            system_earnings: 1000,
            prize: 3800,
            bonus_deduction: 200,
            dynamic_bonus: true,
            cartela: BTreeSet::from([3, 7]),
            drawn_numbers: vec![12, 71, 4],
            winner_card_id: None,
            finished: false,
            started_at: Utc::now(),
        };
        let json = serde_json::to_string(&session).unwrap();
        let back: GameSession = serde_json::from_str(&json).unwrap();
        assert_eq!(session, back);
    }

    #[test]
    fn validates_stake() {
        let mut p = params();
        p.stake_amount = 0;
        assert!(matches!(p.validate(), Err(SessionError::InvalidStake(0))));
    }

    #[test]
    fn validates_players() {
        let mut p = params();
        p.number_of_players = -2;
        assert!(matches!(
            p.validate(),
            Err(SessionError::InvalidPlayerCount(-2))
        ));
    }

    #[test]
    fn validates_cut_bounds_exclusive() {
        for cut in [0, 100, 120, -5] {
            let mut p = params();
            p.cut_percentage = cut;
            assert!(
                matches!(p.validate(), Err(SessionError::InvalidCutPercentage(c)) if c == cut)
            );
        }
        let mut p = params();
        p.cut_percentage = 1;
        assert!(p.validate().is_ok());
        p.cut_percentage = 99;
        assert!(p.validate().is_ok());
    }
}
