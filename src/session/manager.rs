//! Session ledger manager: validation, idempotence, and delta
//! settlement on top of a [`SettlementStore`].

use crate::cartela::{CardId, CartelaRegistry};
use crate::wallet::HouseId;
use std::sync::Arc;

use super::errors::SessionError;
use super::models::{GameId, GameSession, SessionParams};
use super::settlement::{plan_creation, plan_update};
use super::store::SettlementStore;

/// The settlement engine.
///
/// All monetary movement for a session goes through
/// [`create_or_update`](Self::create_or_update); the store commits each
/// plan atomically, so a failure anywhere leaves wallet, pool, and
/// session exactly as they were.
pub struct SessionManager<S: SettlementStore> {
    store: Arc<S>,
    registry: Arc<CartelaRegistry>,
}

impl<S: SettlementStore> Clone for SessionManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<S: SettlementStore> SessionManager<S> {
    pub fn new(store: Arc<S>, registry: Arc<CartelaRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<CartelaRegistry> {
        &self.registry
    }

    /// Create a session or settle an edit of an unfinished one.
    ///
    /// A repeat call with identical parameters returns the stored
    /// session and moves no money, so cashier retries are always safe.
    pub async fn create_or_update(
        &self,
        params: SessionParams,
    ) -> Result<GameSession, SessionError> {
        params.validate()?;
        for &card_id in &params.cartela {
            if !self.registry.contains(card_id) {
                return Err(SessionError::UnknownCard(card_id));
            }
        }

        let existing = match params.game_id {
            Some(game_id) => match self.store.fetch(params.house_id, game_id).await {
                Ok(session) if session.finished => {
                    return Err(SessionError::SessionFinished(game_id));
                }
                Ok(session) => Some(session),
                Err(SessionError::SessionNotFound(_)) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        if let Some(session) = &existing {
            if params.matches(session) {
                log::debug!(
                    "game {}/{} resettled with identical parameters, no-op",
                    session.house_id,
                    session.game_id
                );
                return Ok(session.clone());
            }
        }

        let plan = match &existing {
            Some(session) => plan_update(session, &params)?,
            None => plan_creation(
                params.stake_amount,
                params.number_of_players,
                params.cut_percentage,
                params.dynamic_bonus,
            )?,
        };

        let session = self
            .store
            .commit_settlement(&params, existing.as_ref(), &plan)
            .await?;

        debug_assert!(session.conserves_total_stake());
        log::info!(
            "settled game {}/{}: stake {} x {} players, earnings {}, prize {}, bonus {}",
            session.house_id,
            session.game_id,
            session.stake_amount,
            session.number_of_players,
            session.system_earnings,
            session.prize,
            session.bonus_deduction
        );
        Ok(session)
    }

    /// Record the winning card and make the session terminal.
    pub async fn record_winner(
        &self,
        house_id: HouseId,
        game_id: GameId,
        winner_card_id: CardId,
    ) -> Result<GameSession, SessionError> {
        let session = self.store.fetch(house_id, game_id).await?;
        if session.finished {
            return Err(SessionError::SessionFinished(game_id));
        }
        if !session.cartela.contains(&winner_card_id) {
            return Err(SessionError::CardNotInSession {
                card_id: winner_card_id,
                game_id,
            });
        }

        let finished = self
            .store
            .record_winner(house_id, game_id, winner_card_id)
            .await?;
        log::info!(
            "game {house_id}/{game_id} finished, winner card {winner_card_id}"
        );
        Ok(finished)
    }

    /// Load a session regardless of state.
    pub async fn fetch(
        &self,
        house_id: HouseId,
        game_id: GameId,
    ) -> Result<GameSession, SessionError> {
        self.store.fetch(house_id, game_id).await
    }

    /// Load the unfinished session for an id, if any.
    pub async fn find_unfinished(
        &self,
        house_id: HouseId,
        game_id: GameId,
    ) -> Result<Option<GameSession>, SessionError> {
        self.store.find_unfinished(house_id, game_id).await
    }

    /// Administrative deletion; gameplay never destroys a session.
    pub async fn delete_session(
        &self,
        house_id: HouseId,
        game_id: GameId,
    ) -> Result<(), SessionError> {
        self.store.delete_session(house_id, game_id).await?;
        log::warn!("game {house_id}/{game_id} deleted by administrator");
        Ok(())
    }
}
