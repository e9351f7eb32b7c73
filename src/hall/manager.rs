//! Hall manager: spawns session actors and routes the conceptual API.

use crate::cartela::{CardId, CartelaRegistry};
use crate::patterns::{Combinator, PatternCatalog, PatternKind, WinDecision};
use crate::session::{
    GameId, GameSession, SessionError, SessionManager, SessionParams, SettlementStore,
};
use crate::wallet::HouseId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, oneshot};

use super::actor::{SessionActor, SessionHandle};
use super::config::HallConfig;
use super::messages::SessionMessage;

type SessionKey = (HouseId, GameId);

/// Facade over the session ledger and the live-session actors.
///
/// Collaborators (transport layers, back-office tools) talk to this
/// type only; it owns the actor registry and guarantees one actor per
/// open session.
pub struct HallManager<S: SettlementStore> {
    sessions: SessionManager<S>,
    registry: Arc<CartelaRegistry>,
    catalog: Arc<PatternCatalog>,
    config: HallConfig,
    live: Arc<RwLock<HashMap<SessionKey, SessionHandle>>>,
}

impl<S: SettlementStore + 'static> HallManager<S> {
    pub fn new(
        store: Arc<S>,
        registry: Arc<CartelaRegistry>,
        catalog: Arc<PatternCatalog>,
        config: HallConfig,
    ) -> Self {
        Self {
            sessions: SessionManager::new(store, registry.clone()),
            registry,
            catalog,
            config,
            live: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn session_manager(&self) -> &SessionManager<S> {
        &self.sessions
    }

    /// Create or edit a session and make sure an actor is live for it.
    pub async fn open_session(&self, params: SessionParams) -> Result<GameSession, SessionError> {
        let session = self.sessions.create_or_update(params).await?;
        let key = (session.house_id, session.game_id);

        let mut live = self.live.write().await;
        if let Some(handle) = live.get(&key) {
            // An edit may have changed the participating cards.
            if handle
                .send(SessionMessage::UpdateCartela {
                    cartela: session.cartela.clone(),
                })
                .await
                .is_err()
            {
                live.remove(&key);
            }
        }
        if !live.contains_key(&key) {
            let handle = self.spawn_actor(&session)?;
            live.insert(key, handle);
        }

        Ok(session)
    }

    /// Draw one number for a session.
    pub async fn draw(&self, house_id: HouseId, game_id: GameId) -> Result<u8, SessionError> {
        let handle = self.handle_for(house_id, game_id).await?;
        let (tx, rx) = oneshot::channel();
        handle.send(SessionMessage::Draw { respond_to: tx }).await?;
        rx.await.map_err(|_| SessionError::SessionClosed)?
    }

    /// Sample undrawn candidates for display without mutating state.
    pub async fn preview_shuffle(
        &self,
        house_id: HouseId,
        game_id: GameId,
    ) -> Result<Vec<u8>, SessionError> {
        let handle = self.handle_for(house_id, game_id).await?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(SessionMessage::PreviewShuffle {
                count: self.config.preview_sample,
                respond_to: tx,
            })
            .await?;
        rx.await.map_err(|_| SessionError::SessionClosed)
    }

    /// Start timed draws; `interval` falls back to the configured
    /// cadence.
    pub async fn start_auto_play(
        &self,
        house_id: HouseId,
        game_id: GameId,
        interval: Option<Duration>,
    ) -> Result<(), SessionError> {
        let handle = self.handle_for(house_id, game_id).await?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(SessionMessage::StartAutoPlay {
                interval: interval.unwrap_or(self.config.auto_play_interval),
                respond_to: tx,
            })
            .await?;
        rx.await.map_err(|_| SessionError::SessionClosed)?
    }

    /// Cancel timed draws. Idempotent: succeeds even when auto-play is
    /// not running or the session is no longer live.
    pub async fn stop_auto_play(
        &self,
        house_id: HouseId,
        game_id: GameId,
    ) -> Result<(), SessionError> {
        let maybe = self.live.read().await.get(&(house_id, game_id)).cloned();
        let Some(handle) = maybe else {
            return Ok(());
        };
        let (tx, rx) = oneshot::channel();
        if handle
            .send(SessionMessage::StopAutoPlay { respond_to: tx })
            .await
            .is_err()
        {
            return Ok(());
        }
        let _ = rx.await;
        Ok(())
    }

    /// Check one card against the selected patterns over the numbers
    /// drawn so far.
    pub async fn evaluate_card(
        &self,
        house_id: HouseId,
        game_id: GameId,
        card_id: CardId,
        primary: PatternKind,
        secondary: Option<PatternKind>,
        combinator: Combinator,
    ) -> Result<WinDecision, SessionError> {
        let handle = self.handle_for(house_id, game_id).await?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(SessionMessage::EvaluateCard {
                card_id,
                primary,
                secondary,
                combinator,
                respond_to: tx,
            })
            .await?;
        rx.await.map_err(|_| SessionError::SessionClosed)?
    }

    /// Record the winner, finish the session, and retire its actor.
    pub async fn record_winner(
        &self,
        house_id: HouseId,
        game_id: GameId,
        winner_card_id: CardId,
    ) -> Result<GameSession, SessionError> {
        let finished = self
            .sessions
            .record_winner(house_id, game_id, winner_card_id)
            .await?;
        self.retire_actor(house_id, game_id).await;
        Ok(finished)
    }

    /// Retire the live actor without touching the persisted session.
    pub async fn close_session(&self, house_id: HouseId, game_id: GameId) {
        self.retire_actor(house_id, game_id).await;
    }

    /// Administrative removal of a session and its actor.
    pub async fn delete_session(
        &self,
        house_id: HouseId,
        game_id: GameId,
    ) -> Result<(), SessionError> {
        self.retire_actor(house_id, game_id).await;
        self.sessions.delete_session(house_id, game_id).await
    }

    /// Handle for a live session, attaching to a persisted unfinished
    /// session when no actor is running yet (e.g. after a restart).
    async fn handle_for(
        &self,
        house_id: HouseId,
        game_id: GameId,
    ) -> Result<SessionHandle, SessionError> {
        let key = (house_id, game_id);
        if let Some(handle) = self.live.read().await.get(&key) {
            return Ok(handle.clone());
        }

        let session = self.sessions.fetch(house_id, game_id).await?;
        if session.finished {
            return Err(SessionError::SessionFinished(game_id));
        }

        let mut live = self.live.write().await;
        if let Some(handle) = live.get(&key) {
            return Ok(handle.clone());
        }
        let handle = self.spawn_actor(&session)?;
        live.insert(key, handle.clone());
        Ok(handle)
    }

    fn spawn_actor(&self, session: &GameSession) -> Result<SessionHandle, SessionError> {
        let (actor, handle) = SessionActor::new(
            session,
            self.sessions.store().clone(),
            self.registry.clone(),
            self.catalog.clone(),
            &self.config,
        )?;
        tokio::spawn(actor.run());
        Ok(handle)
    }

    async fn retire_actor(&self, house_id: HouseId, game_id: GameId) {
        let handle = self.live.write().await.remove(&(house_id, game_id));
        if let Some(handle) = handle {
            let (tx, rx) = oneshot::channel();
            if handle
                .send(SessionMessage::Close { respond_to: tx })
                .await
                .is_ok()
            {
                let _ = rx.await;
            }
        }
    }
}
