//! Session actor: the single writer for one session's draws.
//!
//! All draw traffic goes through the actor's mailbox, so the complement
//! set is never read-modified-written by two callers at once. The
//! auto-play timer lives inside the actor loop; stopping it is a flag
//! flip, so a stop racing an in-flight draw lets that draw finish and
//! guarantees nothing further is scheduled.

use crate::cartela::{CardId, CartelaRegistry};
use crate::draw::{DrawEngine, DrawError};
use crate::patterns::{Combinator, PatternCatalog, PatternKind, WinDecision, is_winner};
use crate::session::{GameId, GameSession, SessionError, SettlementStore};
use crate::wallet::HouseId;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, interval_at};

use super::config::HallConfig;
use super::messages::SessionMessage;

/// Handle for sending messages to a live session.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    house_id: HouseId,
    game_id: GameId,
}

impl SessionHandle {
    pub fn house_id(&self) -> HouseId {
        self.house_id
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Send a message to the session actor.
    pub async fn send(&self, message: SessionMessage) -> Result<(), SessionError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::SessionClosed)
    }
}

/// Actor owning one live session's draw state.
pub struct SessionActor<S: SettlementStore> {
    house_id: HouseId,
    game_id: GameId,
    engine: DrawEngine,
    cartela: BTreeSet<CardId>,
    store: Arc<S>,
    registry: Arc<CartelaRegistry>,
    catalog: Arc<PatternCatalog>,
    inbox: mpsc::Receiver<SessionMessage>,
    auto_play: Option<Interval>,
    is_closed: bool,
}

impl<S: SettlementStore> SessionActor<S> {
    /// Build an actor for a persisted session, resuming its draw
    /// sequence.
    pub fn new(
        session: &GameSession,
        store: Arc<S>,
        registry: Arc<CartelaRegistry>,
        catalog: Arc<PatternCatalog>,
        config: &HallConfig,
    ) -> Result<(Self, SessionHandle), SessionError> {
        let engine = DrawEngine::resume(&session.drawn_numbers)?;
        let (sender, inbox) = mpsc::channel(config.mailbox_capacity);

        let actor = Self {
            house_id: session.house_id,
            game_id: session.game_id,
            engine,
            cartela: session.cartela.clone(),
            store,
            registry,
            catalog,
            inbox,
            auto_play: None,
            is_closed: false,
        };
        let handle = SessionHandle {
            sender,
            house_id: session.house_id,
            game_id: session.game_id,
        };
        Ok((actor, handle))
    }

    /// Run the session actor event loop.
    pub async fn run(mut self) {
        log::info!(
            "session {}/{} live, {} numbers drawn",
            self.house_id,
            self.game_id,
            self.engine.sequence().len()
        );

        loop {
            tokio::select! {
                maybe = self.inbox.recv() => {
                    match maybe {
                        Some(message) => {
                            self.handle_message(message).await;
                            if self.is_closed {
                                break;
                            }
                        }
                        None => break,
                    }
                }

                _ = tick(self.auto_play.as_mut()) => {
                    self.auto_draw().await;
                }
            }
        }

        log::info!("session {}/{} closed", self.house_id, self.game_id);
    }

    async fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Draw { respond_to } => {
                let result = self.draw_once().await;
                let _ = respond_to.send(result);
            }

            SessionMessage::PreviewShuffle { count, respond_to } => {
                let _ = respond_to.send(self.engine.preview_shuffle(count));
            }

            SessionMessage::StartAutoPlay {
                interval,
                respond_to,
            } => {
                let _ = respond_to.send(self.start_auto_play(interval));
            }

            SessionMessage::StopAutoPlay { respond_to } => {
                // Idempotent: stopping an already-stopped timer is fine.
                self.auto_play = None;
                let _ = respond_to.send(());
            }

            SessionMessage::EvaluateCard {
                card_id,
                primary,
                secondary,
                combinator,
                respond_to,
            } => {
                let _ = respond_to.send(self.evaluate_card(card_id, primary, secondary, combinator));
            }

            SessionMessage::UpdateCartela { cartela } => {
                self.cartela = cartela;
            }

            SessionMessage::Close { respond_to } => {
                self.auto_play = None;
                self.is_closed = true;
                let _ = respond_to.send(());
            }
        }
    }

    fn start_auto_play(&mut self, period: Duration) -> Result<(), SessionError> {
        if self.engine.remaining() == 0 {
            return Err(DrawError::ExhaustedPool.into());
        }
        // First tick lands one period from now, not immediately.
        self.auto_play = Some(interval_at(Instant::now() + period, period));
        log::info!(
            "session {}/{} auto-play every {period:?}",
            self.house_id,
            self.game_id
        );
        Ok(())
    }

    /// Draw one number and persist it, undoing the in-memory draw when
    /// the store refuses so both views stay identical.
    async fn draw_once(&mut self) -> Result<u8, SessionError> {
        let number = self.engine.draw()?;
        match self
            .store
            .append_drawn(self.house_id, self.game_id, number)
            .await
        {
            Ok(()) => {
                log::debug!(
                    "session {}/{} drew {number} ({} remaining)",
                    self.house_id,
                    self.game_id,
                    self.engine.remaining()
                );
                Ok(number)
            }
            Err(e) => {
                self.engine.retract(number);
                Err(e)
            }
        }
    }

    async fn auto_draw(&mut self) {
        match self.draw_once().await {
            Ok(_) => {}
            Err(SessionError::Draw(DrawError::ExhaustedPool)) => {
                log::info!(
                    "session {}/{} exhausted the pool, auto-play stopped",
                    self.house_id,
                    self.game_id
                );
                self.auto_play = None;
            }
            Err(SessionError::SessionFinished(_)) => {
                self.auto_play = None;
            }
            Err(e) => {
                // Transient persistence failure; keep the cadence and
                // let the next tick retry.
                log::warn!(
                    "session {}/{} auto-play draw failed: {e}",
                    self.house_id,
                    self.game_id
                );
            }
        }
    }

    fn evaluate_card(
        &self,
        card_id: CardId,
        primary: PatternKind,
        secondary: Option<PatternKind>,
        combinator: Combinator,
    ) -> Result<WinDecision, SessionError> {
        if !self.cartela.contains(&card_id) {
            return Err(SessionError::CardNotInSession {
                card_id,
                game_id: self.game_id,
            });
        }
        let card = self
            .registry
            .get(card_id)
            .ok_or(SessionError::UnknownCard(card_id))?;
        let decision = is_winner(
            card,
            self.engine.drawn_set(),
            &self.catalog,
            primary,
            secondary,
            combinator,
        )?;
        Ok(decision)
    }
}

/// Resolve to the next auto-play tick, or never when auto-play is off.
async fn tick(auto_play: Option<&mut Interval>) {
    match auto_play {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
