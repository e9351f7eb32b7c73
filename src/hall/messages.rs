//! Session actor message types.

use crate::cartela::CardId;
use crate::patterns::{Combinator, PatternKind, WinDecision};
use crate::session::SessionError;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::sync::oneshot;

/// Messages that can be sent to a session actor.
#[derive(Debug)]
pub enum SessionMessage {
    /// Draw one number and persist it
    Draw {
        respond_to: oneshot::Sender<Result<u8, SessionError>>,
    },

    /// Sample undrawn candidates for display; never mutates state
    PreviewShuffle {
        count: usize,
        respond_to: oneshot::Sender<Vec<u8>>,
    },

    /// Begin timed draws at the given cadence
    StartAutoPlay {
        interval: Duration,
        respond_to: oneshot::Sender<Result<(), SessionError>>,
    },

    /// Cancel timed draws; a no-op when none are running
    StopAutoPlay { respond_to: oneshot::Sender<()> },

    /// Check a card against the selected patterns
    EvaluateCard {
        card_id: CardId,
        primary: PatternKind,
        secondary: Option<PatternKind>,
        combinator: Combinator,
        respond_to: oneshot::Sender<Result<WinDecision, SessionError>>,
    },

    /// Replace the participating card set after a settlement edit
    UpdateCartela { cartela: BTreeSet<CardId> },

    /// Shut the actor down
    Close { respond_to: oneshot::Sender<()> },
}
