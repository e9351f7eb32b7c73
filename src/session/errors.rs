//! Session ledger error types.

use crate::cartela::CardId;
use crate::db::TimeoutError;
use crate::draw::DrawError;
use crate::patterns::PatternError;
use crate::wallet::{Cents, HouseId, WalletError};
use std::time::Duration;
use thiserror::Error;

use super::models::GameId;

/// Session ledger errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Stake must be positive
    #[error("Invalid stake amount: {0}")]
    InvalidStake(Cents),

    /// Player count must be positive
    #[error("Invalid player count: {0}")]
    InvalidPlayerCount(i64),

    /// Cut percentage must be strictly between 0 and 100
    #[error("Cut percentage {0} is outside (0, 100)")]
    InvalidCutPercentage(i64),

    /// Card is not in the hall's card book
    #[error("Card {0} is not in the hall's card book")]
    UnknownCard(CardId),

    /// Card is not part of the session's cartela
    #[error("Card {card_id} is not participating in game {game_id}")]
    CardNotInSession { card_id: CardId, game_id: GameId },

    /// Stake arithmetic overflowed the currency type
    #[error("Stake arithmetic overflowed")]
    AmountOverflow,

    /// Wallet cannot cover the commission
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Cents, required: Cents },

    /// No wallet exists for the house
    #[error("Wallet not found for house {0}")]
    WalletNotFound(HouseId),

    /// Session is terminal; a fresh game id is required
    #[error("Game {0} is finished and can no longer be settled")]
    SessionFinished(GameId),

    /// No such session
    #[error("Game {0} not found")]
    SessionNotFound(GameId),

    /// Transaction lost a race; the whole operation may be retried
    #[error("Concurrent modification, retry the operation")]
    ConcurrentModification,

    /// Persistence commit exceeded its bounded timeout
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Draw engine error
    #[error(transparent)]
    Draw(#[from] DrawError),

    /// Pattern catalog/matcher error
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The live session's mailbox is gone
    #[error("Session is no longer live")]
    SessionClosed,
}

impl SessionError {
    /// Client-safe message that does not leak internal structure.
    pub fn client_message(&self) -> String {
        match self {
            SessionError::Database(_) => "Internal server error".to_string(),
            SessionError::WalletNotFound(_) => "Wallet not found".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether retrying the identical call can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::ConcurrentModification | SessionError::Timeout(_)
        )
    }
}

impl From<WalletError> for SessionError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::InsufficientBalance {
                available,
                required,
            } => SessionError::InsufficientBalance {
                available,
                required,
            },
            WalletError::WalletNotFound(house_id) => SessionError::WalletNotFound(house_id),
            WalletError::Database(e) => SessionError::Database(e),
            WalletError::BalanceOverflow | WalletError::InvalidAmount(_) => {
                SessionError::AmountOverflow
            }
        }
    }
}

impl From<TimeoutError> for SessionError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => SessionError::Timeout(duration),
            TimeoutError::Database(e) => SessionError::Database(e),
        }
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
