//! Wallet error types.

use super::models::{Cents, HouseId};
use thiserror::Error;

/// Wallet errors
#[derive(Debug, Error)]
pub enum WalletError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Insufficient balance
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Cents, required: Cents },

    /// Wallet not found
    #[error("Wallet not found for house {0}")]
    WalletNotFound(HouseId),

    /// Balance arithmetic overflowed
    #[error("Balance overflow")]
    BalanceOverflow,

    /// Amount must be positive
    #[error("Invalid amount: {0}")]
    InvalidAmount(Cents),
}

impl WalletError {
    /// Client-safe message that does not leak internal structure.
    pub fn client_message(&self) -> String {
        match self {
            WalletError::Database(_) => "Internal server error".to_string(),
            WalletError::WalletNotFound(_) => "Wallet not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
