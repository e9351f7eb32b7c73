//! House wallet, bonus pool, and the append-only adjustment ledger.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{WalletError, WalletResult};
pub use manager::WalletManager;
pub use models::{
    AdjustmentKind, BonusPool, BonusPoolStatus, CashierBalance, Cents, EntryDirection, HouseId,
    WalletAdjustment, WalletBalance,
};
