//! Wallet data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// House-admin account identifier.
pub type HouseId = i64;

/// Type alias for money in the smallest currency unit. Settlement math
/// is exact integer arithmetic; there is no floating-point money
/// anywhere in the crate.
pub type Cents = i64;

/// Prepaid credit a house-admin account draws down to cover commissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletBalance {
    pub house_id: HouseId,
    pub package: Cents,
    pub updated_at: DateTime<Utc>,
}

/// Read-only mirror of the house wallet shown to that house's cashiers,
/// refreshed inside every settlement commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashierBalance {
    pub house_id: HouseId,
    pub package: Cents,
    pub updated_at: DateTime<Utc>,
}

/// Per-house dynamic bonus reserve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusPool {
    pub house_id: HouseId,
    pub bonus_amount: Cents,
    pub status: BonusPoolStatus,
    pub updated_at: DateTime<Utc>,
}

/// Bonus pool lifecycle. At most one active pool exists per house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusPoolStatus {
    Active,
    Closed,
}

impl std::fmt::Display for BonusPoolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BonusPoolStatus::Active => write!(f, "active"),
            BonusPoolStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Append-only record of one wallet mutation (audit trail).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAdjustment {
    pub id: i64,
    pub house_id: HouseId,
    pub game_id: Option<i64>,
    pub amount: Cents,
    pub balance_after: Cents,
    pub direction: EntryDirection,
    pub kind: AdjustmentKind,
    pub idempotency_key: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Adjustment direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    Debit,
    Credit,
}

impl std::fmt::Display for EntryDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryDirection::Debit => write!(f, "debit"),
            EntryDirection::Credit => write!(f, "credit"),
        }
    }
}

/// What a wallet adjustment settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// House commission debited on session create or growth edit
    Commission,
    /// Commission refunded on a shrinking edit
    CommissionRefund,
    /// Prize share routed into the bonus pool
    BonusReserve,
    /// Bonus returned from the pool on a shrinking edit
    BonusRelease,
}

impl std::fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdjustmentKind::Commission => write!(f, "commission"),
            AdjustmentKind::CommissionRefund => write!(f, "commission_refund"),
            AdjustmentKind::BonusReserve => write!(f, "bonus_reserve"),
            AdjustmentKind::BonusRelease => write!(f, "bonus_release"),
        }
    }
}

impl std::str::FromStr for EntryDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(EntryDirection::Debit),
            "credit" => Ok(EntryDirection::Credit),
            _ => Err(()),
        }
    }
}

impl std::str::FromStr for AdjustmentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commission" => Ok(AdjustmentKind::Commission),
            "commission_refund" => Ok(AdjustmentKind::CommissionRefund),
            "bonus_reserve" => Ok(AdjustmentKind::BonusReserve),
            "bonus_release" => Ok(AdjustmentKind::BonusRelease),
            _ => Err(()),
        }
    }
}
