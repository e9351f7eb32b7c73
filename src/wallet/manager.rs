//! Wallet manager: balance reads plus the in-transaction mutation
//! helpers the settlement store composes into atomic commits.

use super::{
    errors::{WalletError, WalletResult},
    models::{
        AdjustmentKind, BonusPool, BonusPoolStatus, CashierBalance, Cents, EntryDirection, HouseId,
        WalletAdjustment, WalletBalance,
    },
};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::str::FromStr;
use std::sync::Arc;

/// Wallet manager
#[derive(Clone)]
pub struct WalletManager {
    pool: Arc<PgPool>,
}

impl WalletManager {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Current wallet balance for a house-admin account.
    pub async fn get_wallet(&self, house_id: HouseId) -> WalletResult<WalletBalance> {
        let row = sqlx::query(
            r#"
            SELECT house_id, package, updated_at
            FROM wallets
            WHERE house_id = $1
            "#,
        )
        .bind(house_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(WalletError::WalletNotFound(house_id))?;

        Ok(WalletBalance {
            house_id: row.get("house_id"),
            package: row.get("package"),
            updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
        })
    }

    /// The cashier-side mirror of the house wallet.
    pub async fn get_cashier_balance(&self, house_id: HouseId) -> WalletResult<CashierBalance> {
        let row = sqlx::query(
            r#"
            SELECT house_id, package, updated_at
            FROM cashier_balances
            WHERE house_id = $1
            "#,
        )
        .bind(house_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(WalletError::WalletNotFound(house_id))?;

        Ok(CashierBalance {
            house_id: row.get("house_id"),
            package: row.get("package"),
            updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
        })
    }

    /// The house's bonus pool, if any deduction has created it yet.
    pub async fn get_bonus_pool(&self, house_id: HouseId) -> WalletResult<Option<BonusPool>> {
        let row = sqlx::query(
            r#"
            SELECT house_id, bonus_amount, status, updated_at
            FROM bonus_pools
            WHERE house_id = $1 AND status = 'active'
            "#,
        )
        .bind(house_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| BonusPool {
            house_id: r.get("house_id"),
            bonus_amount: r.get("bonus_amount"),
            status: match r.get::<String, _>("status").as_str() {
                "closed" => BonusPoolStatus::Closed,
                _ => BonusPoolStatus::Active,
            },
            updated_at: r.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
        }))
    }

    /// Recent wallet adjustments for a house, newest first.
    pub async fn get_adjustments(
        &self,
        house_id: HouseId,
        limit: i64,
    ) -> WalletResult<Vec<WalletAdjustment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, house_id, game_id, amount, balance_after, direction, kind,
                   idempotency_key, description, created_at
            FROM wallet_adjustments
            WHERE house_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(house_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        let adjustments = rows
            .into_iter()
            .map(|row| WalletAdjustment {
                id: row.get("id"),
                house_id: row.get("house_id"),
                game_id: row.get("game_id"),
                amount: row.get("amount"),
                balance_after: row.get("balance_after"),
                direction: EntryDirection::from_str(&row.get::<String, _>("direction"))
                    .unwrap_or(EntryDirection::Credit),
                kind: AdjustmentKind::from_str(&row.get::<String, _>("kind"))
                    .unwrap_or(AdjustmentKind::Commission),
                idempotency_key: row.get("idempotency_key"),
                description: row.get("description"),
                created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            })
            .collect();

        Ok(adjustments)
    }

    /// Lock the wallet row for the duration of the transaction.
    ///
    /// Every settlement takes this lock first, which serializes all
    /// settlement commits for one house against each other.
    pub(crate) async fn lock_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        house_id: HouseId,
    ) -> WalletResult<Cents> {
        let row = sqlx::query("SELECT package FROM wallets WHERE house_id = $1 FOR UPDATE")
            .bind(house_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(WalletError::WalletNotFound(house_id))?;
        Ok(row.get("package"))
    }

    /// Atomically debit the wallet with a balance check.
    ///
    /// The check and the update are a single statement, so two racing
    /// settlements can never both pass on a stale balance.
    pub(crate) async fn debit_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        house_id: HouseId,
        amount: Cents,
    ) -> WalletResult<Cents> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(amount));
        }

        let result = sqlx::query(
            "UPDATE wallets
             SET package = package - $1, updated_at = NOW()
             WHERE house_id = $2 AND package >= $1
             RETURNING package",
        )
        .bind(amount)
        .bind(house_id)
        .fetch_optional(&mut **tx)
        .await?;

        match result {
            Some(row) => Ok(row.get("package")),
            None => {
                let check = sqlx::query("SELECT package FROM wallets WHERE house_id = $1")
                    .bind(house_id)
                    .fetch_optional(&mut **tx)
                    .await?;

                match check {
                    Some(row) => Err(WalletError::InsufficientBalance {
                        available: row.get("package"),
                        required: amount,
                    }),
                    None => Err(WalletError::WalletNotFound(house_id)),
                }
            }
        }
    }

    /// Credit the wallet with overflow protection.
    pub(crate) async fn credit_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        house_id: HouseId,
        amount: Cents,
    ) -> WalletResult<Cents> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(amount));
        }

        let row = sqlx::query("SELECT package FROM wallets WHERE house_id = $1 FOR UPDATE")
            .bind(house_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(WalletError::WalletNotFound(house_id))?;

        let current: Cents = row.get("package");
        let new_balance = current
            .checked_add(amount)
            .ok_or(WalletError::BalanceOverflow)?;

        sqlx::query("UPDATE wallets SET package = $1, updated_at = NOW() WHERE house_id = $2")
            .bind(new_balance)
            .bind(house_id)
            .execute(&mut **tx)
            .await?;

        Ok(new_balance)
    }

    /// Apply a (possibly negative) delta to the house bonus pool,
    /// creating the pool lazily on first deduction.
    pub(crate) async fn adjust_bonus_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        house_id: HouseId,
        delta: Cents,
    ) -> WalletResult<Cents> {
        let row = sqlx::query(
            "INSERT INTO bonus_pools (house_id, bonus_amount, status, updated_at)
             VALUES ($1, $2, 'active', NOW())
             ON CONFLICT (house_id)
             DO UPDATE SET
                bonus_amount = bonus_pools.bonus_amount + EXCLUDED.bonus_amount,
                updated_at = NOW()
             RETURNING bonus_amount",
        )
        .bind(house_id)
        .bind(delta)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row.get("bonus_amount"))
    }

    /// Refresh the cashier mirror to the wallet's post-commit value.
    pub(crate) async fn mirror_cashier_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        house_id: HouseId,
        package: Cents,
    ) -> WalletResult<()> {
        sqlx::query(
            "INSERT INTO cashier_balances (house_id, package, updated_at)
             VALUES ($1, $2, NOW())
             ON CONFLICT (house_id)
             DO UPDATE SET package = EXCLUDED.package, updated_at = NOW()",
        )
        .bind(house_id)
        .bind(package)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Append one adjustment record (audit ledger).
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn append_adjustment_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        house_id: HouseId,
        game_id: Option<i64>,
        amount: Cents,
        balance_after: Cents,
        direction: EntryDirection,
        kind: AdjustmentKind,
        description: Option<String>,
    ) -> WalletResult<i64> {
        let idempotency_key = uuid::Uuid::new_v4().to_string();
        let row = sqlx::query(
            r#"
            INSERT INTO wallet_adjustments
                (house_id, game_id, amount, balance_after, direction, kind, idempotency_key, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(house_id)
        .bind(game_id)
        .bind(amount)
        .bind(balance_after)
        .bind(direction.to_string())
        .bind(kind.to_string())
        .bind(idempotency_key)
        .bind(description)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row.get("id"))
    }
}
