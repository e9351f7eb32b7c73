//! Settlement persistence: trait, PostgreSQL implementation, and an
//! in-memory implementation for tests and local development.
//!
//! Every commit is all-or-nothing across the session, the house
//! wallet, the bonus pool, the cashier mirror, and the adjustment
//! ledger. The Postgres store serializes settlements per house by
//! taking the wallet row lock first; the in-memory store serializes
//! through a single mutex.

use crate::cartela::CardId;
use crate::constants::POOL_SIZE;
use crate::db::timeouts::{DEFAULT_QUERY_TIMEOUT, DEFAULT_TRANSACTION_TIMEOUT, with_timeout};
use crate::wallet::{AdjustmentKind, Cents, EntryDirection, HouseId, WalletManager};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use super::errors::SessionError;
use super::models::{GameId, GameSession, SessionParams};
use super::settlement::SettlementPlan;

/// Storage contract for the session ledger.
#[async_trait]
pub trait SettlementStore: Send + Sync {
    /// Load a session, finished or not.
    async fn fetch(&self, house_id: HouseId, game_id: GameId) -> Result<GameSession, SessionError>;

    /// Load the unfinished session for an id, if any.
    async fn find_unfinished(
        &self,
        house_id: HouseId,
        game_id: GameId,
    ) -> Result<Option<GameSession>, SessionError>;

    /// Atomically apply one settlement plan: session upsert, wallet
    /// movement, bonus pool movement, cashier mirror, adjustments.
    /// `existing` is the snapshot the plan was computed against; a
    /// store that finds different numbers must fail with
    /// [`SessionError::ConcurrentModification`] instead of applying a
    /// stale delta.
    async fn commit_settlement(
        &self,
        params: &SessionParams,
        existing: Option<&GameSession>,
        plan: &SettlementPlan,
    ) -> Result<GameSession, SessionError>;

    /// Mark the winner and flip the session terminal.
    async fn record_winner(
        &self,
        house_id: HouseId,
        game_id: GameId,
        winner_card_id: CardId,
    ) -> Result<GameSession, SessionError>;

    /// Append one drawn number to an unfinished session.
    async fn append_drawn(
        &self,
        house_id: HouseId,
        game_id: GameId,
        number: u8,
    ) -> Result<(), SessionError>;

    /// Administrative removal; the only way a session is destroyed.
    async fn delete_session(&self, house_id: HouseId, game_id: GameId)
    -> Result<(), SessionError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL implementation
// ---------------------------------------------------------------------------

/// Postgres-backed settlement store.
pub struct PgSettlementStore {
    pool: Arc<PgPool>,
    wallet: WalletManager,
    commit_timeout: Duration,
}

impl PgSettlementStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            wallet: WalletManager::new(pool.clone()),
            pool,
            commit_timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }

    pub fn with_commit_timeout(mut self, commit_timeout: Duration) -> Self {
        self.commit_timeout = commit_timeout;
        self
    }

    pub fn wallet_manager(&self) -> &WalletManager {
        &self.wallet
    }

    async fn commit_inner(
        &self,
        params: &SessionParams,
        existing: Option<&GameSession>,
        plan: &SettlementPlan,
    ) -> Result<GameSession, SessionError> {
        let house_id = params.house_id;
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        // The wallet row lock serializes all settlements for a house,
        // including ones that end up moving no money.
        let locked_package = self.wallet.lock_wallet(&mut tx, house_id).await?;

        let new_package = if plan.wallet_delta > 0 {
            let package = self
                .wallet
                .debit_in_tx(&mut tx, house_id, plan.wallet_delta)
                .await?;
            Some((package, EntryDirection::Debit, AdjustmentKind::Commission))
        } else if plan.wallet_delta < 0 {
            let package = self
                .wallet
                .credit_in_tx(&mut tx, house_id, -plan.wallet_delta)
                .await?;
            Some((
                package,
                EntryDirection::Credit,
                AdjustmentKind::CommissionRefund,
            ))
        } else {
            None
        };

        let session = match existing {
            None => self.insert_session(&mut tx, params, plan).await?,
            Some(previous) => self.update_session(&mut tx, previous, params, plan).await?,
        };

        if let Some((package, direction, kind)) = new_package {
            self.wallet
                .append_adjustment_in_tx(
                    &mut tx,
                    house_id,
                    Some(session.game_id),
                    plan.wallet_delta.abs(),
                    package,
                    direction,
                    kind,
                    Some(format!("Game {} settlement", session.game_id)),
                )
                .await?;
        }

        if plan.bonus_delta != 0 {
            let pool_amount = self
                .wallet
                .adjust_bonus_in_tx(&mut tx, house_id, plan.bonus_delta)
                .await?;
            let (direction, kind) = if plan.bonus_delta > 0 {
                (EntryDirection::Credit, AdjustmentKind::BonusReserve)
            } else {
                (EntryDirection::Debit, AdjustmentKind::BonusRelease)
            };
            self.wallet
                .append_adjustment_in_tx(
                    &mut tx,
                    house_id,
                    Some(session.game_id),
                    plan.bonus_delta.abs(),
                    pool_amount,
                    direction,
                    kind,
                    Some(format!("Game {} dynamic bonus", session.game_id)),
                )
                .await?;
        }

        let mirrored = new_package.map_or(locked_package, |(package, _, _)| package);
        self.wallet
            .mirror_cashier_in_tx(&mut tx, house_id, mirrored)
            .await?;

        tx.commit().await.map_err(map_sqlx)?;
        Ok(session)
    }

    async fn insert_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        params: &SessionParams,
        plan: &SettlementPlan,
    ) -> Result<GameSession, SessionError> {
        let game_id = match params.game_id {
            Some(id) => id,
            None => {
                // Safe under the wallet lock: all allocators for this
                // house are serialized.
                let row = sqlx::query(
                    "SELECT COALESCE(MAX(game_id), 0) + 1 AS next_id
                     FROM game_sessions WHERE house_id = $1",
                )
                .bind(params.house_id)
                .fetch_one(&mut **tx)
                .await
                .map_err(map_sqlx)?;
                row.get("next_id")
            }
        };

        let cartela: Vec<i64> = params.cartela.iter().copied().collect();
        let row = sqlx::query(
            r#"
            INSERT INTO game_sessions
                (house_id, game_id, stake_amount, number_of_players, cut_percentage,
                 total_stake, system_earnings, prize, bonus_deduction, dynamic_bonus,
                 cartela, drawn_numbers, winner_card_id, finished, started_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, '{}', NULL, FALSE, $12)
            ON CONFLICT (house_id, game_id) DO NOTHING
            RETURNING house_id, game_id, stake_amount, number_of_players, cut_percentage,
                      total_stake, system_earnings, prize, bonus_deduction, dynamic_bonus,
                      cartela, drawn_numbers, winner_card_id, finished, started_at
            "#,
        )
        .bind(params.house_id)
        .bind(game_id)
        .bind(params.stake_amount)
        .bind(params.number_of_players)
        .bind(params.cut_percentage)
        .bind(plan.total_stake)
        .bind(plan.system_earnings)
        .bind(plan.prize)
        .bind(plan.bonus_deduction)
        .bind(params.dynamic_bonus)
        .bind(&cartela)
        .bind(Utc::now().naive_utc())
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx)?;

        // Another cashier created this id between our check and commit.
        row.map(session_from_row)
            .transpose()?
            .ok_or(SessionError::ConcurrentModification)
    }

    async fn update_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        previous: &GameSession,
        params: &SessionParams,
        plan: &SettlementPlan,
    ) -> Result<GameSession, SessionError> {
        let cartela: Vec<i64> = params.cartela.iter().copied().collect();
        let row = sqlx::query(
            r#"
            UPDATE game_sessions
            SET stake_amount = $3, number_of_players = $4, cut_percentage = $5,
                total_stake = $6, system_earnings = $7, prize = $8,
                bonus_deduction = $9, dynamic_bonus = $10, cartela = $11
            WHERE house_id = $1 AND game_id = $2 AND finished = FALSE
              AND system_earnings = $12 AND bonus_deduction = $13
            RETURNING house_id, game_id, stake_amount, number_of_players, cut_percentage,
                      total_stake, system_earnings, prize, bonus_deduction, dynamic_bonus,
                      cartela, drawn_numbers, winner_card_id, finished, started_at
            "#,
        )
        .bind(previous.house_id)
        .bind(previous.game_id)
        .bind(params.stake_amount)
        .bind(params.number_of_players)
        .bind(params.cut_percentage)
        .bind(plan.total_stake)
        .bind(plan.system_earnings)
        .bind(plan.prize)
        .bind(plan.bonus_deduction)
        .bind(params.dynamic_bonus)
        .bind(&cartela)
        .bind(previous.system_earnings)
        .bind(previous.bonus_deduction)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx)?;

        match row {
            Some(row) => session_from_row(row),
            None => {
                // Either the session finished under us or another edit
                // landed first; the delta was computed against a stale
                // snapshot either way.
                let current = self.fetch(previous.house_id, previous.game_id).await?;
                if current.finished {
                    Err(SessionError::SessionFinished(previous.game_id))
                } else {
                    Err(SessionError::ConcurrentModification)
                }
            }
        }
    }
}

#[async_trait]
impl SettlementStore for PgSettlementStore {
    async fn fetch(&self, house_id: HouseId, game_id: GameId) -> Result<GameSession, SessionError> {
        let row = with_timeout(
            DEFAULT_QUERY_TIMEOUT,
            sqlx::query(
                r#"
                SELECT house_id, game_id, stake_amount, number_of_players, cut_percentage,
                       total_stake, system_earnings, prize, bonus_deduction, dynamic_bonus,
                       cartela, drawn_numbers, winner_card_id, finished, started_at
                FROM game_sessions
                WHERE house_id = $1 AND game_id = $2
                "#,
            )
            .bind(house_id)
            .bind(game_id)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?
        .ok_or(SessionError::SessionNotFound(game_id))?;

        session_from_row(row)
    }

    async fn find_unfinished(
        &self,
        house_id: HouseId,
        game_id: GameId,
    ) -> Result<Option<GameSession>, SessionError> {
        let row = with_timeout(
            DEFAULT_QUERY_TIMEOUT,
            sqlx::query(
                r#"
                SELECT house_id, game_id, stake_amount, number_of_players, cut_percentage,
                       total_stake, system_earnings, prize, bonus_deduction, dynamic_bonus,
                       cartela, drawn_numbers, winner_card_id, finished, started_at
                FROM game_sessions
                WHERE house_id = $1 AND game_id = $2 AND finished = FALSE
                "#,
            )
            .bind(house_id)
            .bind(game_id)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        row.map(session_from_row).transpose()
    }

    async fn commit_settlement(
        &self,
        params: &SessionParams,
        existing: Option<&GameSession>,
        plan: &SettlementPlan,
    ) -> Result<GameSession, SessionError> {
        match timeout(
            self.commit_timeout,
            self.commit_inner(params, existing, plan),
        )
        .await
        {
            Ok(result) => result,
            // The dropped transaction rolls back; nothing partial is
            // ever visible.
            Err(_) => Err(SessionError::Timeout(self.commit_timeout)),
        }
    }

    async fn record_winner(
        &self,
        house_id: HouseId,
        game_id: GameId,
        winner_card_id: CardId,
    ) -> Result<GameSession, SessionError> {
        let row = with_timeout(
            DEFAULT_QUERY_TIMEOUT,
            sqlx::query(
                r#"
                UPDATE game_sessions
                SET winner_card_id = $3, finished = TRUE
                WHERE house_id = $1 AND game_id = $2 AND finished = FALSE
                RETURNING house_id, game_id, stake_amount, number_of_players, cut_percentage,
                          total_stake, system_earnings, prize, bonus_deduction, dynamic_bonus,
                          cartela, drawn_numbers, winner_card_id, finished, started_at
                "#,
            )
            .bind(house_id)
            .bind(game_id)
            .bind(winner_card_id)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        match row {
            Some(row) => session_from_row(row),
            None => {
                let current = self.fetch(house_id, game_id).await?;
                if current.finished {
                    Err(SessionError::SessionFinished(game_id))
                } else {
                    Err(SessionError::ConcurrentModification)
                }
            }
        }
    }

    async fn append_drawn(
        &self,
        house_id: HouseId,
        game_id: GameId,
        number: u8,
    ) -> Result<(), SessionError> {
        let number = i16::from(number);
        let row = with_timeout(
            DEFAULT_QUERY_TIMEOUT,
            sqlx::query(
                r#"
                UPDATE game_sessions
                SET drawn_numbers = array_append(drawn_numbers, $3)
                WHERE house_id = $1 AND game_id = $2 AND finished = FALSE
                  AND NOT (drawn_numbers @> ARRAY[$3]::smallint[])
                  AND cardinality(drawn_numbers) < $4
                RETURNING game_id
                "#,
            )
            .bind(house_id)
            .bind(game_id)
            .bind(number)
            .bind(POOL_SIZE as i32)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        if row.is_some() {
            return Ok(());
        }

        let current = self.fetch(house_id, game_id).await?;
        if current.finished {
            Err(SessionError::SessionFinished(game_id))
        } else if current.drawn_numbers.len() >= POOL_SIZE {
            Err(crate::draw::DrawError::ExhaustedPool.into())
        } else {
            // The number is already present: the single-writer rule
            // for draws was violated somewhere upstream.
            Err(SessionError::ConcurrentModification)
        }
    }

    async fn delete_session(
        &self,
        house_id: HouseId,
        game_id: GameId,
    ) -> Result<(), SessionError> {
        let row = with_timeout(
            DEFAULT_QUERY_TIMEOUT,
            sqlx::query(
                "DELETE FROM game_sessions WHERE house_id = $1 AND game_id = $2 RETURNING game_id",
            )
            .bind(house_id)
            .bind(game_id)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        row.map(|_| ())
            .ok_or(SessionError::SessionNotFound(game_id))
    }
}

fn session_from_row(row: PgRow) -> Result<GameSession, SessionError> {
    let cartela: Vec<i64> = row.get("cartela");
    let drawn: Vec<i16> = row.get("drawn_numbers");
    Ok(GameSession {
        house_id: row.get("house_id"),
        game_id: row.get("game_id"),
        stake_amount: row.get("stake_amount"),
        number_of_players: row.get("number_of_players"),
        cut_percentage: row.get("cut_percentage"),
        total_stake: row.get("total_stake"),
        system_earnings: row.get("system_earnings"),
        prize: row.get("prize"),
        bonus_deduction: row.get("bonus_deduction"),
        dynamic_bonus: row.get("dynamic_bonus"),
        cartela: cartela.into_iter().collect(),
        drawn_numbers: drawn.into_iter().map(|n| n as u8).collect(),
        winner_card_id: row.get("winner_card_id"),
        finished: row.get("finished"),
        started_at: row.get::<chrono::NaiveDateTime, _>("started_at").and_utc(),
    })
}

/// Map transaction-level failures onto the retryable taxonomy.
fn map_sqlx(err: sqlx::Error) -> SessionError {
    if let sqlx::Error::Database(db) = &err {
        if let Some(code) = db.code() {
            // serialization_failure, deadlock_detected, lock_not_available
            if code == "40001" || code == "40P01" || code == "55P03" {
                return SessionError::ConcurrentModification;
            }
        }
    }
    if matches!(err, sqlx::Error::PoolTimedOut) {
        return SessionError::Timeout(DEFAULT_QUERY_TIMEOUT);
    }
    SessionError::Database(err)
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// One recorded mutation in the in-memory adjustment ledger.
#[derive(Debug, Clone)]
pub struct MemoryAdjustment {
    pub house_id: HouseId,
    pub game_id: Option<GameId>,
    pub amount: Cents,
    pub balance_after: Cents,
    pub direction: EntryDirection,
    pub kind: AdjustmentKind,
}

#[derive(Default)]
struct MemoryInner {
    wallets: HashMap<HouseId, Cents>,
    cashiers: HashMap<HouseId, Cents>,
    pools: HashMap<HouseId, Cents>,
    sessions: BTreeMap<(HouseId, GameId), GameSession>,
    adjustments: Vec<MemoryAdjustment>,
}

/// In-memory settlement store.
///
/// Commits apply under a single mutex, so they are serialized and
/// all-or-nothing exactly like the Postgres transaction they stand in
/// for. Used by the integration tests and handy for local development
/// without a database.
#[derive(Default)]
pub struct MemorySettlementStore {
    inner: tokio::sync::Mutex<MemoryInner>,
}

impl MemorySettlementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a house wallet.
    pub async fn insert_wallet(&self, house_id: HouseId, package: Cents) {
        self.inner.lock().await.wallets.insert(house_id, package);
    }

    pub async fn wallet_package(&self, house_id: HouseId) -> Option<Cents> {
        self.inner.lock().await.wallets.get(&house_id).copied()
    }

    pub async fn cashier_package(&self, house_id: HouseId) -> Option<Cents> {
        self.inner.lock().await.cashiers.get(&house_id).copied()
    }

    /// Bonus pool balance; zero when no pool has been created yet.
    pub async fn bonus_amount(&self, house_id: HouseId) -> Cents {
        self.inner
            .lock()
            .await
            .pools
            .get(&house_id)
            .copied()
            .unwrap_or(0)
    }

    /// Whether a bonus pool record exists at all (creation is lazy).
    pub async fn bonus_pool_exists(&self, house_id: HouseId) -> bool {
        self.inner.lock().await.pools.contains_key(&house_id)
    }

    pub async fn adjustments(&self, house_id: HouseId) -> Vec<MemoryAdjustment> {
        self.inner
            .lock()
            .await
            .adjustments
            .iter()
            .filter(|a| a.house_id == house_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SettlementStore for MemorySettlementStore {
    async fn fetch(&self, house_id: HouseId, game_id: GameId) -> Result<GameSession, SessionError> {
        self.inner
            .lock()
            .await
            .sessions
            .get(&(house_id, game_id))
            .cloned()
            .ok_or(SessionError::SessionNotFound(game_id))
    }

    async fn find_unfinished(
        &self,
        house_id: HouseId,
        game_id: GameId,
    ) -> Result<Option<GameSession>, SessionError> {
        Ok(self
            .inner
            .lock()
            .await
            .sessions
            .get(&(house_id, game_id))
            .filter(|s| !s.finished)
            .cloned())
    }

    async fn commit_settlement(
        &self,
        params: &SessionParams,
        existing: Option<&GameSession>,
        plan: &SettlementPlan,
    ) -> Result<GameSession, SessionError> {
        let mut inner = self.inner.lock().await;
        let house_id = params.house_id;

        let package = *inner
            .wallets
            .get(&house_id)
            .ok_or(SessionError::WalletNotFound(house_id))?;

        // Stale-snapshot and duplicate-create detection, mirroring the
        // guarded UPDATE / DO NOTHING insert of the Postgres store.
        let (game_id, session) = match existing {
            Some(previous) => {
                let key = (house_id, previous.game_id);
                let current = inner
                    .sessions
                    .get(&key)
                    .ok_or(SessionError::SessionNotFound(previous.game_id))?;
                if current.finished {
                    return Err(SessionError::SessionFinished(previous.game_id));
                }
                if current.system_earnings != previous.system_earnings
                    || current.bonus_deduction != previous.bonus_deduction
                {
                    return Err(SessionError::ConcurrentModification);
                }
                let mut updated = current.clone();
                updated.stake_amount = params.stake_amount;
                updated.number_of_players = params.number_of_players;
                updated.cut_percentage = params.cut_percentage;
                updated.cartela = params.cartela.clone();
                updated.dynamic_bonus = params.dynamic_bonus;
                updated.total_stake = plan.total_stake;
                updated.system_earnings = plan.system_earnings;
                updated.prize = plan.prize;
                updated.bonus_deduction = plan.bonus_deduction;
                (previous.game_id, updated)
            }
            None => {
                let game_id = match params.game_id {
                    Some(id) => {
                        if inner.sessions.contains_key(&(house_id, id)) {
                            return Err(SessionError::ConcurrentModification);
                        }
                        id
                    }
                    None => inner
                        .sessions
                        .range((house_id, GameId::MIN)..=(house_id, GameId::MAX))
                        .next_back()
                        .map(|((_, id), _)| id + 1)
                        .unwrap_or(1),
                };
                let session = GameSession {
                    house_id,
                    game_id,
                    stake_amount: params.stake_amount,
                    number_of_players: params.number_of_players,
                    cut_percentage: params.cut_percentage,
                    total_stake: plan.total_stake,
                    system_earnings: plan.system_earnings,
                    prize: plan.prize,
                    bonus_deduction: plan.bonus_deduction,
                    dynamic_bonus: params.dynamic_bonus,
                    cartela: params.cartela.clone(),
                    drawn_numbers: Vec::new(),
                    winner_card_id: None,
                    finished: false,
                    started_at: Utc::now(),
                };
                (game_id, session)
            }
        };

        if plan.wallet_delta > 0 && package < plan.wallet_delta {
            return Err(SessionError::InsufficientBalance {
                available: package,
                required: plan.wallet_delta,
            });
        }
        let new_package = package
            .checked_sub(plan.wallet_delta)
            .ok_or(SessionError::AmountOverflow)?;

        // All checks passed; apply every effect together.
        inner.wallets.insert(house_id, new_package);
        inner.cashiers.insert(house_id, new_package);
        if plan.wallet_delta != 0 {
            let (direction, kind) = if plan.wallet_delta > 0 {
                (EntryDirection::Debit, AdjustmentKind::Commission)
            } else {
                (EntryDirection::Credit, AdjustmentKind::CommissionRefund)
            };
            inner.adjustments.push(MemoryAdjustment {
                house_id,
                game_id: Some(game_id),
                amount: plan.wallet_delta.abs(),
                balance_after: new_package,
                direction,
                kind,
            });
        }
        if plan.bonus_delta != 0 {
            let pool = inner.pools.entry(house_id).or_insert(0);
            *pool += plan.bonus_delta;
            let balance_after = *pool;
            let (direction, kind) = if plan.bonus_delta > 0 {
                (EntryDirection::Credit, AdjustmentKind::BonusReserve)
            } else {
                (EntryDirection::Debit, AdjustmentKind::BonusRelease)
            };
            inner.adjustments.push(MemoryAdjustment {
                house_id,
                game_id: Some(game_id),
                amount: plan.bonus_delta.abs(),
                balance_after,
                direction,
                kind,
            });
        }
        inner.sessions.insert((house_id, game_id), session.clone());

        Ok(session)
    }

    async fn record_winner(
        &self,
        house_id: HouseId,
        game_id: GameId,
        winner_card_id: CardId,
    ) -> Result<GameSession, SessionError> {
        let mut inner = self.inner.lock().await;
        let session = inner
            .sessions
            .get_mut(&(house_id, game_id))
            .ok_or(SessionError::SessionNotFound(game_id))?;
        if session.finished {
            return Err(SessionError::SessionFinished(game_id));
        }
        session.winner_card_id = Some(winner_card_id);
        session.finished = true;
        Ok(session.clone())
    }

    async fn append_drawn(
        &self,
        house_id: HouseId,
        game_id: GameId,
        number: u8,
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().await;
        let session = inner
            .sessions
            .get_mut(&(house_id, game_id))
            .ok_or(SessionError::SessionNotFound(game_id))?;
        if session.finished {
            return Err(SessionError::SessionFinished(game_id));
        }
        if session.drawn_numbers.len() >= POOL_SIZE {
            return Err(crate::draw::DrawError::ExhaustedPool.into());
        }
        if session.drawn_numbers.contains(&number) {
            return Err(SessionError::ConcurrentModification);
        }
        session.drawn_numbers.push(number);
        Ok(())
    }

    async fn delete_session(
        &self,
        house_id: HouseId,
        game_id: GameId,
    ) -> Result<(), SessionError> {
        self.inner
            .lock()
            .await
            .sessions
            .remove(&(house_id, game_id))
            .map(|_| ())
            .ok_or(SessionError::SessionNotFound(game_id))
    }
}
