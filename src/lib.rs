//! # Bingo Hall
//!
//! A bingo session engine for betting-hall networks: cashiers open
//! game sessions, numbers are drawn, player cards are checked against
//! win patterns, and the prize pool is split between players, the
//! house commission, and an optional dynamic bonus reserve.
//!
//! ## Architecture
//!
//! The crate is built from three cores and the plumbing around them:
//!
//! - **Session ledger** ([`session`]): settlement with atomic wallet
//!   mutation. Every commit spans the game session, the house wallet,
//!   the bonus pool, the cashier mirror, and the adjustment ledger,
//!   all-or-nothing. Edits settle deltas, never re-derive from
//!   scratch, so retries and repeated edits are safe.
//! - **Draw engine** ([`draw`]): unbiased, non-repeating draws over
//!   1–75, with preview sampling and timed auto-play.
//! - **Pattern matcher** ([`patterns`]): pure evaluation of a card's
//!   marked state against a validated catalog of shapes and K-of-N
//!   meta-shapes.
//!
//! Live sessions run as actors ([`hall`]): one mailbox per session
//! serializes all draw traffic, and the [`hall::HallManager`] facade
//! exposes the operations collaborators call.
//!
//! Settlement invariant: for every settled session,
//! `system_earnings + prize + bonus_deduction == total_stake`, exactly.
//!
//! ## Example
//!
//! ```
//! use bingo_hall::session::plan_creation;
//!
//! // stake 10.00 x 5 players at a 20% cut, dynamic bonus on
//! let plan = plan_creation(1000, 5, 20, true).unwrap();
//! assert_eq!(plan.system_earnings, 1000);
//! assert_eq!(plan.bonus_deduction, 200);
//! assert_eq!(plan.prize, 3800);
//! ```

/// Shared numeric constants (card geometry, draw range, bonus rate).
pub mod constants;

/// Cartela cards and the hall's card book.
pub mod cartela;
pub use cartela::{Card, CardId, CartelaError, CartelaRegistry};

/// Win-pattern catalog and the pure matcher.
pub mod patterns;
pub use patterns::{Combinator, PatternCatalog, PatternKind, WinDecision};

/// Non-repeating number draws.
pub mod draw;
pub use draw::{DrawEngine, DrawError, DrawPhase};

/// House wallets, bonus pools, and the adjustment ledger.
pub mod wallet;
pub use wallet::{Cents, HouseId, WalletManager};

/// The session ledger and settlement stores.
pub mod session;
pub use session::{
    GameId, GameSession, MemorySettlementStore, PgSettlementStore, SessionError, SessionManager,
    SessionParams, SettlementStore,
};

/// Live-session actors and the hall facade.
pub mod hall;
pub use hall::{HallConfig, HallManager};

/// PostgreSQL pool, configuration, and query timeouts.
pub mod db;
pub use db::{Database, DatabaseConfig};
