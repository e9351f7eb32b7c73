//! Win-pattern catalog and the pure card matcher.
//!
//! Patterns are a closed set of named shapes ([`PatternKind`]) backed by
//! coordinate-set tables, plus meta-patterns that require K of N member
//! shapes. The matcher is stateless: it only looks at a card and the
//! cumulative set of drawn numbers, so it can run concurrently and
//! repeatedly without synchronization.

pub mod catalog;
pub mod matcher;

pub use catalog::{
    MetaPatternDefinition, PatternCatalog, PatternDefinition, PatternError, PatternKind,
};
pub use matcher::{Combinator, WinDecision, evaluate, is_winner};
