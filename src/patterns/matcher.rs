//! Pure evaluation of a card's marked state against the catalog.
//!
//! Evaluation depends only on the cumulative set of drawn numbers,
//! never on the order they were drawn, so a card can be re-checked
//! after further draws and the answer for an earlier set is stable.

use super::catalog::{PatternCatalog, PatternDefinition, PatternError, PatternKind};
use crate::cartela::Card;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How the primary and secondary pattern selections combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    And,
    Or,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => write!(f, "and"),
            Combinator::Or => write!(f, "or"),
        }
    }
}

/// Result of a winner check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinDecision {
    pub is_winner: bool,
    pub satisfied: BTreeSet<PatternKind>,
}

fn definition_satisfied(card: &Card, drawn: &BTreeSet<u8>, def: &PatternDefinition) -> bool {
    def.cell_sets
        .iter()
        .any(|set| set.iter().all(|&(row, col)| card.is_marked(row, col, drawn)))
}

/// All catalog patterns the card currently satisfies.
///
/// Simple patterns are checked cell-set by cell-set; meta-patterns count
/// distinct satisfied members against their required K.
pub fn evaluate(card: &Card, drawn: &BTreeSet<u8>, catalog: &PatternCatalog) -> BTreeSet<PatternKind> {
    let mut satisfied: BTreeSet<PatternKind> = catalog
        .simple_definitions()
        .filter(|def| definition_satisfied(card, drawn, def))
        .map(|def| def.kind)
        .collect();

    let meta_hits: Vec<PatternKind> = catalog
        .meta_definitions()
        .filter(|def| {
            let hits = def.members.iter().filter(|m| satisfied.contains(m)).count();
            hits >= def.required
        })
        .map(|def| def.kind)
        .collect();
    satisfied.extend(meta_hits);

    satisfied
}

/// Decide whether a card wins under the selected patterns.
///
/// An absent secondary selection means only the primary is evaluated.
/// Returns [`PatternError::NotInCatalog`] for a selection the running
/// catalog does not define.
pub fn is_winner(
    card: &Card,
    drawn: &BTreeSet<u8>,
    catalog: &PatternCatalog,
    primary: PatternKind,
    secondary: Option<PatternKind>,
    combinator: Combinator,
) -> Result<WinDecision, PatternError> {
    if !catalog.contains(primary) {
        return Err(PatternError::NotInCatalog(primary));
    }
    if let Some(kind) = secondary {
        if !catalog.contains(kind) {
            return Err(PatternError::NotInCatalog(kind));
        }
    }

    let satisfied = evaluate(card, drawn, catalog);
    let primary_hit = satisfied.contains(&primary);
    let is_winner = match secondary {
        None => primary_hit,
        Some(kind) => {
            let secondary_hit = satisfied.contains(&kind);
            match combinator {
                Combinator::And => primary_hit && secondary_hit,
                Combinator::Or => primary_hit || secondary_hit,
            }
        }
    };

    Ok(WinDecision { is_winner, satisfied })
}
