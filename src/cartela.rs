//! Cartela (player card) entities and the card book.
//!
//! A cartela is a 5×5 grid of printed numbers with a free center cell.
//! Column ranges follow the standard 75-ball layout: the first column
//! holds 1–15, the second 16–30, and so on. Cards are validated on
//! construction so the rest of the crate never sees a malformed grid.

use crate::constants::{CARD_DIM, COLUMN_SPAN, FREE_CELL, MAX_NUMBER};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Card identifier type. Card books are printed and numbered, so ids
/// are small positive integers in practice.
pub type CardId = i64;

/// Errors raised while building cards or the registry.
#[derive(Debug, Error)]
pub enum CartelaError {
    /// A printed value falls outside its column's range
    #[error("card {card_id}: value {value} at ({row},{col}) is outside its column range")]
    OutOfRange {
        card_id: CardId,
        row: usize,
        col: usize,
        value: u8,
    },

    /// The same number is printed twice on one card
    #[error("card {card_id}: number {value} is printed more than once")]
    DuplicateNumber { card_id: CardId, value: u8 },

    /// The center cell must be left free (printed as 0)
    #[error("card {card_id}: center cell must be free")]
    PrintedFreeCell { card_id: CardId },

    /// Two cards in one book share an id
    #[error("duplicate card id {0} in book")]
    DuplicateCardId(CardId),
}

/// A single 5×5 card. The free center cell is stored as 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    grid: [[u8; CARD_DIM]; CARD_DIM],
}

impl Card {
    /// Build a card from its printed grid, validating the layout.
    ///
    /// `grid[row][col]` is the printed number; the center cell must be 0.
    pub fn new(id: CardId, grid: [[u8; CARD_DIM]; CARD_DIM]) -> Result<Self, CartelaError> {
        let mut seen = BTreeSet::new();
        for (row, cells) in grid.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                if (row, col) == FREE_CELL {
                    if value != 0 {
                        return Err(CartelaError::PrintedFreeCell { card_id: id });
                    }
                    continue;
                }
                let lo = col as u8 * COLUMN_SPAN + 1;
                let hi = (col as u8 + 1) * COLUMN_SPAN;
                if value < lo || value > hi || value > MAX_NUMBER {
                    return Err(CartelaError::OutOfRange {
                        card_id: id,
                        row,
                        col,
                        value,
                    });
                }
                if !seen.insert(value) {
                    return Err(CartelaError::DuplicateNumber { card_id: id, value });
                }
            }
        }
        Ok(Self { id, grid })
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    /// Printed number at a cell, or `None` for the free cell.
    pub fn printed(&self, row: usize, col: usize) -> Option<u8> {
        if (row, col) == FREE_CELL {
            None
        } else {
            Some(self.grid[row][col])
        }
    }

    /// A cell is marked iff it is the free cell or its printed number
    /// has been drawn. Only the cumulative drawn set matters.
    pub fn is_marked(&self, row: usize, col: usize, drawn: &BTreeSet<u8>) -> bool {
        match self.printed(row, col) {
            None => true,
            Some(value) => drawn.contains(&value),
        }
    }
}

/// The fixed card book for a hall: id → card.
///
/// Halls sell physical cartelas from a printed book, so the registry is
/// loaded once at startup and treated as immutable afterwards.
#[derive(Debug, Default, Clone)]
pub struct CartelaRegistry {
    cards: HashMap<CardId, Card>,
}

impl CartelaRegistry {
    /// Build a registry from a card book, rejecting duplicate ids.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, CartelaError> {
        let mut map = HashMap::with_capacity(cards.len());
        for card in cards {
            let id = card.id();
            if map.insert(id, card).is_some() {
                return Err(CartelaError::DuplicateCardId(id));
            }
        }
        Ok(Self { cards: map })
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
