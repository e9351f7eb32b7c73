//! The draw engine: uniform, non-repeating selection over 1..=75.

use crate::constants::{MAX_NUMBER, MIN_NUMBER, POOL_SIZE};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Draw errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    /// Every number has been drawn
    #[error("draw pool exhausted: all {POOL_SIZE} numbers drawn")]
    ExhaustedPool,

    /// Persisted sequence being resumed contains a repeat
    #[error("drawn sequence contains {0} more than once")]
    DuplicateNumber(u8),

    /// Persisted sequence being resumed contains a number outside 1..=75
    #[error("number {0} is outside the draw range")]
    OutOfRange(u8),
}

/// Engine lifecycle. `Exhausted` is terminal for draws; the session the
/// engine belongs to stays usable for settlement and finish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawPhase {
    Idle,
    Drawing,
    Exhausted,
}

/// Draws numbers for one session.
///
/// Each call selects uniformly at random from the undrawn complement,
/// so every remaining number is equally likely regardless of what was
/// drawn before. The engine is owned by a single session actor; it is
/// not itself synchronized.
#[derive(Debug, PartialEq, Eq)]
pub struct DrawEngine {
    order: Vec<u8>,
    drawn: BTreeSet<u8>,
    phase: DrawPhase,
}

impl Default for DrawEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawEngine {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            drawn: BTreeSet::new(),
            phase: DrawPhase::Idle,
        }
    }

    /// Rebuild an engine from a persisted draw sequence.
    pub fn resume(sequence: &[u8]) -> Result<Self, DrawError> {
        let mut drawn = BTreeSet::new();
        for &number in sequence {
            if !(MIN_NUMBER..=MAX_NUMBER).contains(&number) {
                return Err(DrawError::OutOfRange(number));
            }
            if !drawn.insert(number) {
                return Err(DrawError::DuplicateNumber(number));
            }
        }
        let phase = if drawn.len() == POOL_SIZE {
            DrawPhase::Exhausted
        } else if drawn.is_empty() {
            DrawPhase::Idle
        } else {
            DrawPhase::Drawing
        };
        Ok(Self {
            order: sequence.to_vec(),
            drawn,
            phase,
        })
    }

    /// Draw one number with the process RNG.
    pub fn draw(&mut self) -> Result<u8, DrawError> {
        self.draw_with(&mut rand::rng())
    }

    /// Draw one number using the supplied generator.
    pub fn draw_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<u8, DrawError> {
        let complement = self.complement();
        if complement.is_empty() {
            self.phase = DrawPhase::Exhausted;
            return Err(DrawError::ExhaustedPool);
        }
        let number = complement[rng.random_range(0..complement.len())];
        self.order.push(number);
        self.drawn.insert(number);
        self.phase = if self.drawn.len() == POOL_SIZE {
            DrawPhase::Exhausted
        } else {
            DrawPhase::Drawing
        };
        Ok(number)
    }

    /// Sample up to `count` undrawn candidates for display.
    ///
    /// Never mutates engine state; callers may invoke it at any time,
    /// including between auto-play ticks.
    pub fn preview_shuffle(&self, count: usize) -> Vec<u8> {
        let complement = self.complement();
        complement
            .choose_multiple(&mut rand::rng(), count.min(complement.len()))
            .copied()
            .collect()
    }

    /// Remove the most recent draw. Used when persisting the draw fails
    /// so the in-memory sequence matches the store again.
    pub(crate) fn retract(&mut self, number: u8) {
        if self.order.last() == Some(&number) {
            self.order.pop();
            self.drawn.remove(&number);
            self.phase = if self.drawn.is_empty() {
                DrawPhase::Idle
            } else {
                DrawPhase::Drawing
            };
        }
    }

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    /// Numbers drawn so far, in draw order.
    pub fn sequence(&self) -> &[u8] {
        &self.order
    }

    /// The cumulative drawn set.
    pub fn drawn_set(&self) -> &BTreeSet<u8> {
        &self.drawn
    }

    pub fn remaining(&self) -> usize {
        POOL_SIZE - self.drawn.len()
    }

    fn complement(&self) -> Vec<u8> {
        (MIN_NUMBER..=MAX_NUMBER)
            .filter(|n| !self.drawn.contains(n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_are_unique_and_in_range() {
        let mut engine = DrawEngine::new();
        let mut seen = BTreeSet::new();
        for _ in 0..POOL_SIZE {
            let n = engine.draw().unwrap();
            assert!((MIN_NUMBER..=MAX_NUMBER).contains(&n));
            assert!(seen.insert(n), "number {n} drawn twice");
        }
        assert_eq!(engine.phase(), DrawPhase::Exhausted);
        assert_eq!(engine.remaining(), 0);
    }

    #[test]
    fn seventy_sixth_draw_fails_exhausted() {
        let mut engine = DrawEngine::new();
        for _ in 0..POOL_SIZE {
            engine.draw().unwrap();
        }
        assert_eq!(engine.draw(), Err(DrawError::ExhaustedPool));
        // Still exhausted, still answering.
        assert_eq!(engine.draw(), Err(DrawError::ExhaustedPool));
    }

    #[test]
    fn preview_never_mutates() {
        let mut engine = DrawEngine::new();
        engine.draw().unwrap();
        let before = engine.sequence().to_vec();
        for _ in 0..10 {
            let sample = engine.preview_shuffle(5);
            assert_eq!(sample.len(), 5);
            for n in &sample {
                assert!(!engine.drawn_set().contains(n));
            }
        }
        assert_eq!(engine.sequence(), before.as_slice());
    }

    #[test]
    fn preview_clamps_to_remaining() {
        let mut engine = DrawEngine::new();
        for _ in 0..(POOL_SIZE - 2) {
            engine.draw().unwrap();
        }
        assert_eq!(engine.preview_shuffle(10).len(), 2);
    }

    #[test]
    fn resume_validates_sequence() {
        assert!(DrawEngine::resume(&[5, 12, 74]).is_ok());
        assert_eq!(
            DrawEngine::resume(&[5, 5]),
            Err(DrawError::DuplicateNumber(5))
        );
        assert_eq!(DrawEngine::resume(&[76]), Err(DrawError::OutOfRange(76)));
        assert_eq!(DrawEngine::resume(&[0]), Err(DrawError::OutOfRange(0)));
    }

    #[test]
    fn resume_phase_reflects_progress() {
        assert_eq!(DrawEngine::resume(&[]).unwrap().phase(), DrawPhase::Idle);
        assert_eq!(
            DrawEngine::resume(&[7]).unwrap().phase(),
            DrawPhase::Drawing
        );
        let full: Vec<u8> = (MIN_NUMBER..=MAX_NUMBER).collect();
        assert_eq!(
            DrawEngine::resume(&full).unwrap().phase(),
            DrawPhase::Exhausted
        );
    }

    #[test]
    fn retract_undoes_last_draw_only() {
        let mut engine = DrawEngine::new();
        let first = engine.draw().unwrap();
        let second = engine.draw().unwrap();
        engine.retract(first); // not the last draw, ignored
        assert_eq!(engine.sequence(), &[first, second]);
        engine.retract(second);
        assert_eq!(engine.sequence(), &[first]);
        assert!(!engine.drawn_set().contains(&second));
    }

    #[test]
    fn draws_are_roughly_uniform_over_complement() {
        // With 74 numbers left after seeding one draw, the next pick
        // should cover the complement broadly across many trials.
        let mut counts = std::collections::HashMap::new();
        for _ in 0..2000 {
            let mut engine = DrawEngine::resume(&[75]).unwrap();
            let n = engine.draw().unwrap();
            *counts.entry(n).or_insert(0u32) += 1;
        }
        assert!(!counts.contains_key(&75));
        // Expect wide coverage rather than a recency-biased cluster.
        assert!(counts.len() > 50, "only {} distinct numbers", counts.len());
    }
}
