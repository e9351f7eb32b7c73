//! Non-repeating number draws for a live session.

pub mod engine;

pub use engine::{DrawEngine, DrawError, DrawPhase};
