//! Candidate input sequence generation.
//!
//! Small search spaces are enumerated exhaustively; larger ones are sampled at random. Both
//! modes share the [`Alphabet`] reduction so the choice of mode never changes which keys appear.

mod alphabet;
mod exhaustive;
mod random;

pub use alphabet::{Alphabet, redundant_key};

use super::config::SearchConfig;
use super::error::EngineError;
use super::memory::MemoryProbe;
use super::progress::ProgressReporter;
use crate::core::models::input::InputSequence;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Exhaustive,
    Random,
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMode::Exhaustive => write!(f, "sequential"),
            GenerationMode::Random => write!(f, "RNG"),
        }
    }
}

/// Output of the generation stage.
#[derive(Debug)]
pub struct Generated {
    pub sequences: Vec<InputSequence>,
    /// Every distinct sequence over the alphabet was produced.
    pub space_exhausted: bool,
    /// The memory guard stopped generation early.
    pub truncated: bool,
}

/// `keys^frames`, or `None` if it does not fit in `usize`.
pub fn space_size(keys: usize, frames: u32) -> Option<usize> {
    keys.checked_pow(frames)
}

/// Frame budget at which the given alphabet size switches to random generation.
pub fn rng_threshold(config: &SearchConfig, keys: usize) -> u32 {
    let generation = &config.generation;
    match keys {
        3 => generation.rng_threshold_slow,
        4 => generation.rng_threshold_slow.saturating_sub(2),
        _ => generation.rng_threshold,
    }
}

pub fn select_mode(config: &SearchConfig, alphabet: &Alphabet) -> GenerationMode {
    if config.frames < rng_threshold(config, alphabet.len()) {
        GenerationMode::Exhaustive
    } else {
        GenerationMode::Random
    }
}

pub fn generate(
    config: &SearchConfig,
    alphabet: &Alphabet,
    mode: GenerationMode,
    probe: &mut dyn MemoryProbe,
    reporter: &ProgressReporter,
) -> Result<Generated, EngineError> {
    match mode {
        GenerationMode::Exhaustive => exhaustive::generate(config, alphabet, probe, reporter),
        GenerationMode::Random => Ok(random::generate(config, alphabet, probe, reporter)),
    }
}
