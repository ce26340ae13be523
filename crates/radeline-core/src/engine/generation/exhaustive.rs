use super::{Alphabet, Generated, space_size};
use crate::core::models::input::InputSequence;
use crate::engine::config::SearchConfig;
use crate::engine::error::EngineError;
use crate::engine::memory::{MemoryGuard, MemoryProbe};
use crate::engine::progress::{ProgressReporter, TaskTicker};
use itertools::Itertools;
use tracing::{info, instrument};

const PROGRESS_BATCH: u64 = 4096;
const MAX_PREALLOCATED: usize = 1 << 20;

/// Enumerates every per-frame key assignment, in lexicographic order of the alphabet.
#[instrument(skip_all, name = "exhaustive_generation", fields(keys = alphabet.len(), frames = config.frames))]
pub(super) fn generate(
    config: &SearchConfig,
    alphabet: &Alphabet,
    probe: &mut dyn MemoryProbe,
    reporter: &ProgressReporter,
) -> Result<Generated, EngineError> {
    let total = space_size(alphabet.len(), config.frames).ok_or(EngineError::SearchSpaceTooLarge {
        keys: alphabet.len(),
        frames: config.frames,
    })?;

    let mut guard = MemoryGuard::for_stage(
        probe,
        &config.memory_guard,
        total as u64,
        config.memory_guard.exhaustive_activation,
    );
    let mut ticker = TaskTicker::start(reporter, total as u64, PROGRESS_BATCH);
    let mut sequences = Vec::with_capacity(total.min(MAX_PREALLOCATED));

    let assignments = (0..config.frames)
        .map(|_| alphabet.keys().iter().copied())
        .multi_cartesian_product();
    for frame_keys in assignments {
        sequences.push(InputSequence::from_frames(&frame_keys));
        ticker.tick(1);
        if guard.record(1) {
            info!("Exiting generating inputs early due to running low on RAM");
            break;
        }
    }
    ticker.finish();

    let truncated = guard.tripped();
    Ok(Generated {
        space_exhausted: !truncated,
        truncated,
        sequences,
    })
}
