use super::{Alphabet, Generated, space_size};
use crate::core::models::input::{InputRun, InputSequence};
use crate::engine::config::SearchConfig;
use crate::engine::memory::{MemoryGuard, MemoryProbe};
use crate::engine::progress::{ProgressReporter, TaskTicker};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

const PROGRESS_BATCH: u64 = 4096;

/// Draws up to `config.permutations` random sequences and returns the distinct ones in sorted order.
#[instrument(skip_all, name = "random_generation", fields(keys = alphabet.len(), frames = config.frames))]
pub(super) fn generate(
    config: &SearchConfig,
    alphabet: &Alphabet,
    probe: &mut dyn MemoryProbe,
    reporter: &ProgressReporter,
) -> Generated {
    let mut rng = match config.generation.seed {
        Some(seed) => {
            debug!("Seeding generator with {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let space = space_size(alphabet.len(), config.frames);
    let attempts = config.permutations;
    let expected = space.map_or(attempts, |space| space.min(attempts));

    let mut guard = MemoryGuard::for_stage(
        probe,
        &config.memory_guard,
        expected as u64,
        config.memory_guard.random_activation,
    );
    let mut ticker = TaskTicker::start(reporter, attempts as u64, PROGRESS_BATCH);
    let mut unique: HashSet<InputSequence> = HashSet::new();
    let mut space_exhausted = false;

    for _ in 0..attempts {
        let sequence = draw_sequence(&mut rng, alphabet, config.frames, config.generation.triangular);
        unique.insert(sequence);
        ticker.tick(1);

        if guard.record(1) {
            info!("Exiting generating inputs early due to running low on RAM");
            break;
        }
        if space.is_some_and(|space| unique.len() >= space) {
            info!(
                "Exiting generating early due to reaching max possible permutations ({})",
                unique.len()
            );
            space_exhausted = true;
            break;
        }
    }
    ticker.finish();

    let mut sequences: Vec<InputSequence> = unique.into_iter().collect();
    sequences.sort_unstable();
    Generated {
        sequences,
        space_exhausted,
        truncated: guard.tripped(),
    }
}

fn draw_sequence<R: Rng>(
    rng: &mut R,
    alphabet: &Alphabet,
    frames: u32,
    triangular: bool,
) -> InputSequence {
    let keys = alphabet.keys();
    let mut runs = Vec::new();
    let mut remaining = frames;
    while remaining > 0 {
        let length = if triangular {
            triangular_run_length(rng, remaining)
        } else {
            rng.gen_range(1..=remaining)
        };
        let key = keys[rng.gen_range(0..keys.len())];
        runs.push(InputRun::new(length, key));
        remaining -= length;
    }
    InputSequence::new(runs).canonicalize()
}

/// Run length from a triangular distribution over `[1, remaining]` peaking at 1, rounded half-to-even.
fn triangular_run_length<R: Rng>(rng: &mut R, remaining: u32) -> u32 {
    if remaining <= 1 {
        return 1;
    }
    let high = f64::from(remaining);
    let u: f64 = rng.gen_range(0.0..1.0);
    let sample = high + (1.0 - high) * (1.0 - u).sqrt();
    (sample.round_ties_even() as u32).clamp(1, remaining)
}
