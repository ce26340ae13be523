use crate::core::models::input::InputSequence;
use crate::core::models::result::SimulationResult;
use crate::core::physics::Simulator;
use crate::engine::config::{Goal, KeyRestriction, SearchConfig};
use crate::engine::error::EngineError;
use crate::engine::generation::{self, Alphabet, GenerationMode};
use crate::engine::memory::{MemoryGuard, MemoryProbe};
use crate::engine::progress::{Progress, ProgressReporter, TaskTicker};
use crate::engine::ranking::{ResultCollector, rank};
use std::fmt;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const SIMULATION_CHUNK: usize = 1 << 16;

/// Pipeline stage at which the memory guard stopped work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generation,
    Simulation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Generation => write!(f, "generation"),
            Stage::Simulation => write!(f, "simulation"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Ranked results, closest to the goal last.
    pub results: Vec<SimulationResult>,
    pub mode: GenerationMode,
    pub alphabet: Alphabet,
    /// Requested attempt count; only meaningful in random mode.
    pub requested: Option<usize>,
    pub generated: usize,
    pub simulated: usize,
    pub space_exhausted: bool,
    pub truncated: Option<Stage>,
    /// User-facing notices raised while searching, in the order they occurred.
    pub notices: Vec<String>,
}

fn notify(reporter: &ProgressReporter, notices: &mut Vec<String>, text: String) {
    reporter.report(Progress::Message(text.clone()));
    notices.push(text);
}

#[instrument(skip_all, name = "search_workflow", fields(axis = %config.axis, frames = config.frames))]
pub fn run(
    config: &SearchConfig,
    probe: &mut dyn MemoryProbe,
    reporter: &ProgressReporter,
) -> Result<SearchReport, EngineError> {
    // === Phase 1: Alphabet and mode ===
    let mut notices = Vec::new();
    let alphabet = Alphabet::for_config(config);
    match (alphabet.disabled(), config.generation.disabled_key) {
        (Some(key), _) => notify(
            reporter,
            &mut notices,
            format!("Disabled generating {} inputs", key),
        ),
        (None, KeyRestriction::Disable(key)) => notify(
            reporter,
            &mut notices,
            format!(
                "Didn't disable {} key since it wouldn't have been generated anyway",
                key
            ),
        ),
        (None, _) => {}
    }
    let mode = generation::select_mode(config, &alphabet);
    info!(
        "Generating over alphabet {} using the {} method",
        alphabet, mode
    );

    // === Phase 2: Generation ===
    reporter.report(Progress::PhaseStart {
        name: "Building permutations",
    });
    let generated = generation::generate(config, &alphabet, mode, probe, reporter)?;
    reporter.report(Progress::PhaseFinish);

    let mut truncated = generated.truncated.then_some(Stage::Generation);
    let generated_count = generated.sequences.len();
    let space_exhausted = generated.space_exhausted;
    info!("Generated {} permutations", generated_count);
    if generated.truncated {
        notify(
            reporter,
            &mut notices,
            "Exiting generating inputs early due to running low on RAM".to_string(),
        );
    } else if mode == GenerationMode::Random && space_exhausted {
        notify(
            reporter,
            &mut notices,
            format!(
                "Exiting generating early due to reaching max possible permutations ({})",
                generated_count
            ),
        );
    }

    // === Phase 3: Simulation and filtering ===
    reporter.report(Progress::PhaseStart {
        name: "Simulating inputs",
    });
    let activation = match mode {
        GenerationMode::Exhaustive => config.memory_guard.exhaustive_activation,
        GenerationMode::Random => config.memory_guard.random_activation,
    };
    let mut guard = MemoryGuard::for_stage(
        probe,
        &config.memory_guard,
        generated_count as u64,
        activation,
    );
    let (collector, simulated) = simulate_all(
        config,
        &config.simulator(),
        generated.sequences,
        &mut guard,
        reporter,
    );
    // A trip after the last chunk lost nothing.
    if guard.tripped() && simulated < generated_count {
        notify(
            reporter,
            &mut notices,
            format!(
                "Exiting simulation early due to running low on RAM ({} of {} simulated)",
                simulated, generated_count
            ),
        );
        truncated = truncated.or(Some(Stage::Simulation));
    }
    reporter.report(Progress::PhaseFinish);

    // === Phase 4: Ranking ===
    reporter.report(Progress::PhaseStart { name: "Ranking" });
    info!(
        "{} of {} simulated permutations reached the goal",
        collector.accepted(),
        simulated
    );
    let mut results = collector.finish();
    rank(&mut results, &config.goal, config.goal_velocity, config.priority);
    reporter.report(Progress::PhaseFinish);

    Ok(SearchReport {
        results,
        mode,
        alphabet,
        requested: (mode == GenerationMode::Random).then_some(config.permutations),
        generated: generated_count,
        simulated,
        space_exhausted,
        truncated,
        notices,
    })
}

/// Consumes the candidates chunk by chunk, consulting the guard between chunks.
///
/// Each sequence is moved into its result or dropped once simulated; nothing is copied.
fn simulate_all(
    config: &SearchConfig,
    simulator: &Simulator,
    sequences: Vec<InputSequence>,
    guard: &mut MemoryGuard<'_>,
    reporter: &ProgressReporter,
) -> (ResultCollector, usize) {
    let mut collector = ResultCollector::for_config(config);
    let chunk_size = if guard.is_armed() {
        (config.memory_guard.check_interval as usize).clamp(1, SIMULATION_CHUNK)
    } else {
        SIMULATION_CHUNK
    };
    let mut ticker = TaskTicker::start(reporter, sequences.len() as u64, chunk_size as u64);
    let mut simulated = 0;
    let mut remaining = sequences.into_iter();

    loop {
        let chunk: Vec<InputSequence> = remaining.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        let len = chunk.len();
        for result in simulate_chunk(simulator, &config.goal, chunk).into_iter().flatten() {
            collector.offer(result);
        }
        simulated += len;
        ticker.tick(len as u64);
        if guard.record(len as u64) {
            break;
        }
    }
    ticker.finish();

    (collector, simulated)
}

/// Simulates one chunk in order, keeping only the results that reach the goal.
#[cfg(feature = "parallel")]
fn simulate_chunk(
    simulator: &Simulator,
    goal: &Goal,
    chunk: Vec<InputSequence>,
) -> Vec<Option<SimulationResult>> {
    chunk
        .into_par_iter()
        .map(|sequence| reach_goal(simulator, goal, sequence))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn simulate_chunk(
    simulator: &Simulator,
    goal: &Goal,
    chunk: Vec<InputSequence>,
) -> Vec<Option<SimulationResult>> {
    chunk
        .into_iter()
        .map(|sequence| reach_goal(simulator, goal, sequence))
        .collect()
}

#[inline]
fn reach_goal(simulator: &Simulator, goal: &Goal, sequence: InputSequence) -> Option<SimulationResult> {
    let result = simulator.run(sequence);
    goal.accepts(result.position).then_some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::input::{Axis, InputRun, KeySymbol};
    use crate::core::models::state::InitialState;
    use crate::core::physics::{PhysicsModifiers, approach, round_output};
    use crate::engine::config::{
        Goal, GoalDirection, KeyRestriction, RankPriority, SearchConfigBuilder,
    };
    use crate::engine::memory::tests::ScriptedProbe;

    fn right_only_config(frames: u32, goal: Goal, on_ground: bool) -> SearchConfig {
        let mut config = SearchConfigBuilder::new()
            .axis(Axis::Horizontal)
            .frames(frames)
            .goal(goal)
            .initial_state(InitialState::new(0.0, 0.0))
            .physics(PhysicsModifiers {
                on_ground,
                ..PhysicsModifiers::default()
            })
            .build()
            .unwrap();
        config.generation.disabled_key = KeyRestriction::Disable(KeySymbol::Left);
        config
    }

    fn run_calm(config: &SearchConfig) -> SearchReport {
        let mut probe = ScriptedProbe::calm();
        run(config, &mut probe, &ProgressReporter::new()).unwrap()
    }

    #[test]
    fn impossible_goal_yields_no_results() {
        let config = right_only_config(
            4,
            Goal::Beyond {
                position: -1.0,
                direction: GoalDirection::Negative,
            },
            false,
        );
        let report = run_calm(&config);
        assert_eq!(report.alphabet.keys(), &[KeySymbol::None, KeySymbol::Right]);
        assert_eq!(report.mode, GenerationMode::Exhaustive);
        assert_eq!(report.generated, 16);
        assert_eq!(report.simulated, 16);
        assert!(report.results.is_empty());
        assert_eq!(report.truncated, None);
        assert_eq!(report.requested, None);
    }

    #[test]
    fn full_right_hold_is_ranked_by_position() {
        let goal = Goal::Beyond {
            position: 0.0,
            direction: GoalDirection::Positive,
        };
        let config = right_only_config(2, goal, true);
        let report = run_calm(&config);

        let step = 1000.0 / 60.0;
        let v1 = approach(0.0, 90.0, step);
        let v2 = approach(v1, 90.0, step);
        let x2 = v1 / 60.0 + v2 / 60.0;

        let furthest = report.results.first().unwrap();
        assert_eq!(furthest.sequence.runs(), &[InputRun::new(2, KeySymbol::Right)]);
        assert_eq!(furthest.position, round_output(x2));
        assert_eq!(furthest.velocity, round_output(v2));
        assert!(report
            .results
            .windows(2)
            .all(|pair| pair[0].position >= pair[1].position));
    }

    #[test]
    fn ranked_output_is_reproducible_with_seed() {
        let goal = Goal::Beyond {
            position: 0.0,
            direction: GoalDirection::Positive,
        };
        let mut config = right_only_config(24, goal, false);
        config.generation.disabled_key = KeyRestriction::Unrestricted;
        config.generation.seed = Some(11);
        config.permutations = 3_000;
        config.priority = RankPriority::Velocity;
        config.goal_velocity = 50.0;

        let first = run_calm(&config);
        let second = run_calm(&config);
        assert_eq!(first.mode, GenerationMode::Random);
        assert_eq!(first.requested, Some(3_000));
        assert_eq!(first.results, second.results);
        for result in &first.results {
            assert_eq!(result.sequence.total_frames(), 24);
            assert!(result.position > 0.0);
        }
    }

    #[test]
    fn memory_pressure_still_produces_ranked_partial_results() {
        let goal = Goal::Beyond {
            position: 0.0,
            direction: GoalDirection::Positive,
        };
        let mut config = right_only_config(10, goal, false);
        config.generation.disabled_key = KeyRestriction::Unrestricted;
        config.memory_guard.exhaustive_activation = 0;
        config.memory_guard.check_interval = 1_000;

        let mut probe = ScriptedProbe::pressured();
        let report = run(&config, &mut probe, &ProgressReporter::new()).unwrap();

        assert_eq!(report.truncated, Some(Stage::Generation));
        assert_eq!(report.generated, 1_000);
        assert!(!report.space_exhausted);
        assert!(report.simulated <= report.generated);
        assert!(report
            .results
            .windows(2)
            .all(|pair| pair[0].position >= pair[1].position));
    }

    #[test]
    fn simulation_stage_can_trip_on_its_own() {
        let goal = Goal::Beyond {
            position: 0.0,
            direction: GoalDirection::Positive,
        };
        let mut config = right_only_config(8, goal, false);
        config.generation.disabled_key = KeyRestriction::Unrestricted;
        config.memory_guard.exhaustive_activation = 0;
        config.memory_guard.check_interval = 1_000;

        // 3^8 = 6561 candidates: six calm checks during generation, then pressure.
        let calm = Some(crate::engine::memory::tests::sample(0, u64::MAX));
        let pressured = Some(crate::engine::memory::tests::sample(u64::MAX, 0));
        let mut probe = ScriptedProbe::new(vec![calm, calm, calm, calm, calm, calm, pressured]);
        let report = run(&config, &mut probe, &ProgressReporter::new()).unwrap();

        assert_eq!(report.generated, 6_561);
        assert_eq!(report.truncated, Some(Stage::Simulation));
        assert_eq!(report.simulated, 1_000);
    }

    fn exhaustive_candidates(config: &SearchConfig) -> Vec<InputSequence> {
        let alphabet = Alphabet::for_config(config);
        let mut probe = ScriptedProbe::calm();
        generation::generate(
            config,
            &alphabet,
            GenerationMode::Exhaustive,
            &mut probe,
            &ProgressReporter::new(),
        )
        .unwrap()
        .sequences
    }

    #[test]
    fn every_passing_candidate_is_kept_in_generation_order() {
        let goal = Goal::Beyond {
            position: -1.0e9,
            direction: GoalDirection::Positive,
        };
        let mut config = right_only_config(6, goal, false);
        config.generation.disabled_key = KeyRestriction::Unrestricted;
        config.hide_duplicates = false;
        let candidates = exhaustive_candidates(&config);

        let mut probe = ScriptedProbe::calm();
        let mut guard = MemoryGuard::for_stage(&mut probe, &config.memory_guard, 0, u64::MAX);
        let (collector, simulated) = simulate_all(
            &config,
            &config.simulator(),
            candidates.clone(),
            &mut guard,
            &ProgressReporter::new(),
        );

        assert_eq!(simulated, candidates.len());
        let kept: Vec<InputSequence> = collector.finish().into_iter().map(|r| r.sequence).collect();
        assert_eq!(kept, candidates);
    }

    #[test]
    fn chunk_simulation_matches_a_sequential_pass() {
        let goal = Goal::Within { min: 0.5, max: 2.0 };
        let mut config = right_only_config(7, goal, true);
        config.generation.disabled_key = KeyRestriction::Unrestricted;
        let simulator = config.simulator();
        let candidates = exhaustive_candidates(&config);

        let sequential: Vec<Option<SimulationResult>> = candidates
            .iter()
            .cloned()
            .map(|sequence| {
                let (position, velocity) = simulator.simulate(&sequence);
                goal.accepts(position)
                    .then(|| SimulationResult::new(position, velocity, sequence))
            })
            .collect();
        let chunked = simulate_chunk(&simulator, &goal, candidates);

        assert_eq!(chunked, sequential);
        assert!(chunked.iter().any(Option::is_some));
        assert!(chunked.iter().any(Option::is_none));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn ranked_output_does_not_depend_on_thread_count() {
        let goal = Goal::Beyond {
            position: 1.0,
            direction: GoalDirection::Positive,
        };
        let mut config = right_only_config(20, goal, true);
        config.generation.disabled_key = KeyRestriction::Unrestricted;
        config.generation.seed = Some(7);
        config.permutations = 5_000;

        let single = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap()
            .install(|| run_calm(&config));
        let multi = rayon::ThreadPoolBuilder::new()
            .num_threads(4)
            .build()
            .unwrap()
            .install(|| run_calm(&config));

        assert_eq!(single.mode, GenerationMode::Random);
        assert!(!single.results.is_empty());
        assert_eq!(single.results, multi.results);
    }

    #[test]
    fn notices_record_key_removal_and_memory_stops() {
        let goal = Goal::Beyond {
            position: 0.0,
            direction: GoalDirection::Positive,
        };
        let config = right_only_config(4, goal, false);
        let report = run_calm(&config);
        assert_eq!(report.notices, vec!["Disabled generating L inputs".to_string()]);

        let mut vertical = right_only_config(4, goal, false);
        vertical.axis = Axis::Vertical;
        let report = run_calm(&vertical);
        assert_eq!(
            report.notices,
            vec!["Didn't disable L key since it wouldn't have been generated anyway".to_string()]
        );

        let mut pressured = right_only_config(10, goal, false);
        pressured.generation.disabled_key = KeyRestriction::Unrestricted;
        pressured.memory_guard.exhaustive_activation = 0;
        pressured.memory_guard.check_interval = 1_000;
        let mut probe = ScriptedProbe::pressured();
        let report = run(&pressured, &mut probe, &ProgressReporter::new()).unwrap();
        assert_eq!(
            report.notices,
            vec!["Exiting generating inputs early due to running low on RAM".to_string()]
        );
    }

    #[test]
    fn notices_are_delivered_as_progress_messages() {
        use std::sync::{Arc, Mutex};

        let goal = Goal::Beyond {
            position: 0.0,
            direction: GoalDirection::Positive,
        };
        let config = right_only_config(3, goal, false);
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = messages.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            if let Progress::Message(text) = event {
                sink.lock().unwrap().push(text);
            }
        }));
        let mut probe = ScriptedProbe::calm();
        let report = run(&config, &mut probe, &reporter).unwrap();

        assert_eq!(*messages.lock().unwrap(), report.notices);
    }
}
