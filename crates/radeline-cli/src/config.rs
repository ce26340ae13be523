mod defaults;
mod models;

pub use defaults::DefaultsConfig;
pub use models::{AppConfig, OutputSettings};

use crate::cli::SearchArgs;
use crate::error::{CliError, Result};
use radeline::core::models::input::Axis;
use radeline::core::models::state::{InitialState, StudioInfo};
use radeline::core::physics::PhysicsModifiers;
use radeline::engine::config::{self as core_config, Goal, GoalDirection, RankPriority};
use serde::Deserialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSearchSection {
    axis: Option<Axis>,
    frames: Option<u32>,
    permutations: Option<usize>,
    priority: Option<RankPriority>,
    hide_duplicates: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialGoalConfig {
    position: Option<f64>,
    direction: Option<GoalDirection>,
    min: Option<f64>,
    max: Option<f64>,
    velocity: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialInitialState {
    position: Option<f64>,
    velocity: Option<f64>,
    studio_info: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialPhysicsConfig {
    on_ground: Option<bool>,
    holding: Option<bool>,
    ducking: Option<bool>,
    in_space: Option<bool>,
    cold_core: Option<bool>,
    auto_jump: Option<bool>,
    max_fall: Option<f64>,
    jump_timer: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialGenerationConfig {
    rng_threshold: Option<u32>,
    rng_threshold_slow: Option<u32>,
    triangular: Option<bool>,
    seed: Option<u64>,
    disabled_key: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialOutputConfig {
    path: Option<PathBuf>,
    silent: Option<bool>,
    append_keys: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialMemoryGuardConfig {
    enabled: Option<bool>,
    check_interval: Option<u64>,
    exhaustive_activation: Option<u64>,
    random_activation: Option<u64>,
    max_resident_bytes: Option<u64>,
    min_available_bytes: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialSearchConfig {
    search: Option<PartialSearchSection>,
    goal: Option<PartialGoalConfig>,
    initial_state: Option<PartialInitialState>,
    physics: Option<PartialPhysicsConfig>,
    generation: Option<PartialGenerationConfig>,
    output: Option<PartialOutputConfig>,
    memory_guard: Option<PartialMemoryGuardConfig>,
}

impl PartialSearchConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads the file if one was given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn append_keys(&self) -> Option<&str> {
        self.output.as_ref()?.append_keys.as_deref()
    }

    /// Resolves the final configuration with precedence file < command-line flags < `--set`.
    pub fn merge_with_cli(mut self, args: &SearchArgs) -> Result<AppConfig> {
        self.apply_cli_args(args);
        self.apply_set_values(&args.set_values)?;
        self.into_app_config()
    }

    fn apply_cli_args(&mut self, args: &SearchArgs) {
        let search = self.search.get_or_insert_with(Default::default);
        override_with(&mut search.axis, args.axis);
        override_with(&mut search.frames, args.frames);
        override_with(&mut search.permutations, args.permutations);
        if args.prioritize_velocity {
            search.priority = Some(RankPriority::Velocity);
        }
        if args.show_duplicates {
            search.hide_duplicates = Some(false);
        }

        let goal = self.goal.get_or_insert_with(Default::default);
        override_with(&mut goal.position, args.goal_position);
        override_with(&mut goal.direction, args.goal_direction);
        override_with(&mut goal.min, args.goal_min);
        override_with(&mut goal.max, args.goal_max);
        override_with(&mut goal.velocity, args.goal_velocity);

        let initial = self.initial_state.get_or_insert_with(Default::default);
        if args.studio_info.is_some() {
            initial.position = None;
            initial.velocity = None;
            initial.studio_info = args.studio_info.clone();
        } else if args.position.is_some() || args.velocity.is_some() {
            initial.studio_info = None;
            override_with(&mut initial.position, args.position);
            override_with(&mut initial.velocity, args.velocity);
        }

        let physics = self.physics.get_or_insert_with(Default::default);
        if args.on_ground {
            physics.on_ground = Some(true);
        }
        if args.holding {
            physics.holding = Some(true);
        }

        let generation = self.generation.get_or_insert_with(Default::default);
        override_with(&mut generation.seed, args.seed);
        if let Some(key) = args.disabled_key {
            generation.disabled_key = Some(restriction_label(key));
        }
        if args.triangular {
            generation.triangular = Some(true);
        }

        let output = self.output.get_or_insert_with(Default::default);
        override_with(&mut output.path, args.output.clone());
        if args.silent {
            output.silent = Some(true);
        }

        if args.no_memory_guard {
            self.memory_guard.get_or_insert_with(Default::default).enabled = Some(false);
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "search.axis" => self.search.get_or_insert_with(Default::default).axis = Some(parse(key, value)?),
                "search.frames" => self.search.get_or_insert_with(Default::default).frames = Some(parse(key, value)?),
                "search.permutations" => {
                    self.search.get_or_insert_with(Default::default).permutations = Some(parse(key, value)?)
                }
                "search.priority" => {
                    self.search.get_or_insert_with(Default::default).priority = Some(parse(key, value)?)
                }
                "search.hide-duplicates" => {
                    self.search.get_or_insert_with(Default::default).hide_duplicates = Some(parse(key, value)?)
                }
                "goal.position" => self.goal.get_or_insert_with(Default::default).position = Some(parse(key, value)?),
                "goal.direction" => self.goal.get_or_insert_with(Default::default).direction = Some(parse(key, value)?),
                "goal.min" => self.goal.get_or_insert_with(Default::default).min = Some(parse(key, value)?),
                "goal.max" => self.goal.get_or_insert_with(Default::default).max = Some(parse(key, value)?),
                "goal.velocity" => self.goal.get_or_insert_with(Default::default).velocity = Some(parse(key, value)?),
                "initial-state.position" => {
                    self.initial_state.get_or_insert_with(Default::default).position = Some(parse(key, value)?)
                }
                "initial-state.velocity" => {
                    self.initial_state.get_or_insert_with(Default::default).velocity = Some(parse(key, value)?)
                }
                "initial-state.studio-info" => {
                    self.initial_state.get_or_insert_with(Default::default).studio_info = Some(value.to_string())
                }
                "physics.on-ground" => self.physics.get_or_insert_with(Default::default).on_ground = Some(parse(key, value)?),
                "physics.holding" => self.physics.get_or_insert_with(Default::default).holding = Some(parse(key, value)?),
                "physics.ducking" => self.physics.get_or_insert_with(Default::default).ducking = Some(parse(key, value)?),
                "physics.in-space" => self.physics.get_or_insert_with(Default::default).in_space = Some(parse(key, value)?),
                "physics.cold-core" => self.physics.get_or_insert_with(Default::default).cold_core = Some(parse(key, value)?),
                "physics.auto-jump" => self.physics.get_or_insert_with(Default::default).auto_jump = Some(parse(key, value)?),
                "physics.max-fall" => self.physics.get_or_insert_with(Default::default).max_fall = Some(parse(key, value)?),
                "physics.jump-timer" => {
                    self.physics.get_or_insert_with(Default::default).jump_timer = Some(parse(key, value)?)
                }
                "generation.rng-threshold" => {
                    self.generation.get_or_insert_with(Default::default).rng_threshold = Some(parse(key, value)?)
                }
                "generation.rng-threshold-slow" => {
                    self.generation.get_or_insert_with(Default::default).rng_threshold_slow = Some(parse(key, value)?)
                }
                "generation.triangular" => {
                    self.generation.get_or_insert_with(Default::default).triangular = Some(parse(key, value)?)
                }
                "generation.seed" => self.generation.get_or_insert_with(Default::default).seed = Some(parse(key, value)?),
                "generation.disabled-key" => {
                    self.generation.get_or_insert_with(Default::default).disabled_key = Some(value.to_string())
                }
                "output.path" => self.output.get_or_insert_with(Default::default).path = Some(PathBuf::from(value)),
                "output.silent" => self.output.get_or_insert_with(Default::default).silent = Some(parse(key, value)?),
                "output.append-keys" => {
                    self.output.get_or_insert_with(Default::default).append_keys = Some(value.to_string())
                }
                "memory-guard.enabled" => {
                    self.memory_guard.get_or_insert_with(Default::default).enabled = Some(parse(key, value)?)
                }
                "memory-guard.check-interval" => {
                    self.memory_guard.get_or_insert_with(Default::default).check_interval = Some(parse(key, value)?)
                }
                "memory-guard.exhaustive-activation" => {
                    self.memory_guard.get_or_insert_with(Default::default).exhaustive_activation =
                        Some(parse(key, value)?)
                }
                "memory-guard.random-activation" => {
                    self.memory_guard.get_or_insert_with(Default::default).random_activation = Some(parse(key, value)?)
                }
                "memory-guard.max-resident-bytes" => {
                    self.memory_guard.get_or_insert_with(Default::default).max_resident_bytes = Some(parse(key, value)?)
                }
                "memory-guard.min-available-bytes" => {
                    self.memory_guard.get_or_insert_with(Default::default).min_available_bytes =
                        Some(parse(key, value)?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn into_app_config(self) -> Result<AppConfig> {
        let defaults = DefaultsConfig::default();
        let search = self.search.unwrap_or_default();
        let goal_config = self.goal.unwrap_or_default();
        let initial = self.initial_state.unwrap_or_default();
        let physics_config = self.physics.unwrap_or_default();
        let generation_config = self.generation.unwrap_or_default();
        let output_config = self.output.unwrap_or_default();
        let guard_config = self.memory_guard.unwrap_or_default();

        let axis = search
            .axis
            .ok_or_else(|| CliError::Config("`search.axis` is required.".to_string()))?;
        let frames = search
            .frames
            .ok_or_else(|| CliError::Config("`search.frames` is required.".to_string()))?;

        let goal = Self::merge_goal(&goal_config)?;
        let physics = Self::merge_physics(&physics_config);
        let generation = Self::merge_generation(&generation_config)?;
        let memory_guard = Self::merge_memory_guard(&guard_config);

        let mut builder = core_config::SearchConfigBuilder::new()
            .axis(axis)
            .frames(frames)
            .goal(goal)
            .goal_velocity(goal_config.velocity.unwrap_or(defaults.goal_velocity))
            .physics(physics)
            .generation(generation)
            .memory_guard(memory_guard);
        if let Some(permutations) = search.permutations {
            builder = builder.permutations(permutations);
        }
        if let Some(priority) = search.priority {
            builder = builder.priority(priority);
        }
        if let Some(hide) = search.hide_duplicates {
            builder = builder.hide_duplicates(hide);
        }
        builder = Self::merge_initial_state(builder, initial, axis)?;

        let core_config = builder.build().map_err(|e| CliError::Config(e.to_string()))?;

        Ok(AppConfig {
            output: OutputSettings {
                results_path: output_config.path.unwrap_or(defaults.results_path),
                silent: output_config.silent.unwrap_or(defaults.silent_output),
            },
            core_config,
        })
    }

    fn merge_goal(partial: &PartialGoalConfig) -> Result<Goal> {
        match (partial.position, partial.min, partial.max) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(CliError::Config(
                "`goal` takes either `position` and `direction` or `min` and `max`, not both."
                    .to_string(),
            )),
            (Some(position), None, None) => {
                let direction = partial.direction.ok_or_else(|| {
                    CliError::Config("`goal.direction` is required with `goal.position`.".to_string())
                })?;
                Ok(Goal::Beyond {
                    position,
                    direction,
                })
            }
            (None, Some(min), Some(max)) => Ok(Goal::Within { min, max }),
            (None, Some(_), None) | (None, None, Some(_)) => Err(CliError::Config(
                "`goal.min` and `goal.max` must be given together.".to_string(),
            )),
            (None, None, None) => Err(CliError::Config(
                "A goal is required: set `goal.position` and `goal.direction`, or `goal.min` and `goal.max`."
                    .to_string(),
            )),
        }
    }

    fn merge_initial_state(
        builder: core_config::SearchConfigBuilder,
        partial: PartialInitialState,
        axis: Axis,
    ) -> Result<core_config::SearchConfigBuilder> {
        match (partial.studio_info, partial.position, partial.velocity) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(CliError::Config(
                "`initial-state` takes either `studio-info` or `position` and `velocity`, not both."
                    .to_string(),
            )),
            (Some(text), None, None) => {
                let info = StudioInfo::parse(&text, axis)
                    .map_err(|e| CliError::Config(core_config::ConfigError::from(e).to_string()))?;
                debug!("Initial state from studio info: {:?}", info);
                Ok(builder.studio_info(info))
            }
            (None, Some(position), Some(velocity)) => {
                Ok(builder.initial_state(InitialState::new(position, velocity)))
            }
            (None, _, _) => Err(CliError::Config(
                "`initial-state` requires `studio-info`, or both `position` and `velocity`."
                    .to_string(),
            )),
        }
    }

    fn merge_physics(partial: &PartialPhysicsConfig) -> PhysicsModifiers {
        let defaults = PhysicsModifiers::default();
        PhysicsModifiers {
            on_ground: partial.on_ground.unwrap_or(defaults.on_ground),
            holding: partial.holding.unwrap_or(defaults.holding),
            ducking: partial.ducking.unwrap_or(defaults.ducking),
            in_space: partial.in_space.unwrap_or(defaults.in_space),
            cold_core: partial.cold_core.unwrap_or(defaults.cold_core),
            auto_jump: partial.auto_jump.unwrap_or(defaults.auto_jump),
            max_fall: partial.max_fall.unwrap_or(defaults.max_fall),
            jump_timer: partial.jump_timer.unwrap_or(defaults.jump_timer),
        }
    }

    fn merge_generation(partial: &PartialGenerationConfig) -> Result<core_config::GenerationConfig> {
        let defaults = core_config::GenerationConfig::default();
        let disabled_key = match partial.disabled_key.as_deref() {
            Some(raw) => raw
                .parse()
                .map_err(|e: radeline::core::models::input::UnknownVariantError| {
                    CliError::Config(e.to_string())
                })?,
            None => defaults.disabled_key,
        };
        Ok(core_config::GenerationConfig {
            rng_threshold: partial.rng_threshold.unwrap_or(defaults.rng_threshold),
            rng_threshold_slow: partial.rng_threshold_slow.unwrap_or(defaults.rng_threshold_slow),
            triangular: partial.triangular.unwrap_or(defaults.triangular),
            seed: partial.seed.or(defaults.seed),
            disabled_key,
        })
    }

    fn merge_memory_guard(partial: &PartialMemoryGuardConfig) -> core_config::MemoryGuardConfig {
        let defaults = core_config::MemoryGuardConfig::default();
        core_config::MemoryGuardConfig {
            enabled: partial.enabled.unwrap_or(defaults.enabled),
            check_interval: partial.check_interval.unwrap_or(defaults.check_interval),
            exhaustive_activation: partial
                .exhaustive_activation
                .unwrap_or(defaults.exhaustive_activation),
            random_activation: partial.random_activation.unwrap_or(defaults.random_activation),
            limits: core_config::MemoryLimits {
                max_resident_bytes: partial
                    .max_resident_bytes
                    .unwrap_or(defaults.limits.max_resident_bytes),
                min_available_bytes: partial
                    .min_available_bytes
                    .unwrap_or(defaults.limits.min_available_bytes),
            },
        }
    }
}

fn override_with<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn restriction_label(restriction: core_config::KeyRestriction) -> String {
    match restriction {
        core_config::KeyRestriction::Auto => "auto".to_string(),
        core_config::KeyRestriction::Unrestricted => "none".to_string(),
        core_config::KeyRestriction::Disable(key) => key.label().to_string(),
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| CliError::Config(format!("Invalid value for {}: '{}' ({})", key, value, e)))
}
