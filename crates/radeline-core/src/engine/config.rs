use crate::core::models::input::{Axis, KeySymbol, UnknownVariantError};
use crate::core::models::state::{InitialState, StudioInfo, StudioInfoError};
use crate::core::physics::{PhysicsModifiers, Simulator};
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(transparent)]
    UnknownVariant(#[from] UnknownVariantError),

    #[error("Malformed initial state: {0}")]
    InitialState(#[from] StudioInfoError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum GoalDirection {
    #[serde(rename = "-", alias = "negative")]
    Negative,
    #[serde(rename = "+", alias = "positive")]
    Positive,
}

impl FromStr for GoalDirection {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "-" | "negative" => Ok(GoalDirection::Negative),
            "+" | "positive" => Ok(GoalDirection::Positive),
            _ => Err(UnknownVariantError {
                kind: "goal direction",
                value: s.to_string(),
                expected: "-, +",
            }),
        }
    }
}

/// Acceptance criterion on the final position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Goal {
    /// Strictly past `position` on the `direction` side.
    Beyond {
        position: f64,
        direction: GoalDirection,
    },
    /// Inside the inclusive band `[min, max]`.
    Within { min: f64, max: f64 },
}

impl Goal {
    #[inline]
    pub fn accepts(&self, position: f64) -> bool {
        match *self {
            Goal::Beyond {
                position: goal,
                direction: GoalDirection::Negative,
            } => position < goal,
            Goal::Beyond {
                position: goal,
                direction: GoalDirection::Positive,
            } => position > goal,
            Goal::Within { min, max } => (min..=max).contains(&position),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankPriority {
    #[default]
    Position,
    Velocity,
}

impl FromStr for RankPriority {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "position" => Ok(RankPriority::Position),
            "velocity" | "speed" => Ok(RankPriority::Velocity),
            _ => Err(UnknownVariantError {
                kind: "rank priority",
                value: s.to_string(),
                expected: "position, velocity",
            }),
        }
    }
}

/// Which keys are excluded from generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyRestriction {
    /// Drop a key only when it provably cannot affect the outcome.
    #[default]
    Auto,
    Unrestricted,
    Disable(KeySymbol),
}

impl FromStr for KeyRestriction {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(KeyRestriction::Auto),
            "none" | "off" => Ok(KeyRestriction::Unrestricted),
            "" => Err(UnknownVariantError {
                kind: "disabled key",
                value: s.to_string(),
                expected: "auto, none, l, r, j, d",
            }),
            other => other.parse().map(KeyRestriction::Disable),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    /// Frame budget at or above which two-key alphabets switch to random generation.
    pub rng_threshold: u32,
    /// Same for three-key alphabets; four-key alphabets use this minus two.
    pub rng_threshold_slow: u32,
    /// Bias random run lengths towards short runs.
    pub triangular: bool,
    pub seed: Option<u64>,
    pub disabled_key: KeyRestriction,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            rng_threshold: 20,
            rng_threshold_slow: 14,
            triangular: false,
            seed: None,
            disabled_key: KeyRestriction::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLimits {
    pub max_resident_bytes: u64,
    pub min_available_bytes: u64,
}

impl Default for MemoryLimits {
    fn default() -> Self {
        Self {
            max_resident_bytes: 1_800_000_000,
            min_available_bytes: 200_000_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryGuardConfig {
    pub enabled: bool,
    pub check_interval: u64,
    /// Exhaustive searches larger than this many permutations are guarded.
    pub exhaustive_activation: u64,
    /// Random searches expected to produce more than this many permutations are guarded.
    pub random_activation: u64,
    pub limits: MemoryLimits,
}

impl Default for MemoryGuardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval: 100_000,
            exhaustive_activation: 3_000_000,
            random_activation: 5_000_000,
            limits: MemoryLimits::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub axis: Axis,
    pub frames: u32,
    pub permutations: usize,
    pub goal: Goal,
    pub goal_velocity: f64,
    pub initial: InitialState,
    pub physics: PhysicsModifiers,
    pub priority: RankPriority,
    pub hide_duplicates: bool,
    pub generation: GenerationConfig,
    pub memory_guard: MemoryGuardConfig,
}

impl SearchConfig {
    pub fn simulator(&self) -> Simulator {
        Simulator::new(self.axis, self.initial, self.physics)
    }
}

pub const DEFAULT_PERMUTATIONS: usize = 1_000_000;

#[derive(Default)]
pub struct SearchConfigBuilder {
    axis: Option<Axis>,
    frames: Option<u32>,
    permutations: Option<usize>,
    goal: Option<Goal>,
    goal_velocity: Option<f64>,
    initial: Option<InitialState>,
    physics: PhysicsModifiers,
    priority: Option<RankPriority>,
    hide_duplicates: Option<bool>,
    generation: GenerationConfig,
    memory_guard: MemoryGuardConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }
    pub fn frames(mut self, frames: u32) -> Self {
        self.frames = Some(frames);
        self
    }
    pub fn permutations(mut self, permutations: usize) -> Self {
        self.permutations = Some(permutations);
        self
    }
    pub fn goal(mut self, goal: Goal) -> Self {
        self.goal = Some(goal);
        self
    }
    pub fn goal_velocity(mut self, velocity: f64) -> Self {
        self.goal_velocity = Some(velocity);
        self
    }
    pub fn initial_state(mut self, state: InitialState) -> Self {
        self.initial = Some(state);
        self
    }
    pub fn physics(mut self, physics: PhysicsModifiers) -> Self {
        self.physics = physics;
        self
    }
    pub fn priority(mut self, priority: RankPriority) -> Self {
        self.priority = Some(priority);
        self
    }
    pub fn hide_duplicates(mut self, hide: bool) -> Self {
        self.hide_duplicates = Some(hide);
        self
    }
    pub fn generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }
    pub fn memory_guard(mut self, memory_guard: MemoryGuardConfig) -> Self {
        self.memory_guard = memory_guard;
        self
    }

    /// Takes the initial state from Studio info, letting any fields it carries
    /// override the physics modifiers set so far.
    pub fn studio_info(mut self, info: StudioInfo) -> Self {
        self.initial = Some(info.state);
        if let Some(auto_jump) = info.auto_jump {
            self.physics.auto_jump = auto_jump;
        }
        if let Some(max_fall) = info.max_fall {
            self.physics.max_fall = max_fall;
        }
        if let Some(jump_timer) = info.jump_timer {
            self.physics.jump_timer = jump_timer;
        }
        if let Some(holding) = info.holding {
            self.physics.holding = holding;
        }
        self
    }

    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let axis = self.axis.ok_or(ConfigError::MissingParameter("axis"))?;
        let frames = self.frames.ok_or(ConfigError::MissingParameter("frames"))?;
        let goal = self.goal.ok_or(ConfigError::MissingParameter("goal"))?;
        let initial = self
            .initial
            .ok_or(ConfigError::MissingParameter("initial_state"))?;
        let permutations = self.permutations.unwrap_or(DEFAULT_PERMUTATIONS);
        let goal_velocity = self.goal_velocity.unwrap_or(0.0);

        if frames == 0 {
            return Err(invalid("frames", "must be at least 1"));
        }
        if permutations == 0 {
            return Err(invalid("permutations", "must be at least 1"));
        }
        match goal {
            Goal::Beyond { position, .. } => ensure_finite("goal.position", position)?,
            Goal::Within { min, max } => {
                ensure_finite("goal.min", min)?;
                ensure_finite("goal.max", max)?;
                if min > max {
                    return Err(invalid(
                        "goal",
                        format!("band minimum {min} is greater than maximum {max}"),
                    ));
                }
            }
        }
        ensure_finite("goal_velocity", goal_velocity)?;
        ensure_finite("initial_state.position", initial.position)?;
        ensure_finite("initial_state.velocity", initial.velocity)?;
        ensure_finite("physics.max_fall", self.physics.max_fall)?;
        if self.memory_guard.check_interval == 0 {
            return Err(invalid("memory_guard.check_interval", "must be at least 1"));
        }

        Ok(SearchConfig {
            axis,
            frames,
            permutations,
            goal,
            goal_velocity,
            initial,
            physics: self.physics,
            priority: self.priority.unwrap_or_default(),
            hide_duplicates: self.hide_duplicates.unwrap_or(true),
            generation: self.generation,
            memory_guard: self.memory_guard,
        })
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

fn ensure_finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(name, format!("{value} is not a finite number")))
    }
}
