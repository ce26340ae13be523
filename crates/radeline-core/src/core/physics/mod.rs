//! # Physics Module
//!
//! Deterministic fixed-timestep integration of Celeste's `Player.NormalUpdate` movement rules
//! for a single axis. Every velocity change goes through [`approach`], and the final
//! position/velocity are rounded with [`round_output`] so that logically identical outcomes
//! compare equal.

pub mod constants;
mod horizontal;
mod vertical;

use crate::core::models::input::{Axis, InputSequence};
use crate::core::models::result::SimulationResult;
use crate::core::models::state::InitialState;

/// Moves `value` towards `target` by at most `max_step`, never overshooting (`Monocle.Calc.Approach`).
#[inline]
pub fn approach(value: f64, target: f64, max_step: f64) -> f64 {
    if value <= target {
        (value + max_step).min(target)
    } else {
        (value - max_step).max(target)
    }
}

/// Rounds to [`constants::OUTPUT_DECIMALS`] places using correctly rounded decimal formatting.
#[inline]
pub fn round_output(value: f64) -> f64 {
    format!("{:.*}", constants::OUTPUT_DECIMALS, value)
        .parse()
        .unwrap_or(value)
}

/// Environment and player-state flags that alter the movement rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsModifiers {
    pub on_ground: bool,
    pub holding: bool,
    /// Forced crouch: grounded frames brake no matter which key is held.
    pub ducking: bool,
    /// Reduced-gravity (space) region.
    pub in_space: bool,
    /// Friction-reduced ground (cold core mode).
    pub cold_core: bool,
    pub auto_jump: bool,
    pub max_fall: f64,
    pub jump_timer: u32,
}

impl Default for PhysicsModifiers {
    fn default() -> Self {
        Self {
            on_ground: false,
            holding: false,
            ducking: false,
            in_space: false,
            cold_core: false,
            auto_jump: false,
            max_fall: constants::MAX_FALL,
            jump_timer: 0,
        }
    }
}

impl PhysicsModifiers {
    /// Horizontal speed cap for the current holding/space state.
    pub fn max_run_speed(&self) -> f64 {
        let max = if self.holding {
            constants::HOLDING_MAX_RUN
        } else {
            constants::MAX_RUN
        };
        if self.in_space {
            max * constants::SPACE_PHYSICS_MULT
        } else {
            max
        }
    }

    /// Multiplier applied to both horizontal acceleration rates.
    pub fn friction_mult(&self) -> f64 {
        let mut mult = if self.on_ground {
            1.0
        } else {
            constants::AIR_MULT
        };
        if self.on_ground && self.cold_core {
            mult *= constants::COLD_CORE_FRICTION_MULT;
        }
        mult
    }

    /// Largest horizontal velocity change a single frame can produce.
    pub fn run_accel_per_frame(&self) -> f64 {
        constants::RUN_ACCEL / constants::FRAME_RATE * self.friction_mult()
    }

    /// Bound on how far horizontal velocity can move in one frame under any key.
    ///
    /// Grounded crouching brakes at the duck friction rate, which cold core does not scale.
    pub fn max_horizontal_change_per_frame(&self) -> f64 {
        let run = self.run_accel_per_frame();
        if self.on_ground {
            run.max(constants::DUCK_FRICTION / constants::FRAME_RATE)
        } else {
            run
        }
    }

    pub fn normal_max_fall(&self) -> f64 {
        self.space_scaled(constants::MAX_FALL)
    }

    pub fn fast_max_fall(&self) -> f64 {
        self.space_scaled(constants::FAST_MAX_FALL)
    }

    /// Full-rate gravity per frame, before the half-gravity apex window.
    pub fn gravity_per_frame(&self) -> f64 {
        self.space_scaled(constants::GRAVITY) / constants::FRAME_RATE
    }

    fn space_scaled(&self, value: f64) -> f64 {
        if self.in_space {
            value * constants::SPACE_PHYSICS_MULT
        } else {
            value
        }
    }
}

/// Maps input sequences to final (position, velocity) pairs for one configured axis.
#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    axis: Axis,
    initial: InitialState,
    modifiers: PhysicsModifiers,
}

impl Simulator {
    pub fn new(axis: Axis, initial: InitialState, modifiers: PhysicsModifiers) -> Self {
        Self {
            axis,
            initial,
            modifiers,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Returns the rounded final `(position, velocity)`.
    pub fn simulate(&self, sequence: &InputSequence) -> (f64, f64) {
        let (position, velocity) = match self.axis {
            Axis::Horizontal => horizontal::simulate(&self.initial, &self.modifiers, sequence),
            Axis::Vertical => vertical::simulate(&self.initial, &self.modifiers, sequence),
        };
        (round_output(position), round_output(velocity))
    }

    pub fn run(&self, sequence: InputSequence) -> SimulationResult {
        let (position, velocity) = self.simulate(&sequence);
        SimulationResult::new(position, velocity, sequence)
    }
}
