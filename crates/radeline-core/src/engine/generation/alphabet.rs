use crate::core::models::input::{Axis, KeySymbol};
use crate::engine::config::{KeyRestriction, SearchConfig};
use crate::core::physics::constants::HALF_GRAV_THRESHOLD;
use std::fmt;
use tracing::debug;

/// The ordered set of keys a search draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    keys: Vec<KeySymbol>,
    disabled: Option<KeySymbol>,
}

impl Alphabet {
    pub fn new(keys: Vec<KeySymbol>) -> Self {
        Self {
            keys,
            disabled: None,
        }
    }

    /// Base alphabet for the configured axis, minus the key removed by the configured restriction.
    pub fn for_config(config: &SearchConfig) -> Self {
        let mut keys = config.axis.base_alphabet(config.physics.on_ground);
        let disabled = match config.generation.disabled_key {
            KeyRestriction::Unrestricted => None,
            KeyRestriction::Auto => redundant_key(config),
            KeyRestriction::Disable(key) if keys.contains(&key) => Some(key),
            KeyRestriction::Disable(key) => {
                debug!("{} is not in the {} axis alphabet; nothing to disable", key, config.axis);
                None
            }
        };
        if let Some(key) = disabled {
            keys.retain(|&k| k != key);
            debug!("Removed {} from the alphabet", key);
        }
        Self { keys, disabled }
    }

    pub fn keys(&self) -> &[KeySymbol] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn disabled(&self) -> Option<KeySymbol> {
        self.disabled
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.keys.iter().map(ToString::to_string).collect();
        write!(f, "{{{}}}", labels.join(", "))
    }
}

/// A key that provably cannot change the outcome within the frame budget, if any.
pub fn redundant_key(config: &SearchConfig) -> Option<KeySymbol> {
    let v0 = config.initial.velocity;
    let frames = f64::from(config.frames);
    let physics = &config.physics;

    match config.axis {
        Axis::Horizontal => {
            // Velocity cannot cross zero, so pushing backwards only ever decelerates.
            if v0.abs() > frames * physics.max_horizontal_change_per_frame() {
                Some(if v0 > 0.0 {
                    KeySymbol::Left
                } else {
                    KeySymbol::Right
                })
            } else {
                None
            }
        }
        Axis::Vertical => {
            if v0 > HALF_GRAV_THRESHOLD && physics.jump_timer == 0 && !physics.auto_jump {
                Some(KeySymbol::Jump)
            } else if v0 + frames * physics.gravity_per_frame() <= physics.normal_max_fall() {
                Some(KeySymbol::Down)
            } else {
                None
            }
        }
    }
}
