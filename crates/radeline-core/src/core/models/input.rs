use itertools::Itertools;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unrecognized {kind} '{value}', expected one of: {expected}")]
pub struct UnknownVariantError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Axis {
    #[serde(rename = "x", alias = "horizontal")]
    Horizontal,
    #[serde(rename = "y", alias = "vertical")]
    Vertical,
}

impl Axis {
    /// Keys that can be generated on this axis before any reduction.
    ///
    /// `Down` is only meaningful horizontally while grounded, where it ducks and brakes.
    pub fn base_alphabet(self, on_ground: bool) -> Vec<KeySymbol> {
        match self {
            Axis::Horizontal if on_ground => vec![
                KeySymbol::None,
                KeySymbol::Left,
                KeySymbol::Right,
                KeySymbol::Down,
            ],
            Axis::Horizontal => vec![KeySymbol::None, KeySymbol::Left, KeySymbol::Right],
            Axis::Vertical => vec![KeySymbol::None, KeySymbol::Jump, KeySymbol::Down],
        }
    }
}

impl FromStr for Axis {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" | "horizontal" => Ok(Axis::Horizontal),
            "y" | "vertical" => Ok(Axis::Vertical),
            _ => Err(UnknownVariantError {
                kind: "axis",
                value: s.to_string(),
                expected: "x, y",
            }),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => write!(f, "x"),
            Axis::Vertical => write!(f, "y"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeySymbol {
    None,
    Left,
    Right,
    Jump,
    Down,
}

impl KeySymbol {
    /// The label used in printed result lines and input scripts.
    pub const fn label(self) -> &'static str {
        match self {
            KeySymbol::None => "",
            KeySymbol::Left => "l",
            KeySymbol::Right => "r",
            KeySymbol::Jump => "j",
            KeySymbol::Down => "d",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "" => Some(KeySymbol::None),
            "l" => Some(KeySymbol::Left),
            "r" => Some(KeySymbol::Right),
            "j" => Some(KeySymbol::Jump),
            "d" => Some(KeySymbol::Down),
            _ => None,
        }
    }

    /// Horizontal movement direction requested while this key is held.
    pub const fn horizontal_direction(self) -> f64 {
        match self {
            KeySymbol::Left => -1.0,
            KeySymbol::Right => 1.0,
            KeySymbol::None | KeySymbol::Jump | KeySymbol::Down => 0.0,
        }
    }

    pub const fn is_jump(self) -> bool {
        matches!(self, KeySymbol::Jump)
    }

    pub const fn is_down(self) -> bool {
        matches!(self, KeySymbol::Down)
    }
}

impl FromStr for KeySymbol {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let key = match normalized.as_str() {
            "left" => Some(KeySymbol::Left),
            "right" => Some(KeySymbol::Right),
            "jump" | "up" => Some(KeySymbol::Jump),
            "down" => Some(KeySymbol::Down),
            "neutral" => Some(KeySymbol::None),
            other => KeySymbol::from_label(other),
        };
        key.ok_or_else(|| UnknownVariantError {
            kind: "key",
            value: s.to_string(),
            expected: "l, r, j, d, left, right, jump, down, neutral",
        })
    }
}

impl fmt::Display for KeySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeySymbol::None => "NONE",
            KeySymbol::Left => "L",
            KeySymbol::Right => "R",
            KeySymbol::Jump => "J",
            KeySymbol::Down => "D",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputRun {
    pub frames: u32,
    pub key: KeySymbol,
}

impl InputRun {
    pub const fn new(frames: u32, key: KeySymbol) -> Self {
        Self { frames, key }
    }
}

/// A run-length encoded block of per-frame inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputSequence {
    runs: Vec<InputRun>,
}

impl InputSequence {
    pub fn new(runs: Vec<InputRun>) -> Self {
        Self { runs }
    }

    /// Encodes one key per frame into the shortest run list.
    pub fn from_frames(frames: &[KeySymbol]) -> Self {
        let runs = frames
            .iter()
            .dedup_with_count()
            .map(|(count, &key)| InputRun::new(count as u32, key))
            .collect();
        Self { runs }
    }

    pub fn runs(&self) -> &[InputRun] {
        &self.runs
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    pub fn total_frames(&self) -> u64 {
        self.runs.iter().map(|run| u64::from(run.frames)).sum()
    }

    pub fn is_canonical(&self) -> bool {
        self.runs.windows(2).all(|pair| pair[0].key != pair[1].key)
    }

    /// Merges adjacent runs that hold the same key.
    pub fn canonicalize(mut self) -> Self {
        if self.is_canonical() {
            return self;
        }
        let mut merged: Vec<InputRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            match merged.last_mut() {
                Some(last) if last.key == run.key => last.frames += run.frames,
                _ => merged.push(run),
            }
        }
        Self { runs: merged }
    }

    /// Iterates the key held on every frame, in order.
    pub fn frame_keys(&self) -> impl Iterator<Item = KeySymbol> + '_ {
        self.runs
            .iter()
            .flat_map(|run| std::iter::repeat_n(run.key, run.frames as usize))
    }
}

impl From<Vec<InputRun>> for InputSequence {
    fn from(runs: Vec<InputRun>) -> Self {
        Self::new(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use KeySymbol::{Down, Jump, Left, None as Neutral, Right};

    #[test]
    fn from_frames_encodes_maximal_runs() {
        let sequence = InputSequence::from_frames(&[Right, Right, Neutral, Left, Left, Left]);
        assert_eq!(
            sequence.runs(),
            &[
                InputRun::new(2, Right),
                InputRun::new(1, Neutral),
                InputRun::new(3, Left)
            ]
        );
        assert_eq!(sequence.total_frames(), 6);
        assert!(sequence.is_canonical());
    }

    #[test]
    fn canonicalize_merges_adjacent_runs_with_the_same_key() {
        let sequence = InputSequence::new(vec![
            InputRun::new(2, Jump),
            InputRun::new(1, Jump),
            InputRun::new(4, Down),
            InputRun::new(1, Down),
            InputRun::new(2, Jump),
        ]);
        assert!(!sequence.is_canonical());

        let canonical = sequence.canonicalize();
        assert_eq!(
            canonical.runs(),
            &[
                InputRun::new(3, Jump),
                InputRun::new(5, Down),
                InputRun::new(2, Jump)
            ]
        );
        assert_eq!(canonical.total_frames(), 10);
    }

    #[test]
    fn frame_keys_expands_runs() {
        let sequence = InputSequence::new(vec![InputRun::new(2, Left), InputRun::new(1, Right)]);
        let frames: Vec<_> = sequence.frame_keys().collect();
        assert_eq!(frames, vec![Left, Left, Right]);
    }

    #[test]
    fn base_alphabet_includes_down_only_when_grounded_on_x() {
        assert_eq!(Axis::Horizontal.base_alphabet(false).len(), 3);
        assert!(Axis::Horizontal.base_alphabet(true).contains(&Down));
        assert_eq!(
            Axis::Vertical.base_alphabet(true),
            vec![Neutral, Jump, Down]
        );
    }

    #[test]
    fn key_symbol_parses_labels_and_names() {
        assert_eq!("l".parse::<KeySymbol>().unwrap(), Left);
        assert_eq!("Jump".parse::<KeySymbol>().unwrap(), Jump);
        assert_eq!("".parse::<KeySymbol>().unwrap(), Neutral);
        assert!("q".parse::<KeySymbol>().is_err());
    }

    #[test]
    fn axis_rejects_unknown_values() {
        assert_eq!("X".parse::<Axis>().unwrap(), Axis::Horizontal);
        let err = "z".parse::<Axis>().unwrap_err();
        assert_eq!(err.kind, "axis");
    }
}
