use super::input::Axis;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StudioInfoError {
    #[error("Studio info is missing the '{0}' field")]
    MissingField(&'static str),

    #[error("Studio info field '{field}' has an invalid value '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InitialState {
    pub position: f64,
    pub velocity: f64,
}

impl InitialState {
    pub const fn new(position: f64, velocity: f64) -> Self {
        Self { position, velocity }
    }
}

/// Player state copied from the Celeste Studio info panel.
///
/// The panel reads like `Pos: 24.00, 135.25 Speed: 90.00, 0.00 ... MaxFall: 160.00 JumpTimer: 4`.
/// Only the component for the requested axis is kept. Optional fields are `None` when absent so
/// that they fall back to the values configured elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioInfo {
    pub state: InitialState,
    pub auto_jump: Option<bool>,
    pub max_fall: Option<f64>,
    pub jump_timer: Option<u32>,
    pub holding: Option<bool>,
}

impl StudioInfo {
    pub fn parse(text: &str, axis: Axis) -> Result<Self, StudioInfoError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let component = match axis {
            Axis::Horizontal => 1,
            Axis::Vertical => 2,
        };

        let position = number_after(&tokens, "Pos:", "Pos", component)?
            .ok_or(StudioInfoError::MissingField("Pos"))?;
        let velocity = number_after(&tokens, "Speed:", "Speed", component)?
            .ok_or(StudioInfoError::MissingField("Speed"))?;

        let auto_jump = value_after(&tokens, "AutoJump:", 1).map(|v| v == "True");
        let max_fall = number_after(&tokens, "MaxFall:", "MaxFall", 1)?;
        // Studio shows the timer before this frame's decrement.
        let jump_timer = match value_after(&tokens, "JumpTimer:", 1) {
            Some(raw) => {
                let timer: i64 = raw.parse().map_err(|_| StudioInfoError::InvalidValue {
                    field: "JumpTimer",
                    value: raw.to_string(),
                })?;
                Some((timer - 1).clamp(0, i64::from(u32::MAX)) as u32)
            }
            None => None,
        };
        let holding =
            value_after(&tokens, "Holding:", 1).map(|v| v.starts_with("Celeste.Holdable"));

        Ok(Self {
            state: InitialState::new(position, velocity),
            auto_jump,
            max_fall,
            jump_timer,
            holding,
        })
    }
}

fn value_after<'a>(tokens: &[&'a str], label: &str, offset: usize) -> Option<&'a str> {
    let index = tokens.iter().position(|&t| t == label)?;
    tokens.get(index + offset).copied()
}

fn number_after(
    tokens: &[&str],
    label: &str,
    field: &'static str,
    offset: usize,
) -> Result<Option<f64>, StudioInfoError> {
    let Some(raw) = value_after(tokens, label, offset) else {
        if tokens.contains(&label) {
            return Err(StudioInfoError::MissingField(field));
        }
        return Ok(None);
    };
    let cleaned = raw.trim_end_matches(',');
    cleaned
        .parse::<f64>()
        .map(Some)
        .map_err(|_| StudioInfoError::InvalidValue {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUDIO_INFO: &str = "Pos:   -14.50, 129.07\nSpeed: 90.00, -105.00\nVel:   90.00, -105.00\n\
        Stamina: 110 Timer: 0:02.635\nAutoJump: True MaxFall: 172.50 JumpTimer: 9\nHolding: Celeste.Holdable";

    #[test]
    fn parses_horizontal_components() {
        let info = StudioInfo::parse(STUDIO_INFO, Axis::Horizontal).unwrap();
        assert_eq!(info.state, InitialState::new(-14.5, 90.0));
    }

    #[test]
    fn parses_vertical_components_and_optional_fields() {
        let info = StudioInfo::parse(STUDIO_INFO, Axis::Vertical).unwrap();
        assert_eq!(info.state, InitialState::new(129.07, -105.0));
        assert_eq!(info.auto_jump, Some(true));
        assert_eq!(info.max_fall, Some(172.5));
        assert_eq!(info.jump_timer, Some(8));
        assert_eq!(info.holding, Some(true));
    }

    #[test]
    fn optional_fields_are_none_when_absent() {
        let info = StudioInfo::parse("Pos: 1.0, 2.0 Speed: 3.0, 4.0", Axis::Horizontal).unwrap();
        assert_eq!(info.auto_jump, None);
        assert_eq!(info.max_fall, None);
        assert_eq!(info.jump_timer, None);
        assert_eq!(info.holding, None);
    }

    #[test]
    fn jump_timer_of_zero_does_not_underflow() {
        let info = StudioInfo::parse("Pos: 0, 0 Speed: 0, 0 JumpTimer: 0", Axis::Vertical).unwrap();
        assert_eq!(info.jump_timer, Some(0));
    }

    #[test]
    fn missing_speed_is_an_error() {
        let err = StudioInfo::parse("Pos: 1.0, 2.0", Axis::Horizontal).unwrap_err();
        assert_eq!(err, StudioInfoError::MissingField("Speed"));
    }

    #[test]
    fn malformed_number_is_an_error() {
        let err = StudioInfo::parse("Pos: abc, 2.0 Speed: 0, 0", Axis::Horizontal).unwrap_err();
        assert!(matches!(
            err,
            StudioInfoError::InvalidValue { field: "Pos", .. }
        ));
    }
}
