use crate::core::models::input::{InputRun, InputSequence, KeySymbol};
use crate::core::models::result::SimulationResult;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("No input list found (expected '[[frames, 'key'], ...]')")]
    MissingList,

    #[error("Unexpected input at column {column}: expected {expected}")]
    Unexpected {
        column: usize,
        expected: &'static str,
    },

    #[error("Invalid frame count '{0}'")]
    InvalidFrames(String),

    #[error("Unknown key label '{0}'")]
    UnknownKey(String),
}

/// Formats a float the way the original result files do: shortest round-trip digits,
/// always with a fractional part, and a signed two-digit exponent outside `[1e-4, 1e16)`.
pub fn format_float(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-4..1e16).contains(&magnitude) || !value.is_finite() {
        return format!("{value:?}");
    }

    let scientific = format!("{value:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => scientific,
    }
}

/// Runs as displayed: adjacent runs with the same key are merged.
pub fn display_runs(sequence: &InputSequence) -> Vec<InputRun> {
    sequence.clone().canonicalize().runs().to_vec()
}

pub fn render_runs(runs: &[InputRun]) -> String {
    let groups: Vec<String> = runs
        .iter()
        .map(|run| format!("[{}, '{}']", run.frames, run.key.label()))
        .collect();
    format!("[{}]", groups.join(", "))
}

pub fn render(result: &SimulationResult) -> String {
    format!(
        "({}, {}) {}",
        format_float(result.position),
        format_float(result.velocity),
        render_runs(&display_runs(&result.sequence))
    )
}

pub fn write_to(result: &SimulationResult, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "{}", render(result))
}

/// Extracts the input runs from a result line, or from a bare `[[...]]` list.
pub fn parse_runs(line: &str) -> Result<Vec<InputRun>, FormatError> {
    let start = line.find("[[").ok_or(FormatError::MissingList)?;
    let mut cursor = Cursor {
        text: line,
        pos: start,
    };

    cursor.expect('[', "'['")?;
    let mut runs = Vec::new();
    loop {
        cursor.skip_whitespace();
        cursor.expect('[', "'['")?;
        cursor.skip_whitespace();
        let frames_text = cursor.take_while(|c| c.is_ascii_digit());
        let frames: u32 = frames_text
            .parse()
            .ok()
            .filter(|&f| f > 0)
            .ok_or_else(|| FormatError::InvalidFrames(frames_text.to_string()))?;
        cursor.skip_whitespace();
        cursor.expect(',', "','")?;
        cursor.skip_whitespace();
        cursor.expect('\'', "a quoted key label")?;
        let label = cursor.take_while(|c| c != '\'');
        cursor.expect('\'', "a closing quote")?;
        let key = KeySymbol::from_label(label)
            .ok_or_else(|| FormatError::UnknownKey(label.to_string()))?;
        cursor.skip_whitespace();
        cursor.expect(']', "']'")?;
        runs.push(InputRun::new(frames, key));

        cursor.skip_whitespace();
        match cursor.peek() {
            Some(',') => cursor.pos += 1,
            Some(']') => break,
            _ => {
                return Err(FormatError::Unexpected {
                    column: cursor.pos,
                    expected: "',' or ']'",
                });
            }
        }
    }
    Ok(runs)
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let rest = &self.text[self.pos..];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !predicate(c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        &rest[..len]
    }

    fn expect(&mut self, expected_char: char, expected: &'static str) -> Result<(), FormatError> {
        if self.peek() == Some(expected_char) {
            self.pos += expected_char.len_utf8();
            Ok(())
        } else {
            Err(FormatError::Unexpected {
                column: self.pos,
                expected,
            })
        }
    }
}
