use super::result_line::{self, FormatError};
use crate::core::models::input::InputRun;

/// One `"<frames> <label><append_keys>"` line per run.
pub fn to_input_script(runs: &[InputRun], append_keys: &str) -> String {
    runs.iter()
        .map(|run| format!("{} {}{}", run.frames, run.key.label(), append_keys))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Converts a printed result line straight into input-script text.
pub fn convert_line(line: &str, append_keys: &str) -> Result<String, FormatError> {
    let runs = result_line::parse_runs(line)?;
    Ok(to_input_script(&runs, append_keys))
}
