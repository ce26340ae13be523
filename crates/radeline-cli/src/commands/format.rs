use crate::cli::FormatArgs;
use crate::config::{DefaultsConfig, PartialSearchConfig};
use crate::error::{CliError, Result};
use radeline::core::io::script;
use std::io::{self, Read, Write};
use tracing::debug;

pub fn run(args: FormatArgs) -> Result<()> {
    let append_keys = resolve_append_keys(&args)?;
    let line = match args.line {
        Some(line) => line,
        None => {
            debug!("Reading result line from stdin");
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", convert(&line, &append_keys)?)?;
    Ok(())
}

/// The `--append-keys` flag wins over `output.append-keys` in the config file.
fn resolve_append_keys(args: &FormatArgs) -> Result<String> {
    if let Some(keys) = &args.append_keys {
        return Ok(keys.clone());
    }
    let partial = PartialSearchConfig::load(args.config.as_deref())?;
    Ok(partial
        .append_keys()
        .map(str::to_string)
        .unwrap_or_else(|| DefaultsConfig::default().append_keys))
}

fn convert(text: &str, append_keys: &str) -> Result<String> {
    let line = text.trim();
    if line.is_empty() {
        return Err(CliError::Argument("No result line given".to_string()));
    }
    Ok(script::convert_line(line, append_keys)?)
}
