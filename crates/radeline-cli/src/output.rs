use crate::error::Result;
use radeline::core::io::result_line;
use radeline::core::models::result::SimulationResult;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes lines to the results artifact and, unless silenced, mirrors them to a console stream.
///
/// The artifact is always written; the console mirror can be switched off per line so that the
/// summary reaches the console even when the result lines do not.
pub struct ResultsWriter<F: Write, C: Write> {
    file: F,
    console: C,
    mirror_results: bool,
}

impl ResultsWriter<BufWriter<File>, io::Stdout> {
    /// Creates (or truncates) the results file at `path`, mirroring to stdout.
    pub fn create(path: &Path, silent: bool) -> Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        Ok(Self::new(file, io::stdout(), !silent))
    }
}

impl<F: Write, C: Write> ResultsWriter<F, C> {
    pub fn new(file: F, console: C, mirror_results: bool) -> Self {
        Self {
            file,
            console,
            mirror_results,
        }
    }

    pub fn write_result(&mut self, result: &SimulationResult) -> Result<()> {
        let line = result_line::render(result);
        self.write_line(&line, self.mirror_results)
    }

    /// Notices go to the artifact only; the console already shows them as progress messages.
    pub fn write_notice(&mut self, line: &str) -> Result<()> {
        self.write_line(line, false)
    }

    /// Summary lines go to both sinks regardless of silencing.
    pub fn write_summary(&mut self, line: &str) -> Result<()> {
        self.write_line(line, true)
    }

    fn write_line(&mut self, line: &str, to_console: bool) -> Result<()> {
        writeln!(self.file, "{}", line)?;
        if to_console {
            writeln!(self.console, "{}", line)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<(F, C)> {
        self.file.flush()?;
        self.console.flush()?;
        Ok((self.file, self.console))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radeline::core::models::input::{InputRun, InputSequence, KeySymbol};

    fn sample() -> SimulationResult {
        SimulationResult::new(
            12.5,
            90.0,
            InputSequence::new(vec![
                InputRun::new(2, KeySymbol::Right),
                InputRun::new(3, KeySymbol::None),
            ]),
        )
    }

    #[test]
    fn results_are_mirrored_when_not_silent() {
        let mut writer = ResultsWriter::new(Vec::new(), Vec::new(), true);
        writer.write_result(&sample()).unwrap();
        let (file, console) = writer.finish().unwrap();
        assert_eq!(file, console);
        assert_eq!(
            String::from_utf8(file).unwrap(),
            "(12.5, 90.0) [[2, 'r'], [3, '']]\n"
        );
    }

    #[test]
    fn silent_writer_still_persists_results_and_prints_summary() {
        let mut writer = ResultsWriter::new(Vec::new(), Vec::new(), false);
        writer.write_result(&sample()).unwrap();
        writer.write_summary("Shown permutations: 1").unwrap();
        let (file, console) = writer.finish().unwrap();

        let file = String::from_utf8(file).unwrap();
        let console = String::from_utf8(console).unwrap();
        assert!(file.starts_with("(12.5, 90.0)"));
        assert!(file.ends_with("Shown permutations: 1\n"));
        assert_eq!(console, "Shown permutations: 1\n");
    }

    #[test]
    fn notices_reach_the_file_but_not_the_console() {
        let mut writer = ResultsWriter::new(Vec::new(), Vec::new(), true);
        writer.write_notice("Disabled generating L inputs").unwrap();
        writer.write_result(&sample()).unwrap();
        let (file, console) = writer.finish().unwrap();

        let file = String::from_utf8(file).unwrap();
        assert!(file.starts_with("Disabled generating L inputs\n("));
        assert_eq!(
            String::from_utf8(console).unwrap(),
            "(12.5, 90.0) [[2, 'r'], [3, '']]\n"
        );
    }

    #[test]
    fn create_truncates_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        std::fs::write(&path, "stale contents\n").unwrap();

        let writer = ResultsWriter::create(&path, true).unwrap();
        writer.finish().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
