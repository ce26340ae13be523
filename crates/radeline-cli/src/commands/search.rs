use crate::cli::SearchArgs;
use crate::config::PartialSearchConfig;
use crate::error::Result;
use crate::output::ResultsWriter;
use crate::utils::progress::CliProgressHandler;
use radeline::engine::generation::GenerationMode;
use radeline::engine::memory::SystemMemoryProbe;
use radeline::engine::progress::ProgressReporter;
use radeline::workflows::search::{self, SearchReport};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub fn run(args: SearchArgs) -> Result<()> {
    let started = Instant::now();

    let partial_config = PartialSearchConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let app_config = partial_config.merge_with_cli(&args)?;
    let config = &app_config.core_config;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let mut probe = SystemMemoryProbe::new();

    info!("Invoking the search workflow...");
    let report = search::run(config, &mut probe, &reporter)?;

    if report.results.is_empty() {
        warn!("Search completed but no permutation reached the goal.");
    }

    info!(
        "Writing {} result(s) to {}",
        report.results.len(),
        app_config.output.results_path.display()
    );
    let mut writer = ResultsWriter::create(&app_config.output.results_path, app_config.output.silent)?;
    for notice in &report.notices {
        writer.write_notice(notice)?;
    }
    for result in &report.results {
        writer.write_result(result)?;
    }
    for line in summary_lines(&report, started.elapsed()) {
        writer.write_summary(&line)?;
    }
    writer.finish()?;

    Ok(())
}

fn summary_lines(report: &SearchReport, elapsed: Duration) -> Vec<String> {
    let mut lines = vec![String::new()];
    if report.mode == GenerationMode::Random {
        if let Some(requested) = report.requested {
            lines.push(format!("Intended permutations: {}", requested));
        }
    }
    lines.push(format!("Generated permutations: {}", report.generated));
    lines.push(format!("Shown permutations: {}", report.results.len()));
    if let Some(stage) = report.truncated {
        lines.push(format!(
            "Stopped early during {} due to low memory ({} permutations simulated)",
            stage, report.simulated
        ));
    }
    lines.push(format!("Processing time: {:.1} s", elapsed.as_secs_f64()));
    lines
}
