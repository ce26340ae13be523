use radeline::engine::config as core_config;
use std::path::PathBuf;

pub struct OutputSettings {
    pub results_path: PathBuf,
    pub silent: bool,
}

pub struct AppConfig {
    pub output: OutputSettings,
    pub core_config: core_config::SearchConfig,
}
