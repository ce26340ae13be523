use std::path::PathBuf;

/// Fallbacks for settings that neither the config file nor the command line provided.
pub struct DefaultsConfig {
    pub results_path: PathBuf,
    pub silent_output: bool,
    pub append_keys: String,
    pub goal_velocity: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            results_path: PathBuf::from("results.txt"),
            silent_output: false,
            append_keys: String::new(),
            goal_velocity: 0.0,
        }
    }
}
