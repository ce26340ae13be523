use super::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error(
        "Search space of {keys}^{frames} permutations is too large to enumerate; lower the RNG thresholds to use random generation"
    )]
    SearchSpaceTooLarge { keys: usize, frames: u32 },
}
