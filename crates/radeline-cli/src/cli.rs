use clap::{Args, Parser, Subcommand};
use radeline::core::models::input::Axis;
use radeline::engine::config::{GoalDirection, KeyRestriction};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Kataiser",
    version,
    about = "Radeline - brute-force search for Celeste input sequences that reach a goal position.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to simulate candidates.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate, simulate and rank input permutations, writing the results file.
    Search(SearchArgs),
    /// Convert a printed result line into input-script lines.
    Format(FormatArgs),
}

/// Arguments for the `search` subcommand.
#[derive(Args, Debug)]
pub struct SearchArgs {
    // --- Core Arguments ---
    /// Path to the search configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path of the results file (truncated at start).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Axis to simulate: x or y.
    #[arg(short, long, value_name = "AXIS")]
    pub axis: Option<Axis>,

    /// Number of frames every input sequence spans.
    #[arg(short, long, value_name = "INT")]
    pub frames: Option<u32>,

    /// Number of random attempts when the RNG method is used.
    #[arg(short = 'n', long, value_name = "INT")]
    pub permutations: Option<usize>,

    // --- Goal Overrides ---
    /// Coordinate the final position must pass.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub goal_position: Option<f64>,

    /// Side of the goal coordinate to reach: - or +.
    #[arg(long, value_name = "DIR", allow_hyphen_values = true)]
    pub goal_direction: Option<GoalDirection>,

    /// Lower bound of an inclusive goal band (use with --goal-max).
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub goal_min: Option<f64>,

    /// Upper bound of an inclusive goal band (use with --goal-min).
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub goal_max: Option<f64>,

    /// Final velocity to prefer when ranking.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub goal_velocity: Option<f64>,

    /// Rank by velocity closeness first instead of position.
    #[arg(long)]
    pub prioritize_velocity: bool,

    // --- Initial State Overrides ---
    /// Initial position on the chosen axis.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub position: Option<f64>,

    /// Initial velocity on the chosen axis.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub velocity: Option<f64>,

    /// Celeste Studio info text to take the initial state from.
    #[arg(long, value_name = "TEXT", conflicts_with_all = ["position", "velocity"])]
    pub studio_info: Option<String>,

    // --- Physics Overrides ---
    /// The player starts on the ground.
    #[arg(long)]
    pub on_ground: bool,

    /// The player is holding an item.
    #[arg(long)]
    pub holding: bool,

    // --- Generation Overrides ---
    /// Key to exclude from generation: auto, none, l, r, j or d.
    #[arg(short = 'k', long, value_name = "KEY")]
    pub disabled_key: Option<KeyRestriction>,

    /// Seed for the RNG method, for reproducible runs.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Bias random run lengths towards short runs.
    #[arg(long)]
    pub triangular: bool,

    /// Keep every sequence even when several reach the same outcome.
    #[arg(long)]
    pub show_duplicates: bool,

    /// Disable the memory guard.
    #[arg(long)]
    pub no_memory_guard: bool,

    /// Do not mirror results to the console; the results file is still written.
    #[arg(short, long)]
    pub silent: bool,

    /// Set a specific configuration value, overriding the config file and other flags.
    /// Can be used multiple times. Example: -S generation.rng-threshold=18
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `format` subcommand.
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Result line to convert, e.g. "(1.0, 2.0) [[2, 'r'], [3, '']]". Read from stdin if omitted.
    #[arg(value_name = "LINE")]
    pub line: Option<String>,

    /// Text appended to every output line, e.g. ",x".
    #[arg(short = 'a', long, value_name = "TEXT", allow_hyphen_values = true)]
    pub append_keys: Option<String>,

    /// Search configuration file to read `output.append-keys` from.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
