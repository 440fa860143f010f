//! Command-line argument parsing for packing runs

use clap::{ArgAction, Parser};

/// Hard-particle Monte Carlo packing with YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override the number of Monte Carlo steps
    #[arg(short = 'n', long)]
    pub iterations: Option<usize>,

    /// Override the random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fixed beta_p; disables any configured ramp
    #[arg(long)]
    pub beta_p: Option<f64>,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Directory for out_NNNN snapshot files
    #[arg(short, long, default_value = ".")]
    pub snapshot_dir: String,

    /// Include periodic images in snapshots
    #[arg(long)]
    pub ghosts: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
