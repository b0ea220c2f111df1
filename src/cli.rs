use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Weekly roadmap tracker.
/// Storage defaults to ~/.roadmap/roadmap.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "roadmap", version, about = "Weekly roadmap tracking and reporting")]
pub struct Cli {
    /// Path to the JSON database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
