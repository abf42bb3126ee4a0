//! Command-line interface definitions

use clap::Parser;
use std::path::PathBuf;

/// Deliver new audio files from a watched directory to a Telegram channel
#[derive(Parser, Debug)]
#[command(name = "tunedrop", version, about)]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "TUNEDROP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory to scan for audio files (overrides the config file)
    #[arg(short = 'd', long, env = "TUNEDROP_MUSIC_DIR")]
    pub music_dir: Option<PathBuf>,

    /// SQLite delivery-record database path (overrides the config file)
    #[arg(long, env = "TUNEDROP_DATABASE")]
    pub database: Option<PathBuf>,
}
