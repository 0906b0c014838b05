//! Command-line arguments and logging setup

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive
pub const LOG_ENV: &str = "ARTFETCH_LOG";

#[derive(Parser, Debug, Default)]
#[command(name = "artfetch")]
#[command(version, about = "Show system information beside ASCII art")]
pub struct Cli {
    /// Name shown in place of the hostname
    #[arg(long)]
    pub name: Option<String>,

    /// Force the art for this system instead of detecting it
    #[arg(long)]
    pub system: Option<String>,

    /// Print the available art systems and exit
    #[arg(long)]
    pub list_systems: bool,

    /// Config file to use instead of the default locations
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory containing `<system>.txt` art files
    #[arg(long, value_name = "DIR")]
    pub ascii_dir: Option<PathBuf>,

    /// Log probe fallbacks to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Install the stderr subscriber. `ARTFETCH_LOG` beats `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
