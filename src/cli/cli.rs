use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Check a set of directories for changes since the previous run.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Name of the freeze file holding the snapshot between runs
    #[clap(long, short)]
    pub freeze: PathBuf,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Directories to snapshot and compare
    #[clap(required = true)]
    pub dirs: Vec<String>,
}
