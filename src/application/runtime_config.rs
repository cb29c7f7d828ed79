use std::path::PathBuf;

use crate::cli::Cli;

/// Everything a single check run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Location the previous snapshot is read from and the new one written to
    pub freeze_file: PathBuf,
    /// Root directories in the order they were requested
    pub roots: Vec<String>,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            freeze_file: cli.freeze,
            roots: cli.dirs,
        }
    }
}
