//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;
use treemirror::SearchError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error(transparent)]
    Search(#[from] SearchError),
}
