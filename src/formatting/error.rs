use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("cannot run {}: {source}", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("formatter did not finish within {0:?}")]
    Timeout(Duration),

    #[error("formatter exited with {0}")]
    Failed(ExitStatus),
}
