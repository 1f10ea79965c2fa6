//! In-place formatting of edited files with dprint.
//!
//! The binary is found through `$HYGIENE_DPRINT`, then `PATH`, then the newest
//! mise-managed install. A missing binary simply disables formatting.

pub mod error;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

pub use error::FormatError;

pub const FORMAT_TIMEOUT_SECS: u64 = 10;

/// Explicit path to the dprint binary, skipping discovery
pub const DPRINT_ENV: &str = "HYGIENE_DPRINT";

const FORMATTABLE_EXTENSIONS: [&str; 12] = [
    "ts", "tsx", "js", "jsx", "json", "jsonc", "md", "yaml", "yml", "toml", "css", "html",
];

const MISE_INSTALLS: &str = ".local/share/mise/installs/dprint";

fn binary_name() -> &'static str {
    if cfg!(windows) {
        "dprint.exe"
    } else {
        "dprint"
    }
}

/// Whether dprint handles this file type.
pub fn is_formattable(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FORMATTABLE_EXTENSIONS.contains(&ext))
}

/// Search `path_var` entries in order, then mise installs under `home`
/// (lexically newest version directory first).
pub fn locate_dprint(path_var: Option<&OsStr>, home: Option<&Path>) -> Option<PathBuf> {
    let binary = binary_name();
    let on_path = path_var.and_then(|var| {
        std::env::split_paths(var)
            .map(|dir| dir.join(binary))
            .find(|candidate| candidate.is_file())
    });
    if on_path.is_some() {
        return on_path;
    }

    let installs = home?.join(MISE_INSTALLS);
    let mut versions: Vec<PathBuf> = std::fs::read_dir(&installs)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    versions.sort();
    versions
        .into_iter()
        .rev()
        .map(|version| version.join(binary))
        .find(|candidate| candidate.is_file())
}

#[derive(Debug, Clone)]
pub struct DprintFormatter {
    binary: PathBuf,
    timeout: Duration,
}

impl DprintFormatter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(FORMAT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `$HYGIENE_DPRINT` if set, otherwise [`locate_dprint`] over the real environment.
    pub fn discover() -> Option<Self> {
        if let Some(explicit) = std::env::var_os(DPRINT_ENV).filter(|v| !v.is_empty()) {
            return Some(Self::new(explicit));
        }
        let home = std::env::var_os("HOME").map(PathBuf::from);
        locate_dprint(std::env::var_os("PATH").as_deref(), home.as_deref()).map(Self::new)
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// `dprint fmt <file>` run from `cwd`, so dprint picks up the project config.
    pub async fn format_file(&self, file: &Path, cwd: &Path) -> Result<(), FormatError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("fmt")
            .arg(file)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let status = match tokio::time::timeout(self.timeout, cmd.status()).await {
            Ok(Ok(status)) => status,
            Ok(Err(source)) => {
                return Err(FormatError::Spawn {
                    binary: self.binary.clone(),
                    source,
                })
            }
            Err(_) => return Err(FormatError::Timeout(self.timeout)),
        };
        if !status.success() {
            return Err(FormatError::Failed(status));
        }
        Ok(())
    }
}
