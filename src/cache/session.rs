use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the directory holding per-session cache files
pub const CACHE_DIR_ENV: &str = "HYGIENE_CACHE_DIR";

/// Dependencies already looked up during one editor session.
///
/// Keys are `"<manager>:<name>"`. Every hook invocation is a fresh process, so
/// the set is persisted as JSON next to other sessions' files.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SessionCache {
    checked: BTreeSet<String>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl SessionCache {
    /// A cache that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the session's cache, starting empty when none exists or it is unreadable.
    pub fn for_session(session_id: Option<&str>) -> Self {
        let Some(path) = session_id.and_then(cache_path_for) else {
            return Self::in_memory();
        };
        match Self::load(&path) {
            Ok(Some(mut cache)) => {
                cache.path = Some(path);
                cache
            }
            Ok(None) => Self {
                path: Some(path),
                ..Self::default()
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable session cache");
                Self {
                    path: Some(path),
                    ..Self::default()
                }
            }
        }
    }

    /// Load from a file; `Ok(None)` when the file does not exist yet.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session cache {}", path.display()))?;
        let cache: SessionCache = serde_json::from_str(&contents)?;
        Ok(Some(cache))
    }

    /// Persist to the session file. No-op for in-memory caches.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create cache dir {}", dir.display()))?;
        }
        let contents = serde_json::to_string(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.checked.contains(key)
    }

    /// Record a key; returns false when it was already present.
    pub fn insert(&mut self, key: String) -> bool {
        self.checked.insert(key)
    }

    pub fn len(&self) -> usize {
        self.checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn cache_dir() -> PathBuf {
    std::env::var_os(CACHE_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("hygiene-hooks"))
}

/// Session ids come from the editor; keep only filename-safe characters.
fn cache_path_for(session_id: &str) -> Option<PathBuf> {
    let safe: String = session_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if safe.is_empty() {
        return None;
    }
    Some(cache_dir().join(format!("{safe}.json")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn in_memory_cache_never_persists() {
        let mut cache = SessionCache::in_memory();
        assert!(cache.insert("npm:react".to_string()));
        assert!(!cache.insert("npm:react".to_string()));
        assert_eq!(cache.len(), 1);
        assert!(cache.path().is_none());
        assert!(cache.save().is_ok());
    }

    #[test]
    fn saved_cache_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut cache = SessionCache {
            path: Some(path.clone()),
            ..SessionCache::default()
        };
        cache.insert("cargo:serde".to_string());
        cache.save().unwrap();

        let loaded = SessionCache::load(&path).unwrap().unwrap();
        assert!(loaded.contains("cargo:serde"));
        assert!(!loaded.contains("npm:serde"));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempdir().unwrap();
        assert!(SessionCache::load(&dir.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn session_ids_are_sanitized() {
        let path = cache_path_for("../../etc/passwd").unwrap();
        assert_eq!(path.file_name().unwrap(), "etcpasswd.json");
        assert!(cache_path_for("///").is_none());
    }
}
