//! Hook configuration.
//!
//! Settings live in the shared agentkit YAML file, one section per hook.
//! Missing files and missing keys fall back to defaults; a malformed section
//! only resets that section. Configuration is resolved once per invocation.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::ConfigError;

pub const DEFAULT_MAX_FILE_LINES: usize = 1000;
pub const DEFAULT_MAX_FUNCTION_LINES: usize = 100;
pub const DEFAULT_MIN_DUPLICATE_LINES: usize = 6;
pub const DEFAULT_MAX_EXPORTS_PER_FILE: usize = 15;

/// Limits applied by the hygiene scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    pub max_file_lines: usize,
    pub max_function_lines: usize,
    pub min_duplicate_lines: usize,
    pub max_exports_per_file: usize,
    /// Plain path substrings; a matching file is not scanned at all
    pub exclude_patterns: Vec<String>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_file_lines: DEFAULT_MAX_FILE_LINES,
            max_function_lines: DEFAULT_MAX_FUNCTION_LINES,
            min_duplicate_lines: DEFAULT_MIN_DUPLICATE_LINES,
            max_exports_per_file: DEFAULT_MAX_EXPORTS_PER_FILE,
            exclude_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub thresholds: Thresholds,
    /// Package-manager command policy (`pkg-police.enabled`)
    pub package_policy_enabled: bool,
    /// Dependency version lookups after manifest edits (`version-police.enabled`)
    pub version_check_enabled: bool,
    /// dprint formatting of edited files (`format-police.enabled`)
    pub format_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            package_policy_enabled: true,
            version_check_enabled: true,
            format_enabled: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct HygieneSection {
    max_file_lines: Option<i64>,
    max_function_lines: Option<i64>,
    min_duplicate_lines: Option<i64>,
    max_exports_per_file: Option<i64>,
    exclude_patterns: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ToggleSection {
    #[serde(default = "enabled_by_default")]
    enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

// Negative limits are clamped to zero, which reports everything rather than nothing.
fn limit(value: Option<i64>, default: usize) -> usize {
    match value {
        Some(v) if v < 0 => {
            tracing::warn!(value = v, "negative threshold clamped to 0");
            0
        }
        Some(v) => usize::try_from(v).unwrap_or(usize::MAX),
        None => default,
    }
}

impl From<HygieneSection> for Thresholds {
    fn from(section: HygieneSection) -> Self {
        Self {
            max_file_lines: limit(section.max_file_lines, DEFAULT_MAX_FILE_LINES),
            max_function_lines: limit(section.max_function_lines, DEFAULT_MAX_FUNCTION_LINES),
            min_duplicate_lines: limit(section.min_duplicate_lines, DEFAULT_MIN_DUPLICATE_LINES),
            max_exports_per_file: limit(section.max_exports_per_file, DEFAULT_MAX_EXPORTS_PER_FILE),
            exclude_patterns: section
                .exclude_patterns
                .map(|v| v.into_iter().map(|p| p.trim().to_string()).collect())
                .unwrap_or_default(),
        }
    }
}

fn section<T>(doc: &serde_yaml::Value, key: &str) -> Option<T>
where
    T: for<'de> Deserialize<'de>,
{
    let value = doc.get(key)?;
    if value.is_null() {
        return None;
    }
    match serde_yaml::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(section = key, error = %e, "ignoring malformed config section");
            None
        }
    }
}

/// Parse the YAML document. Unknown sections and keys are ignored.
pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    let doc: serde_yaml::Value = serde_yaml::from_str(text)?;
    let mut cfg = Config::default();

    if let Some(hygiene) = section::<HygieneSection>(&doc, "coding-police") {
        cfg.thresholds = hygiene.into();
    }
    if let Some(pkg) = section::<ToggleSection>(&doc, "pkg-police") {
        cfg.package_policy_enabled = pkg.enabled;
    }
    if let Some(versions) = section::<ToggleSection>(&doc, "version-police") {
        cfg.version_check_enabled = versions.enabled;
    }
    if let Some(format) = section::<ToggleSection>(&doc, "format-police") {
        cfg.format_enabled = format.enabled;
    }
    Ok(cfg)
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

/// Location of the config file: `$AGENTKIT_CONFIG`, else
/// `$XDG_CONFIG_HOME/agentkit/config.yaml`, else `~/.config/agentkit/config.yaml`.
pub fn config_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os("AGENTKIT_CONFIG").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(explicit));
    }
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("agentkit").join("config.yaml"))
}

/// Resolve and load the config, degrading to defaults on any problem.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        tracing::debug!("no config location, using defaults");
        return Config::default();
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Config::default();
    }
    match load_config_from(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error = %e, "falling back to default config");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(parse_config("").unwrap(), Config::default());
        assert_eq!(parse_config("other-tool:\n  x: 1\n").unwrap(), Config::default());
    }

    #[test]
    fn reads_hygiene_section() {
        let text = r#"
git-police:
  protected: [main]
coding-police:
  max-file-lines: 800
  max-function-lines: 60
  min-duplicate-lines: 4
  max-exports-per-file: 10
  exclude-patterns:
    - generated/
    - " fixtures/ "
pkg-police:
  enabled: false
"#;
        let cfg = parse_config(text).unwrap();
        assert_eq!(cfg.thresholds.max_file_lines, 800);
        assert_eq!(cfg.thresholds.max_function_lines, 60);
        assert_eq!(cfg.thresholds.min_duplicate_lines, 4);
        assert_eq!(cfg.thresholds.max_exports_per_file, 10);
        assert_eq!(cfg.thresholds.exclude_patterns, vec!["generated/", "fixtures/"]);
        assert!(!cfg.package_policy_enabled);
        assert!(cfg.version_check_enabled);
        assert!(cfg.format_enabled);
    }

    #[test]
    fn formatting_can_be_disabled() {
        let cfg = parse_config("format-police:\n  enabled: false\n").unwrap();
        assert!(!cfg.format_enabled);
        assert!(cfg.version_check_enabled);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = parse_config("coding-police:\n  max-function-lines: 40\n").unwrap();
        assert_eq!(cfg.thresholds.max_function_lines, 40);
        assert_eq!(cfg.thresholds.max_file_lines, DEFAULT_MAX_FILE_LINES);
        assert!(cfg.thresholds.exclude_patterns.is_empty());
    }

    #[test]
    fn negative_limits_fail_closed() {
        let cfg = parse_config("coding-police:\n  max-file-lines: -5\n").unwrap();
        assert_eq!(cfg.thresholds.max_file_lines, 0);
    }

    #[test]
    fn malformed_section_only_resets_itself() {
        let text = "coding-police:\n  max-file-lines: lots\nversion-police:\n  enabled: false\n";
        let cfg = parse_config(text).unwrap();
        assert_eq!(cfg.thresholds, Thresholds::default());
        assert!(!cfg.version_check_enabled);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let err = parse_config("coding-police: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
