use std::path::{Path, PathBuf};

use crate::analysis::dependencies::{check_versions, parse_manifest, RegistryClient};
use crate::analysis::file_classifier::{classify_path, is_excluded, FileCategory, ManifestKind};
use crate::analysis::scanner::{scan_text, ScanOptions};
use crate::cache::SessionCache;
use crate::config::Config;
use crate::formatting::{is_formattable, DprintFormatter};
use crate::messages::{render_dependency_block, render_hygiene_block};

/// Tools whose completion leaves a changed file on disk
pub fn is_file_edit_tool(tool_name: &str) -> bool {
    matches!(
        tool_name.to_ascii_lowercase().as_str(),
        "write" | "edit" | "multiedit"
    )
}

/// Absolute paths are kept; relative ones are joined onto `cwd` when known.
pub fn resolve_path(file_path: &str, cwd: Option<&str>) -> PathBuf {
    let path = Path::new(file_path);
    match cwd {
        Some(cwd) if path.is_relative() && !cwd.is_empty() => Path::new(cwd).join(path),
        _ => path.to_path_buf(),
    }
}

async fn read_file(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read edited file");
            None
        }
    }
}

/// Format the edited file in place before it is reviewed.
///
/// Returns true only when the formatter ran and succeeded. A missing
/// formatter, a non-formattable path or a formatter failure leaves the file
/// as the tool wrote it.
pub async fn format_edited_file(
    file_path: &str,
    resolved: &Path,
    cwd: Option<&str>,
    config: &Config,
    formatter: Option<&DprintFormatter>,
) -> bool {
    if !config.format_enabled || !is_formattable(file_path) {
        return false;
    }
    let Some(formatter) = formatter else {
        tracing::debug!("dprint not found, formatting skipped");
        return false;
    };
    if !tokio::fs::metadata(resolved).await.is_ok_and(|m| m.is_file()) {
        return false;
    }

    let workdir = cwd
        .filter(|c| !c.is_empty())
        .map(Path::new)
        .or_else(|| resolved.parent().filter(|p| !p.as_os_str().is_empty()))
        .unwrap_or(Path::new("."));
    match formatter.format_file(resolved, workdir).await {
        Ok(()) => {
            tracing::debug!(path = %resolved.display(), "formatted");
            true
        }
        Err(e) => {
            tracing::warn!(path = %resolved.display(), error = %e, "formatting failed");
            false
        }
    }
}

/// Build the additional context for one edited file.
///
/// `file_path` is the path as the tool reported it and drives classification
/// and exclusion; `resolved` is where the file is read from. Returns an empty
/// string when there is nothing to report.
pub async fn review_edited_file<R: RegistryClient>(
    file_path: &str,
    resolved: &Path,
    config: &Config,
    registry: Option<&R>,
    cache: &mut SessionCache,
) -> String {
    match classify_path(file_path) {
        FileCategory::SourceCode { exports_checked } => {
            if is_excluded(file_path, &config.thresholds.exclude_patterns) {
                tracing::debug!(path = file_path, "excluded by config");
                return String::new();
            }
            let Some(content) = read_file(resolved).await else {
                return String::new();
            };
            let options = ScanOptions {
                count_exports: exports_checked,
            };
            scan_text(&content, &config.thresholds, options)
                .map(|report| render_hygiene_block(&report, &config.thresholds))
                .unwrap_or_default()
        }
        FileCategory::Manifest(kind) => {
            if !config.version_check_enabled {
                return String::new();
            }
            let Some(registry) = registry else {
                return String::new();
            };
            review_manifest(kind, resolved, registry, cache).await
        }
        FileCategory::Generated | FileCategory::Other => String::new(),
    }
}

async fn review_manifest<R: RegistryClient>(
    kind: ManifestKind,
    resolved: &Path,
    registry: &R,
    cache: &mut SessionCache,
) -> String {
    let Some(content) = read_file(resolved).await else {
        return String::new();
    };
    let deps = match parse_manifest(kind, &content) {
        Ok(deps) => deps,
        Err(e) => {
            tracing::warn!(path = %resolved.display(), error = %e, "skipping unparsable manifest");
            return String::new();
        }
    };
    let findings = check_versions(kind, &deps, registry, cache).await;
    if let Err(e) = cache.save() {
        tracing::warn!(error = %e, "could not persist session cache");
    }
    render_dependency_block(&findings)
}
