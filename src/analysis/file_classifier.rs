//! Path-based dispatch: decides which checks a freshly edited file gets
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

static CODE_FILE_RE: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"\.(ts|tsx|js|jsx|py|rb|go|rs|java|kt|cs|cpp|c|h|hpp|swift|scala|vue|svelte)$")
});

// Legitimately long files: lockfiles, minified bundles, generated code, snapshots.
static SKIP_FILE_RE: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(
        r"\.(lock|min\.\w+|generated\.\w+|snap|d\.ts)$|package-lock\.json|yarn\.lock|pnpm-lock\.yaml",
    )
});

static EXPORT_LANG_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"\.(ts|tsx|js|jsx)$"));

fn matches(re: &Lazy<Result<Regex, regex::Error>>, path: &str) -> bool {
    re.as_ref().map(|re| re.is_match(path)).unwrap_or(false)
}

/// Dependency manifest flavours the version check understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ManifestKind {
    Cargo,
    Npm,
    Helm,
}

impl ManifestKind {
    pub fn cache_prefix(&self) -> &'static str {
        match self {
            ManifestKind::Cargo => "cargo",
            ManifestKind::Npm => "npm",
            ManifestKind::Helm => "helm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FileCategory {
    /// A source file the hygiene scan applies to
    SourceCode { exports_checked: bool },
    /// Source-like but generated, minified or a lockfile
    Generated,
    /// A dependency manifest
    Manifest(ManifestKind),
    Other,
}

/// Classify a path using its name only; content is never inspected.
pub fn classify_path(path: &str) -> FileCategory {
    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    match &*file_name {
        "Cargo.toml" => return FileCategory::Manifest(ManifestKind::Cargo),
        "package.json" => return FileCategory::Manifest(ManifestKind::Npm),
        "Chart.yaml" => return FileCategory::Manifest(ManifestKind::Helm),
        _ => {}
    }

    if !matches(&CODE_FILE_RE, path) {
        return FileCategory::Other;
    }
    if matches(&SKIP_FILE_RE, path) {
        return FileCategory::Generated;
    }
    FileCategory::SourceCode {
        exports_checked: matches(&EXPORT_LANG_RE, path),
    }
}

/// True when any configured pattern occurs in the path as a plain substring.
pub fn is_excluded(path: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .any(|p| !p.is_empty() && path.contains(p.as_str()))
}
