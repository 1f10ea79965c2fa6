//! Dependency version check for edited manifests.
//! Supports Cargo (`Cargo.toml`), npm (`package.json`) and Helm (`Chart.yaml`).

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use super::error::ManifestError;
use super::file_classifier::ManifestKind;
use crate::cache::SessionCache;
use crate::providers::RegistryError;

/// A dependency as declared in a manifest, version prefix already stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredDependency {
    pub name: String,
    pub version: String,
    /// Chart repository URL; only Helm dependencies carry one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

impl DeclaredDependency {
    /// Session cache key: `<manager>:<name>`, or `helm:<repository>/<name>`.
    pub fn cache_key(&self, kind: ManifestKind) -> String {
        match &self.repository {
            Some(repo) => format!("{}:{}/{}", kind.cache_prefix(), repo, self.name),
            None => format!("{}:{}", kind.cache_prefix(), self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VersionStatus {
    Outdated { latest: String },
    Latest,
    Unchecked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionFinding {
    pub name: String,
    pub declared: String,
    pub status: VersionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

impl fmt::Display for VersionFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            VersionStatus::Outdated { latest } => {
                write!(f, "OUTDATED: {} {} -> latest is {}", self.name, self.declared, latest)?;
                match &self.repository {
                    Some(repo) => write!(f, " ({repo})"),
                    None => Ok(()),
                }
            }
            VersionStatus::Latest => write!(f, "OK: {} {} is latest", self.name, self.declared),
            VersionStatus::Unchecked => write!(
                f,
                "SKIP: Could not check {} {} (network/timeout)",
                self.name, self.declared
            ),
        }
    }
}

/// Source of "latest published version" answers.
pub trait RegistryClient {
    fn latest_version(
        &self,
        kind: ManifestKind,
        dependency: &DeclaredDependency,
    ) -> impl Future<Output = Result<String, RegistryError>> + Send;
}

/// Strip range operators (`^ ~ > = <`) from the front of a version requirement.
pub fn clean_version_string(version: &str) -> String {
    version
        .trim_start_matches(&['^', '~', '>', '=', '<'][..])
        .to_string()
}

// Requirements that name no concrete version cannot be compared.
fn is_comparable(version: &str) -> bool {
    !version.is_empty() && version != "latest" && version != "*"
}

fn declared(name: &str, raw: &str) -> Option<DeclaredDependency> {
    let version = clean_version_string(raw.trim());
    is_comparable(&version).then(|| DeclaredDependency {
        name: name.to_string(),
        version,
        repository: None,
    })
}

fn cargo_table_entries(table: &toml::Table, out: &mut Vec<DeclaredDependency>) {
    for (name, spec) in table {
        let raw = match spec {
            toml::Value::String(v) => Some(v.as_str()),
            toml::Value::Table(t) => t.get("version").and_then(|v| v.as_str()),
            _ => None,
        };
        // path, git and `workspace = true` entries carry no registry version
        if let Some(dep) = raw.and_then(|raw| declared(name, raw)) {
            out.push(dep);
        }
    }
}

fn collect_dependency_tables(table: &toml::Table, out: &mut Vec<DeclaredDependency>) {
    for (key, value) in table {
        let Some(inner) = value.as_table() else {
            continue;
        };
        if key.contains("dependencies") {
            cargo_table_entries(inner, out);
        }
    }
}

/// Every entry of every `*dependencies*` table, including the workspace and
/// per-target tables.
pub fn parse_cargo_manifest(text: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
    let root: toml::Table = text.parse()?;
    let mut deps = Vec::new();

    collect_dependency_tables(&root, &mut deps);
    if let Some(workspace) = root.get("workspace").and_then(|w| w.as_table()) {
        collect_dependency_tables(workspace, &mut deps);
    }
    if let Some(targets) = root.get("target").and_then(|t| t.as_table()) {
        for target in targets.values().filter_map(|t| t.as_table()) {
            collect_dependency_tables(target, &mut deps);
        }
    }
    Ok(deps)
}

/// `dependencies` then `devDependencies`; internal `@opencode-ai/` packages are skipped.
pub fn parse_package_json(text: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    let mut deps = Vec::new();

    for section in ["dependencies", "devDependencies"] {
        let Some(entries) = json.get(section).and_then(|d| d.as_object()) else {
            continue;
        };
        for (name, spec) in entries {
            if name.starts_with("@opencode-ai/") {
                continue;
            }
            if let Some(dep) = spec.as_str().and_then(|raw| declared(name, raw)) {
                deps.push(dep);
            }
        }
    }
    Ok(deps)
}

#[derive(Debug, Default, Deserialize)]
struct Chart {
    #[serde(default)]
    dependencies: Vec<ChartDependency>,
}

#[derive(Debug, Deserialize)]
struct ChartDependency {
    name: String,
    // unquoted versions such as `1.2` arrive as YAML numbers
    version: Option<serde_yaml::Value>,
    repository: Option<String>,
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// `file://` charts and repository aliases have no remote index to consult.
fn is_remote_repository(repo: &str) -> bool {
    repo.starts_with("https://") || repo.starts_with("http://")
}

/// Chart dependencies that name both a version and a remote repository.
pub fn parse_chart_yaml(text: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
    let doc: serde_yaml::Value = serde_yaml::from_str(text)?;
    let chart: Chart = if doc.is_null() {
        Chart::default()
    } else {
        serde_yaml::from_value(doc)?
    };
    let deps = chart
        .dependencies
        .into_iter()
        .filter_map(|dep| {
            let repository = dep
                .repository
                .map(|r| r.trim().trim_end_matches('/').to_string())
                .filter(|r| is_remote_repository(r))?;
            let version = dep.version.as_ref().and_then(yaml_scalar)?;
            let mut declared = declared(dep.name.trim(), &version)?;
            declared.repository = Some(repository);
            Some(declared)
        })
        .collect();
    Ok(deps)
}

pub fn parse_manifest(kind: ManifestKind, text: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
    match kind {
        ManifestKind::Cargo => parse_cargo_manifest(text),
        ManifestKind::Npm => parse_package_json(text),
        ManifestKind::Helm => parse_chart_yaml(text),
    }
}

/// Look up each dependency not yet seen in this session.
///
/// Keys are recorded before the lookup, so a failed lookup is not retried
/// within the same session.
pub async fn check_versions<R: RegistryClient>(
    kind: ManifestKind,
    deps: &[DeclaredDependency],
    registry: &R,
    cache: &mut SessionCache,
) -> Vec<VersionFinding> {
    let mut findings = Vec::new();
    for dep in deps {
        if !cache.insert(dep.cache_key(kind)) {
            tracing::debug!(dependency = %dep.name, "already checked this session");
            continue;
        }

        let status = match registry.latest_version(kind, dep).await {
            Ok(latest) if latest == dep.version => VersionStatus::Latest,
            Ok(latest) => VersionStatus::Outdated { latest },
            Err(e) => {
                tracing::warn!(dependency = %dep.name, error = %e, "version lookup failed");
                VersionStatus::Unchecked
            }
        };
        findings.push(VersionFinding {
            name: dep.name.clone(),
            declared: dep.version.clone(),
            status,
            repository: dep.repository.clone(),
        });
    }
    findings
}
