use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;

use super::error::RegistryError;
use crate::analysis::dependencies::{DeclaredDependency, RegistryClient};
use crate::analysis::file_classifier::ManifestKind;

pub const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const CRATES_IO_API: &str = "https://crates.io/api/v1/crates";
pub const NPM_REGISTRY: &str = "https://registry.npmjs.org";

/// Mirror overrides, mainly for offline runs
pub const CRATES_IO_ENV: &str = "HYGIENE_CRATES_IO_URL";
pub const NPM_REGISTRY_ENV: &str = "HYGIENE_NPM_REGISTRY_URL";

// crates.io rejects requests without an identifying agent
const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (dependency version check)"
);

#[derive(Debug, Deserialize)]
struct CratesIoResponse {
    #[serde(rename = "crate")]
    krate: CratesIoCrate,
}

#[derive(Debug, Deserialize)]
struct CratesIoCrate {
    max_stable_version: Option<String>,
    max_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NpmLatest {
    version: Option<String>,
}

/// `index.yaml` published at the root of every classic chart repository
#[derive(Debug, Default, Deserialize)]
struct HelmIndex {
    #[serde(default)]
    entries: HashMap<String, Vec<HelmChartVersion>>,
}

#[derive(Debug, Deserialize)]
struct HelmChartVersion {
    version: String,
}

impl HelmIndex {
    // Repository indexes list versions newest first; pre-releases are skipped.
    fn latest_stable(&self, name: &str) -> Option<String> {
        self.entries
            .get(name)?
            .iter()
            .map(|chart| chart.version.trim())
            .find(|v| !v.is_empty() && !v.contains('-'))
            .map(str::to_string)
    }
}

/// crates.io and npm over HTTPS, Helm chart repositories via their index
pub struct HttpRegistryClient {
    client: Client,
    crates_io_base: String,
    npm_base: String,
}

impl HttpRegistryClient {
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_endpoints(CRATES_IO_API, NPM_REGISTRY)
    }

    /// Public registries unless overridden through the mirror env vars.
    pub fn from_env() -> Result<Self, RegistryError> {
        let endpoint = |var: &str, default: &str| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self::with_endpoints(
            &endpoint(CRATES_IO_ENV, CRATES_IO_API),
            &endpoint(NPM_REGISTRY_ENV, NPM_REGISTRY),
        )
    }

    /// Point the client at other registry mirrors.
    pub fn with_endpoints(crates_io_base: &str, npm_base: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            crates_io_base: crates_io_base.trim_end_matches('/').to_string(),
            npm_base: npm_base.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, kind: ManifestKind, dependency: &DeclaredDependency) -> String {
        let name = &dependency.name;
        match kind {
            ManifestKind::Cargo => format!("{}/{}", self.crates_io_base, name),
            // scoped packages keep the `@` but escape the separator
            ManifestKind::Npm => format!("{}/{}/latest", self.npm_base, name.replace('/', "%2F")),
            ManifestKind::Helm => format!(
                "{}/index.yaml",
                dependency.repository.as_deref().unwrap_or_default().trim_end_matches('/')
            ),
        }
    }

    async fn get(&self, url: &str, name: &str, accept: &str) -> Result<Response, RegistryError> {
        let response = self.client.get(url).header("Accept", accept).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                name: name.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn fetch<T: for<'de> Deserialize<'de>>(&self, url: &str, name: &str) -> Result<T, RegistryError> {
        let response = self.get(url, name, "application/json").await?;
        Ok(response.json::<T>().await?)
    }

    async fn fetch_chart_index(&self, url: &str, name: &str) -> Result<HelmIndex, RegistryError> {
        let body = self.get(url, name, "application/x-yaml, */*").await?.text().await?;
        Ok(serde_yaml::from_str(&body)?)
    }
}

impl RegistryClient for HttpRegistryClient {
    async fn latest_version(
        &self,
        kind: ManifestKind,
        dependency: &DeclaredDependency,
    ) -> Result<String, RegistryError> {
        let name = dependency.name.as_str();
        if kind == ManifestKind::Helm && dependency.repository.is_none() {
            return Err(RegistryError::MissingRepository { name: name.to_string() });
        }
        let url = self.url_for(kind, dependency);
        tracing::debug!(%url, "querying registry");

        let latest = match kind {
            ManifestKind::Cargo => {
                let body: CratesIoResponse = self.fetch(&url, name).await?;
                body.krate.max_stable_version.or(body.krate.max_version)
            }
            ManifestKind::Npm => self.fetch::<NpmLatest>(&url, name).await?.version,
            ManifestKind::Helm => self.fetch_chart_index(&url, name).await?.latest_stable(name),
        };
        latest
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RegistryError::MissingVersion {
                name: name.to_string(),
            })
    }
}
