use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Cargo.toml is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("package.json is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chart.yaml is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
