use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("registry answered {status} for {name}")]
    Status { name: String, status: u16 },

    #[error("registry response for {name} has no version")]
    MissingVersion { name: String },

    #[error("chart {name} names no repository to query")]
    MissingRepository { name: String },

    #[error("chart repository index is not valid YAML: {0}")]
    Index(#[from] serde_yaml::Error),
}
