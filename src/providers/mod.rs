/// Package registry lookups used by the dependency version check
pub mod error;
pub mod registry;

pub use error::RegistryError;
pub use registry::HttpRegistryClient;
