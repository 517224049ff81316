#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Operation};
pub use toml_config::{BundleConfig, CatalogConfig, TomlConfig};
