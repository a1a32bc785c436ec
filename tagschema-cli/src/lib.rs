//! # tagschema-cli
//!
//! CLI library for emitting JSON Schema documents from tagged-union shape
//! registries.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`loader`] - Registry definition files (JSON or TOML)
//! - [`generator`] - Compiling the configured root with `tagschema`
//! - [`writer`] - File output and dry-run support
//! - [`error`] - Error types and handling

pub mod config;
pub mod error;
pub mod generator;
pub mod loader;
pub mod writer;

// Re-export main types for convenience
pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult};
pub use generator::SchemaGenerator;
pub use loader::RegistryLoader;
pub use writer::FileWriter;
