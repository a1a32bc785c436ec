//! Error types for the CLI.
//!
//! Registry and compiler errors come from the core crate unchanged; this
//! module adds the I/O side: configuration, registry file loading and
//! output writing.

use std::path::PathBuf;
use tagschema::RegistryError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Error loading configuration.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Error loading a registry definition file.
    #[error("Failed to load registry: {0}")]
    Load(#[from] LoadError),

    /// The registry is malformed or the root cannot be compiled.
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// Error writing output files.
    #[error("Failed to write output: {0}")]
    Write(#[from] WriteError),

    /// Validation failed (schema out of date).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Validation(_) => 2,
            _ => 1,
        }
    }
}

/// Error loading a registry definition file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Registry file not found.
    #[error("Registry file not found: {path}")]
    NotFound { path: PathBuf },

    /// The file extension is neither `.json` nor `.toml`.
    #[error("Unsupported registry format for {path}: expected .json or .toml")]
    UnsupportedFormat { path: PathBuf },

    /// The file could not be parsed.
    #[error("Invalid registry file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The file parsed but describes something the registry rejects.
    #[error("Invalid definition in {path}: {source}")]
    Definition {
        path: PathBuf,
        #[source]
        source: RegistryError,
    },

    /// IO error reading the file.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// IO error reading config.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error writing output files.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to create directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read an existing file.
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Refused to replace an existing file.
    #[error("{path} already exists (use --force to overwrite)")]
    AlreadyExists { path: PathBuf },
}

impl LoadError {
    /// Create a parse error.
    pub fn parse(path: PathBuf, message: impl Into<String>) -> Self {
        Self::Parse {
            path,
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Create a not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::NotFound { path }
    }

    /// Create an invalid TOML error.
    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Validation("stale".to_string()).exit_code(), 2);
        assert_eq!(
            CliError::Registry(RegistryError::unknown_shape("Pet")).exit_code(),
            1
        );
    }

    #[test]
    fn test_registry_error_is_shown_verbatim() {
        let error = CliError::from(RegistryError::unresolved("Person", "pet", "Pet"));
        assert_eq!(
            error.to_string(),
            "Field 'Person.pet' references unknown shape 'Pet'"
        );
    }

    #[test]
    fn test_load_error_keeps_path() {
        let error = LoadError::parse(PathBuf::from("pets.json"), "expected value");
        assert_eq!(
            error.to_string(),
            "Invalid registry file pets.json: expected value"
        );
    }
}
