//! Schema generation from a loaded registry.
//!
//! This module connects the configuration, the registry loader and the
//! core compiler. It produces rendered documents; writing them is left to
//! [`crate::writer`].

use crate::config::Config;
use crate::error::CliResult;
use crate::loader::RegistryLoader;
use std::path::PathBuf;
use tagschema::{SchemaCompiler, ShapeRegistry};

/// A rendered schema document.
#[derive(Debug, Clone)]
pub struct GeneratedSchema {
    /// Root shape name.
    pub root: String,

    /// Where the document belongs.
    pub path: PathBuf,

    /// Rendered JSON, with a trailing newline.
    pub content: String,

    /// Number of entries under `definitions`.
    pub definitions: usize,
}

/// Summary of a successful registry validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Registered shapes.
    pub shapes: usize,

    /// Registered unions.
    pub unions: usize,
}

/// Schema generator driven by a [`Config`].
pub struct SchemaGenerator {
    config: Config,
}

impl SchemaGenerator {
    /// Create a new schema generator with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the configured registry file.
    pub fn load_registry(&self) -> CliResult<ShapeRegistry> {
        Ok(RegistryLoader::load(&self.config.input.registry)?)
    }

    /// Validate the configured registry without compiling anything.
    pub fn validate(&self) -> CliResult<ValidationSummary> {
        let registry = self.load_registry()?;
        registry.validate_registry()?;
        Ok(ValidationSummary {
            shapes: registry.shapes().count(),
            unions: registry.unions().count(),
        })
    }

    /// Load, validate and compile the configured root.
    pub fn generate(&self) -> CliResult<GeneratedSchema> {
        let registry = self.load_registry()?;
        self.generate_from(&registry)
    }

    /// Compile the configured root from an already loaded registry.
    pub fn generate_from(&self, registry: &ShapeRegistry) -> CliResult<GeneratedSchema> {
        let root = self.config.root()?;
        let compiler = SchemaCompiler::with_config(self.config.compiler_config());
        let document = compiler.compile(registry, root)?;

        let mut content = document
            .to_json_string(self.config.output.indent)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        content.push('\n');

        tracing::debug!(root = %root, bytes = content.len(), "rendered schema");
        Ok(GeneratedSchema {
            root: root.to_string(),
            path: self.config.output_path()?,
            content,
            definitions: document.definitions.len(),
        })
    }
}
