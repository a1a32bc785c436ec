//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `tagschema.toml` files
//! and merging with command-line arguments.

use crate::error::{CliResult, ConfigError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tagschema::{CompilerConfig, IndentStyle, ReferenceStyle};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "tagschema.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input configuration.
    pub input: InputConfig,

    /// Schema compilation settings.
    pub schema: SchemaConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Input configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Registry definition file (`.json` or `.toml`).
    pub registry: PathBuf,
}

/// Schema compilation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Root shape to compile.
    pub root: Option<String>,

    /// How `$ref` and mapping values are written.
    pub reference_style: ReferenceStyle,

    /// Whether descriptions are emitted.
    pub descriptions: bool,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory for generated documents.
    pub dir: PathBuf,

    /// Output filename. Defaults to `<root>.schema.json`.
    pub file: Option<String>,

    /// Indentation of the rendered JSON.
    pub indent: IndentStyle,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            registry: PathBuf::from("registry.json"),
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            root: None,
            reference_style: ReferenceStyle::Name,
            descriptions: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./schemas"),
            file: None,
            indent: IndentStyle::Spaces2,
        }
    }
}

impl Config {
    /// The root shape, which must come from the config file or `--root`.
    pub fn root(&self) -> CliResult<&str> {
        self.schema.root.as_deref().ok_or_else(|| {
            ConfigError::invalid_value("schema.root", "no root shape given (set it or pass --root)")
                .into()
        })
    }

    /// Compiler settings derived from `[schema]`.
    pub fn compiler_config(&self) -> CompilerConfig {
        CompilerConfig::new()
            .with_reference_style(self.schema.reference_style)
            .with_descriptions(self.schema.descriptions)
    }

    /// Path of the generated document.
    pub fn output_path(&self) -> CliResult<PathBuf> {
        let file = match &self.output.file {
            Some(file) => file.clone(),
            None => format!("{}.schema.json", self.root()?),
        };
        Ok(self.output.dir.join(file))
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location.
    /// If no config file exists, returns default configuration. An
    /// explicitly named file that does not exist is an error.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

        if !config_path.exists() {
            if path.is_some() {
                return Err(ConfigError::not_found(config_path).into());
            }
            tracing::debug!("no {} found, using defaults", CONFIG_FILENAME);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path.clone(), e.to_string()))?;

        tracing::debug!(path = %config_path.display(), "loaded configuration");
        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref registry) = args.registry {
            config.input.registry = registry.clone();
        }

        if let Some(ref root) = args.root {
            config.schema.root = Some(root.clone());
        }

        if let Some(reference_style) = args.reference_style {
            config.schema.reference_style = reference_style;
        }

        if let Some(descriptions) = args.descriptions {
            config.schema.descriptions = descriptions;
        }

        if let Some(ref output) = args.output {
            config.output.dir = output.clone();
        }

        if let Some(ref file) = args.output_file {
            config.output.file = Some(file.clone());
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# tagschema configuration file

[input]
# Registry definition file (.json or .toml)
registry = "registry.json"

[schema]
# Root shape to compile
# root = "Person"

# Reference style for $ref and discriminator mappings ("name" or "pointer")
reference_style = "name"

# Whether shape, union and field descriptions are emitted
descriptions = true

[output]
# Output directory for generated documents
dir = "./schemas"

# Output file name (defaults to <root>.schema.json)
# file = "person.schema.json"

# Indentation ("spaces2", "spaces4" or "tabs")
indent = "spaces2"
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Registry file override.
    pub registry: Option<PathBuf>,

    /// Root shape override.
    pub root: Option<String>,

    /// Reference style override.
    pub reference_style: Option<ReferenceStyle>,

    /// Descriptions override.
    pub descriptions: Option<bool>,

    /// Output directory override.
    pub output: Option<PathBuf>,

    /// Output filename override.
    pub output_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.registry, PathBuf::from("registry.json"));
        assert_eq!(config.schema.root, None);
        assert_eq!(config.schema.reference_style, ReferenceStyle::Name);
        assert!(config.schema.descriptions);
        assert_eq!(config.output.dir, PathBuf::from("./schemas"));
        assert_eq!(config.output.indent, IndentStyle::Spaces2);
    }

    #[test]
    fn test_default_content_parses_to_defaults() {
        let config: Config = toml::from_str(ConfigManager::default_config_content()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.input.registry, defaults.input.registry);
        assert_eq!(config.schema.root, defaults.schema.root);
        assert_eq!(config.schema.reference_style, defaults.schema.reference_style);
        assert_eq!(config.output.dir, defaults.output.dir);
        assert_eq!(config.output.file, defaults.output.file);
        assert_eq!(config.output.indent, defaults.output.indent);
    }

    #[test]
    fn test_root_is_required() {
        let config = Config::default();
        assert!(config.root().is_err());
        assert!(config.output_path().is_err());
    }

    #[test]
    fn test_output_path_defaults_to_root_name() {
        let args = CliArgs {
            root: Some("Person".to_string()),
            ..Default::default()
        };
        let config = ConfigManager::merge_cli_args(Config::default(), &args);
        assert_eq!(
            config.output_path().unwrap(),
            PathBuf::from("./schemas/Person.schema.json")
        );
    }

    #[test]
    fn test_merge_cli_args_output() {
        let config = Config::default();
        let args = CliArgs {
            output: Some(PathBuf::from("./custom")),
            output_file: Some("pets.json".to_string()),
            reference_style: Some(ReferenceStyle::Pointer),
            ..Default::default()
        };

        let merged = ConfigManager::merge_cli_args(config, &args);
        assert_eq!(merged.output.dir, PathBuf::from("./custom"));
        assert_eq!(merged.output.file.as_deref(), Some("pets.json"));
        assert_eq!(
            merged.compiler_config().reference_style,
            ReferenceStyle::Pointer
        );
    }

    #[test]
    fn test_merge_cli_args_preserves_unset() {
        let config = Config::default();
        let args = CliArgs::default();

        let merged = ConfigManager::merge_cli_args(config.clone(), &args);
        assert_eq!(merged.input.registry, config.input.registry);
        assert_eq!(merged.output.dir, config.output.dir);
        assert_eq!(merged.output.file, config.output.file);
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[input]
registry = "models/pets.toml"

[schema]
root = "Person"
reference_style = "pointer"
descriptions = false

[output]
dir = "./out"
file = "person.json"
indent = "tabs"
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.input.registry, PathBuf::from("models/pets.toml"));
        assert_eq!(config.schema.root.as_deref(), Some("Person"));
        assert_eq!(config.schema.reference_style, ReferenceStyle::Pointer);
        assert!(!config.schema.descriptions);
        assert_eq!(config.output.dir, PathBuf::from("./out"));
        assert_eq!(config.output.file.as_deref(), Some("person.json"));
        assert_eq!(config.output.indent, IndentStyle::Tabs);
    }

    #[test]
    fn test_invalid_reference_style_is_rejected() {
        let toml = r#"
[schema]
reference_style = "inline"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }
}
