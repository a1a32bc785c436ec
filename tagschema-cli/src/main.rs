//! # tagschema-cli
//!
//! CLI tool for emitting JSON Schema documents from tagged-union shape
//! registries.
//!
//! ## Usage
//!
//! ```bash
//! # Generate the schema for a root shape
//! tagschema generate --registry pets.json --root Person
//!
//! # Dry run to preview the document
//! tagschema generate --root Person --dry-run
//!
//! # Check every discriminated union in a registry
//! tagschema validate --registry pets.json
//!
//! # Verify a committed schema is up-to-date
//! tagschema check --path ./schemas/Person.schema.json --root Person
//!
//! # Initialize configuration
//! tagschema init
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use tagschema::ReferenceStyle;
use tagschema_cli::{
    config::{CliArgs, Config, ConfigManager, CONFIG_FILENAME},
    error::CliError,
    generator::SchemaGenerator,
    writer::{FileWriter, Freshness, WriteResult},
};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "TAGSCHEMA_LOG";

#[derive(Parser)]
#[command(name = "tagschema")]
#[command(author, version, about = "Emit JSON Schema documents from tagged-union shape registries", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads a registry.
#[derive(clap::Args)]
struct RegistryOpts {
    /// Registry definition file (.json or .toml)
    #[arg(short, long)]
    registry: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Options that shape the compiled document.
#[derive(clap::Args)]
struct SchemaOpts {
    /// Root shape to compile
    #[arg(long)]
    root: Option<String>,

    /// Write references as "#/definitions/<name>"
    #[arg(long)]
    pointer_refs: bool,

    /// Leave descriptions out of the document
    #[arg(long)]
    no_descriptions: bool,
}

impl SchemaOpts {
    /// Config overrides for these options.
    fn into_args(self, registry: Option<PathBuf>) -> CliArgs {
        CliArgs {
            registry,
            root: self.root,
            reference_style: self.pointer_refs.then_some(ReferenceStyle::Pointer),
            descriptions: self.no_descriptions.then_some(false),
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a root shape and write its schema document
    Generate {
        #[command(flatten)]
        registry: RegistryOpts,

        #[command(flatten)]
        schema: SchemaOpts,

        /// Output directory for the generated document
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file name (defaults to <root>.schema.json)
        #[arg(long)]
        file: Option<String>,

        /// Preview the document without writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the registry's discriminated unions
    Validate {
        #[command(flatten)]
        registry: RegistryOpts,
    },

    /// Check that a generated schema document is up-to-date
    Check {
        /// Path to the generated document
        #[arg(short, long)]
        path: PathBuf,

        #[command(flatten)]
        registry: RegistryOpts,

        #[command(flatten)]
        schema: SchemaOpts,
    },

    /// Initialize a new tagschema configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("{} {}", "Warning:".yellow(), e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate {
            registry,
            schema,
            output,
            file,
            dry_run,
        } => {
            let args = CliArgs {
                output,
                output_file: file,
                ..schema.into_args(registry.registry)
            };
            let config = load_config(registry.config, &args)?;
            cmd_generate(config, dry_run)
        }

        Commands::Validate { registry } => {
            let args = CliArgs {
                registry: registry.registry,
                ..Default::default()
            };
            let config = load_config(registry.config, &args)?;
            cmd_validate(config)
        }

        Commands::Check {
            path,
            registry,
            schema,
        } => {
            let args = schema.into_args(registry.registry);
            let config = load_config(registry.config, &args)?;
            cmd_check(path, config)
        }

        Commands::Init { output, force } => cmd_init(output, force),
    }
}

/// Load the config file and apply command-line overrides.
fn load_config(config_path: Option<PathBuf>, args: &CliArgs) -> Result<Config, CliError> {
    let config = ConfigManager::load(config_path.as_deref())?;
    Ok(ConfigManager::merge_cli_args(config, args))
}

/// Generate command implementation.
fn cmd_generate(config: Config, dry_run: bool) -> Result<(), CliError> {
    println!(
        "{} {}",
        "Loading registry".cyan(),
        config.input.registry.display()
    );

    let generator = SchemaGenerator::new(config);
    let registry = generator.load_registry()?;
    println!(
        "  Found {} definition(s)",
        registry.len().to_string().green()
    );

    println!("{}", "Compiling schema...".cyan());
    let generated = generator.generate_from(&registry)?;
    println!(
        "  Compiled '{}' with {} definition(s)",
        generated.root,
        generated.definitions.to_string().green()
    );

    let writer = FileWriter::new(dry_run);
    match writer.write(&generated.path, &generated.content)? {
        WriteResult::Written { path, bytes } => {
            println!(
                "{} Written {} bytes to {}",
                "✓".green(),
                bytes,
                path.display()
            );
        }
        WriteResult::Unchanged { path } => {
            println!("{} {} is already up-to-date", "✓".green(), path.display());
        }
        WriteResult::DryRun { content, path } => {
            println!(
                "{} Would write to {}:",
                "[dry-run]".yellow(),
                path.display()
            );
            println!("{}", "─".repeat(60).dimmed());
            print!("{}", content);
            println!("{}", "─".repeat(60).dimmed());
        }
    }

    Ok(())
}

/// Validate command implementation.
fn cmd_validate(config: Config) -> Result<(), CliError> {
    println!(
        "{} {}",
        "Validating registry".cyan(),
        config.input.registry.display()
    );

    let summary = SchemaGenerator::new(config).validate()?;
    println!(
        "{} {} shape(s) and {} union(s) are valid",
        "✓".green(),
        summary.shapes,
        summary.unions
    );
    Ok(())
}

/// Check command implementation.
fn cmd_check(schema_path: PathBuf, config: Config) -> Result<(), CliError> {
    println!("{}", "Checking schema...".cyan());

    let generated = SchemaGenerator::new(config).generate()?;

    match FileWriter::freshness(&schema_path, &generated.content)? {
        Freshness::UpToDate => {
            println!("{} Schema is up-to-date", "✓".green());
            Ok(())
        }
        Freshness::Missing => Err(CliError::Validation(format!(
            "Schema file not found: {}",
            schema_path.display()
        ))),
        Freshness::Stale => {
            println!("{} Schema is out of date", "✗".red());
            println!("  Run 'tagschema generate' to update");
            Err(CliError::Validation(format!(
                "{} is out of date",
                schema_path.display()
            )))
        }
    }
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    let writer = FileWriter::new(false).with_overwrite(force);
    writer.write(&output, ConfigManager::default_config_content())?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
