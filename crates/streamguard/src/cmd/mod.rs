use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use streamguard_schema::{RegistryConfig, SchemaRegistry};

use crate::exit::{io_error, schema_error, CliResult};
use crate::output::OutputFormat;

pub mod classify;
pub mod schemas;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate one envelope frame against a schema.
    Validate(ValidateArgs),
    /// Classify newline-delimited frames by message kind.
    Classify(ClassifyArgs),
    /// List registered schema families and schemas.
    Schemas(SchemasArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Registry options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct RegistryArgs {
    /// Extra schemas laid out as <DIR>/<family>/<name>.schema.json.
    #[arg(long, value_name = "DIR", env = "STREAMGUARD_SCHEMA_DIR", global = true)]
    pub schema_dir: Option<PathBuf>,

    /// Reject properties not declared by object schemas.
    #[arg(long, env = "STREAMGUARD_STRICT_SCHEMAS", global = true)]
    pub strict_schemas: bool,
}

impl RegistryArgs {
    /// Built-in catalog plus any schemas under `--schema-dir`.
    pub fn load(&self) -> CliResult<SchemaRegistry> {
        let config = RegistryConfig {
            strict_mode: self.strict_schemas,
            ..RegistryConfig::default()
        };
        let mut registry = SchemaRegistry::builtin_with_config(config)
            .map_err(|err| schema_error("failed loading built-in schemas", err))?;

        if let Some(dir) = &self.schema_dir {
            let loaded = registry.load_directory(dir).map_err(|err| {
                schema_error(&format!("failed loading schemas from {}", dir.display()), err)
            })?;
            tracing::info!(dir = %dir.display(), loaded, "loaded extra schemas");
        }

        Ok(registry)
    }
}

pub fn run(command: Command, registry: &RegistryArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Validate(args) => validate::run(args, registry, format),
        Command::Classify(args) => classify::run(args, registry, format),
        Command::Schemas(args) => schemas::run(args, registry, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EnvelopeKind {
    Snapshot,
    Data,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// File holding one JSON frame, or `-` for stdin.
    pub input: PathBuf,
    /// Envelope field carrying the payload.
    #[arg(long, value_enum, default_value = "data")]
    pub envelope: EnvelopeKind,
    /// Schema the payload must satisfy.
    #[arg(long, short = 's')]
    pub schema: String,
    /// Report rejections without failing the command.
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// File of newline-delimited JSON frames, or `-` for stdin.
    pub input: PathBuf,
    /// Schema the payloads were decoded with; enables payload family detection.
    #[arg(long, short = 's')]
    pub schema: Option<String>,
}

#[derive(Args, Debug)]
pub struct SchemasArgs {
    /// Only list this family.
    #[arg(long)]
    pub family: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Read a whole input file, treating `-` as stdin.
pub fn read_input(path: &Path) -> CliResult<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|err| io_error("failed reading stdin", err))?;
        return Ok(buf);
    }

    std::fs::read(path).map_err(|err| io_error(&format!("failed reading {}", path.display()), err))
}
