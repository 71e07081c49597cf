//! Command-line front end for the generation engine

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crucible_codegen::{
    CodeGenerator, ConfigValue, EnumStyle, ExporterRegistry, GeneratorConfig,
};
use crucible_defs::DefinitionCollection;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crucible", version, about = "FHIR code generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate source files from a directory of FHIR definitions
    Generate {
        /// Directory of FHIR conformance JSON files
        #[arg(short, long)]
        input: PathBuf,

        /// Directory generated files are written into
        #[arg(short, long, default_value = "generated")]
        output: PathBuf,

        /// Run only these exporters (repeatable); default is all
        #[arg(short, long = "exporter")]
        exporters: Vec<String>,

        /// Package id recorded in output headers
        #[arg(long, default_value = "fhir.package")]
        package_name: String,

        /// Package version recorded in output headers
        #[arg(long, default_value = "0.0.0")]
        package_version: String,

        /// Release sequence used in output file names (e.g. "r4")
        #[arg(long, default_value = "r4")]
        sequence: String,

        /// Generate only these structures, by name (repeatable)
        #[arg(long = "only")]
        only: Vec<String>,

        /// Wrap output in this namespace, for targets that support one
        #[arg(long)]
        namespace: Option<String>,

        /// Minimum target-language version recorded in output headers
        #[arg(long)]
        min_version: Option<String>,

        /// Write enumerations as inline literal unions instead of named types
        #[arg(long)]
        inline_enums: bool,

        /// Skip per-element documentation comments
        #[arg(long)]
        no_docs: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            input,
            output,
            exporters,
            package_name,
            package_version,
            sequence,
            only,
            namespace,
            min_version,
            inline_enums,
            no_docs,
        } => generate(GenerateArgs {
            input,
            output,
            exporters,
            package_name,
            package_version,
            sequence,
            only,
            namespace,
            min_version,
            inline_enums,
            no_docs,
        }),
    }
}

struct GenerateArgs {
    input: PathBuf,
    output: PathBuf,
    exporters: Vec<String>,
    package_name: String,
    package_version: String,
    sequence: String,
    only: Vec<String>,
    namespace: Option<String>,
    min_version: Option<String>,
    inline_enums: bool,
    no_docs: bool,
}

fn generate(args: GenerateArgs) -> Result<()> {
    let GenerateArgs {
        input,
        output,
        exporters,
        package_name,
        package_version,
        sequence,
        only,
        namespace,
        min_version,
        inline_enums,
        no_docs,
    } = args;
    let registry = ExporterRegistry::with_defaults();
    for key in &exporters {
        if registry.get(key).is_none() {
            let known: Vec<_> = registry.keys().collect();
            bail!("unknown exporter '{key}'; available: {}", known.join(", "));
        }
    }

    let mut collection = DefinitionCollection::new(package_name, package_version, sequence);
    let outcome = collection
        .load_directory(&input)
        .with_context(|| format!("loading definitions from {}", input.display()))?;
    tracing::info!(
        loaded = outcome.loaded,
        skipped = outcome.skipped,
        failed = outcome.failures.len(),
        "definitions loaded"
    );
    for (file, reason) in &outcome.failures {
        eprintln!("failed to load {file}: {reason}");
    }
    if outcome.loaded == 0 {
        bail!("no usable definitions in {}", input.display());
    }

    let mut config = GeneratorConfig::new(output);
    config.export_keys = exporters.into_iter().collect::<BTreeSet<_>>();
    config.structure_names = only.into_iter().collect::<BTreeSet<_>>();
    if let Some(ns) = namespace {
        config.namespace = ConfigValue::explicit(Some(ns));
    }
    if let Some(min) = min_version {
        config.min_target_version = ConfigValue::explicit(Some(min));
    }
    if inline_enums {
        config.enum_style = ConfigValue::explicit(EnumStyle::Inline);
    }
    if no_docs {
        config.write_docs = ConfigValue::explicit(false);
    }

    let summary = CodeGenerator::new(&collection, config).run(&registry)?;

    for path in &summary.written {
        println!("wrote {}", path.display());
    }
    for diagnostic in summary.diagnostics.iter() {
        eprintln!("note: {diagnostic}");
    }
    if !summary.failures.is_empty() {
        for (key, reason) in &summary.failures {
            eprintln!("exporter {key} failed: {reason}");
        }
        bail!("{} exporter(s) failed", summary.failures.len());
    }

    Ok(())
}
