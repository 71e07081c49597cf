//! FHIR code generation engine
//!
//! Turns a loaded [`DefinitionCollection`](crucible_defs::DefinitionCollection)
//! into source files for one or more target languages. The pipeline is:
//!
//! 1. [`components`] decomposes each structure's element tree into the
//!    types to generate,
//! 2. [`resolver`] maps every element to its name/type variants (choice
//!    expansion, content references, enum bindings),
//! 3. [`naming`] converts paths to target identifiers and disambiguates
//!    collisions,
//! 4. [`exporters`] render one file per registered language, and the
//!    [`CodeGenerator`] driver writes them out.
//!
//! Everything iterates in sorted order, so a rerun over the same
//! collection produces byte-identical files.

pub mod components;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod exporters;
pub mod naming;
pub mod primitives;
pub mod resolver;
pub mod slicing;
pub mod writer;

pub use config::{ConfigValue, EnumStyle, GeneratorConfig, OptionSource};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{Error, Result};
pub use exporters::{ExporterKind, ExporterRegistry, LanguageExporter};

use crucible_defs::DefinitionCollection;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// What one generation run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files written, in the order they were produced
    pub written: Vec<PathBuf>,
    /// Exporter key -> reason, for exporters that failed. One failing
    /// exporter never stops its siblings.
    pub failures: BTreeMap<String, String>,
    /// Non-fatal findings accumulated across all exporters
    pub diagnostics: Diagnostics,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.diagnostics.is_empty()
    }
}

/// Drives the selected exporters over one collection
pub struct CodeGenerator<'a> {
    collection: &'a DefinitionCollection,
    config: GeneratorConfig,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(collection: &'a DefinitionCollection, config: GeneratorConfig) -> Self {
        Self { collection, config }
    }

    /// Run every registered exporter the configuration selects.
    ///
    /// Each exporter renders its whole file in memory first; the single
    /// write per exporter means a failure leaves no partial file behind,
    /// and an exporter's failure is recorded in the summary rather than
    /// aborting the run.
    pub fn run(&self, registry: &ExporterRegistry) -> Result<RunSummary> {
        fs::create_dir_all(&self.config.output_dir)?;
        let mut summary = RunSummary::default();

        for (key, exporter) in registry.iter() {
            if !self.config.wants(key) {
                continue;
            }

            let mut diagnostics = Diagnostics::new();
            match exporter.export(self.collection, &self.config, &mut diagnostics) {
                Ok(text) => {
                    let path = self
                        .config
                        .output_dir
                        .join(exporter.file_name(self.collection));
                    match fs::write(&path, text) {
                        Ok(()) => {
                            tracing::info!(exporter = key, path = %path.display(), "wrote output");
                            summary.written.push(path);
                        }
                        Err(e) => {
                            tracing::error!(exporter = key, error = %e, "write failed");
                            summary.failures.insert(key.to_string(), e.to_string());
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(exporter = key, error = %e, "export failed");
                    summary.failures.insert(key.to_string(), e.to_string());
                }
            }
            summary.diagnostics.extend(diagnostics);
        }

        Ok(summary)
    }
}
