//! Language exporter contract and registry

pub mod info;
pub mod typescript;

use crate::config::GeneratorConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crucible_defs::DefinitionCollection;
use std::collections::BTreeMap;
use std::fmt;

pub use info::InfoExporter;
pub use typescript::TypeScriptExporter;

/// The output languages the engine knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExporterKind {
    TypeScript,
    Info,
}

impl ExporterKind {
    /// Stable registry key, also usable on a command line
    pub fn key(&self) -> &'static str {
        match self {
            ExporterKind::TypeScript => "typescript",
            ExporterKind::Info => "info",
        }
    }
}

impl fmt::Display for ExporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One output language.
///
/// Exporters are pure with respect to the filesystem: `export` renders the
/// complete file as a string and the driver performs the single write, so
/// a failing exporter leaves nothing behind.
pub trait LanguageExporter {
    fn kind(&self) -> ExporterKind;

    /// Output file name for this collection (e.g. "r4.ts")
    fn file_name(&self, collection: &DefinitionCollection) -> String;

    /// Whether two runs over the same collection produce byte-identical
    /// output. Exporters embedding timestamps or other run state must
    /// override this to return false.
    fn is_idempotent(&self) -> bool {
        true
    }

    fn export(
        &self,
        collection: &DefinitionCollection,
        config: &GeneratorConfig,
        diagnostics: &mut Diagnostics,
    ) -> Result<String>;
}

/// Explicitly-constructed set of exporters for a run. Iteration is ordered
/// by key, so multi-exporter runs process languages deterministically.
#[derive(Default)]
pub struct ExporterRegistry {
    exporters: BTreeMap<&'static str, Box<dyn LanguageExporter>>,
}

impl ExporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in exporter
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TypeScriptExporter::new()));
        registry.register(Box::new(InfoExporter::new()));
        registry
    }

    /// Register an exporter under its kind's key, replacing any previous
    /// registration for the same key.
    pub fn register(&mut self, exporter: Box<dyn LanguageExporter>) {
        self.exporters.insert(exporter.kind().key(), exporter);
    }

    pub fn get(&self, key: &str) -> Option<&dyn LanguageExporter> {
        self.exporters.get(key).map(Box::as_ref)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.exporters.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &dyn LanguageExporter)> {
        self.exporters.iter().map(|(k, v)| (*k, v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }
}
