//! Generation run configuration
//!
//! Every option remembers whether it was set explicitly or defaulted, so
//! the info report and logs can distinguish user intent from fallbacks.

use std::collections::BTreeSet;
use std::path::PathBuf;

/// Where an option's value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionSource {
    #[default]
    Default,
    Explicit,
}

/// An option value paired with its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    value: T,
    source: OptionSource,
}

impl<T> ConfigValue<T> {
    pub fn default_value(value: T) -> Self {
        Self {
            value,
            source: OptionSource::Default,
        }
    }

    pub fn explicit(value: T) -> Self {
        Self {
            value,
            source: OptionSource::Explicit,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn source(&self) -> OptionSource {
        self.source
    }

    pub fn is_explicit(&self) -> bool {
        self.source == OptionSource::Explicit
    }
}

/// How enumerated code types are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumStyle {
    /// A named type per value set, referenced from fields
    #[default]
    Referenced,
    /// Literal unions written inline at each field
    Inline,
}

/// Options for one generation run
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory generated files are written into
    pub output_dir: PathBuf,
    /// Restrict the run to these registry keys; empty means all registered
    /// exporters run
    pub export_keys: BTreeSet<String>,
    /// Restrict generation to these structure names; empty means all
    pub structure_names: BTreeSet<String>,
    /// Wrapping namespace/module name, for targets that support one
    pub namespace: ConfigValue<Option<String>>,
    /// Minimum target-language version recorded in output headers
    pub min_target_version: ConfigValue<Option<String>>,
    /// Enumerated-type emission style
    pub enum_style: ConfigValue<EnumStyle>,
    /// Emit per-element documentation comments
    pub write_docs: ConfigValue<bool>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated"),
            export_keys: BTreeSet::new(),
            structure_names: BTreeSet::new(),
            namespace: ConfigValue::default_value(None),
            min_target_version: ConfigValue::default_value(None),
            enum_style: ConfigValue::default_value(EnumStyle::Referenced),
            write_docs: ConfigValue::default_value(true),
        }
    }
}

impl GeneratorConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Whether an exporter registered under `key` participates in this run
    pub fn wants(&self, key: &str) -> bool {
        self.export_keys.is_empty() || self.export_keys.contains(key)
    }

    /// Whether the named structure is generated in this run
    pub fn wants_structure(&self, name: &str) -> bool {
        self.structure_names.is_empty() || self.structure_names.contains(name)
    }
}
