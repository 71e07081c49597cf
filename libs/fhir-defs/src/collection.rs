//! The definition index shared by all exporters

use crate::error::{Error, Result};
use crucible_models::{
    ElementDefinition, OperationDefinition, SearchParameter, StructureDefinition, ValueSet,
};
use std::collections::BTreeMap;

/// In-memory index of a FHIR package's conformance artifacts.
///
/// All maps are `BTreeMap`s keyed by canonical URL so that every iteration
/// order is stable; repeated generation runs against the same collection
/// visit artifacts in the same order.
#[derive(Debug, Clone, Default)]
pub struct DefinitionCollection {
    /// Package id (e.g. "hl7.fhir.r4.core")
    name: String,
    /// Package version (e.g. "4.0.1")
    version: String,
    /// Release sequence used in output file naming (e.g. "r4")
    sequence: String,

    structures: BTreeMap<String, StructureDefinition>,
    structure_names: BTreeMap<String, String>,
    value_sets: BTreeMap<String, ValueSet>,
    search_parameters: BTreeMap<String, SearchParameter>,
    operations: BTreeMap<String, OperationDefinition>,
}

impl DefinitionCollection {
    /// Create an empty collection for the given package identity
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        sequence: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            sequence: sequence.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Add a structure. A structure with the same canonical URL replaces
    /// the earlier one.
    pub fn add_structure(&mut self, sd: StructureDefinition) {
        if self.structures.contains_key(&sd.url) {
            tracing::debug!(url = %sd.url, "replacing structure definition");
        }
        self.structure_names.insert(sd.name.clone(), sd.url.clone());
        self.structures.insert(sd.url.clone(), sd);
    }

    pub fn add_value_set(&mut self, vs: ValueSet) {
        self.value_sets.insert(vs.url.clone(), vs);
    }

    pub fn add_search_parameter(&mut self, sp: SearchParameter) {
        self.search_parameters.insert(sp.url.clone(), sp);
    }

    pub fn add_operation(&mut self, op: OperationDefinition) {
        self.operations.insert(op.url.clone(), op);
    }

    /// Look up a structure by canonical URL, with or without a `|version`
    /// suffix.
    pub fn structure(&self, url: &str) -> Option<&StructureDefinition> {
        match self.structures.get(url) {
            Some(sd) => Some(sd),
            None => {
                let (bare, version) = split_versioned_url(url);
                self.structures
                    .get(bare)
                    .filter(|sd| version.is_none() || sd.version.as_deref() == version)
            }
        }
    }

    /// Look up a structure by its computer-friendly name
    pub fn structure_by_name(&self, name: &str) -> Option<&StructureDefinition> {
        self.structure_names
            .get(name)
            .and_then(|url| self.structures.get(url))
    }

    /// All structures, ordered by canonical URL
    pub fn structures(&self) -> impl Iterator<Item = &StructureDefinition> {
        self.structures.values()
    }

    /// Look up a value set by canonical URL, with or without `|version`
    pub fn value_set(&self, url: &str) -> Option<&ValueSet> {
        match self.value_sets.get(url) {
            Some(vs) => Some(vs),
            None => {
                let (bare, version) = split_versioned_url(url);
                self.value_sets
                    .get(bare)
                    .filter(|vs| version.is_none() || vs.version.as_deref() == version)
            }
        }
    }

    /// All value sets, ordered by canonical URL
    pub fn value_sets(&self) -> impl Iterator<Item = &ValueSet> {
        self.value_sets.values()
    }

    /// Search parameters applying to the named resource type, ordered by URL
    pub fn search_parameters_for(&self, resource_type: &str) -> Vec<&SearchParameter> {
        self.search_parameters
            .values()
            .filter(|sp| sp.applies_to(resource_type))
            .collect()
    }

    /// All search parameters, ordered by canonical URL
    pub fn search_parameters(&self) -> impl Iterator<Item = &SearchParameter> {
        self.search_parameters.values()
    }

    /// All operations, ordered by canonical URL
    pub fn operations(&self) -> impl Iterator<Item = &OperationDefinition> {
        self.operations.values()
    }

    /// Whether the given dotted path has child elements in its defining
    /// structure. The structure owning the path is found from the first
    /// path segment, so this also answers for paths in other structures
    /// (as reached through content references).
    pub fn path_has_children(&self, path: &str) -> bool {
        let root = path.split('.').next().unwrap_or(path);
        self.structure_by_name(root)
            .and_then(|sd| sd.snapshot.as_ref())
            .map(|s| s.has_children(path))
            .unwrap_or(false)
    }

    /// Ordered direct children of a dotted path, resolved through the
    /// structure named by the first path segment.
    pub fn children_of(&self, path: &str) -> Vec<&ElementDefinition> {
        let root = path.split('.').next().unwrap_or(path);
        self.structure_by_name(root)
            .and_then(|sd| sd.snapshot.as_ref())
            .map(|s| s.get_children(path))
            .unwrap_or_default()
    }

    /// Resolve a contentReference ("#Patient.contact") to the referenced
    /// element. The fragment is a dotted path whose first segment names the
    /// defining structure.
    pub fn resolve_content_reference<'a>(
        &'a self,
        owner: &'a StructureDefinition,
        reference: &str,
    ) -> Result<&'a ElementDefinition> {
        let path = reference.strip_prefix('#').unwrap_or(reference);
        let root = path.split('.').next().unwrap_or(path);

        let target = if root == owner.name || root == owner.type_ {
            Some(owner)
        } else {
            self.structure_by_name(root)
        };

        target
            .and_then(|sd| sd.element_by_path(path))
            .ok_or_else(|| Error::UnresolvableContentReference {
                structure: owner.name.clone(),
                reference: reference.to_string(),
            })
    }
}

/// Split "url|version" into its parts
fn split_versioned_url(url: &str) -> (&str, Option<&str>) {
    match url.split_once('|') {
        Some((bare, version)) => (bare, Some(version)),
        None => (url, None),
    }
}
