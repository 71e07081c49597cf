//! Directory loader for FHIR definition JSON
//!
//! Reads every `*.json` file in a directory, dispatches on `resourceType`
//! and fills a [`DefinitionCollection`]. Load problems never abort the
//! whole run: failures are collected into a file -> reason map and
//! reported at the end, matching the batch behavior of the generation
//! pipeline itself.

use crate::collection::DefinitionCollection;
use crate::error::Result;
use crucible_models::{OperationDefinition, SearchParameter, StructureDefinition, ValueSet};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Summary of a directory load
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Conformance resources added to the collection
    pub loaded: usize,
    /// Files with a resourceType the generator does not consume
    pub skipped: usize,
    /// File name -> reason, for files that could not be loaded
    pub failures: BTreeMap<String, String>,
}

impl DefinitionCollection {
    /// Load all `*.json` files from a directory into this collection.
    ///
    /// Files are visited in name order so repeated loads build identical
    /// collections. Returns the outcome; only an unreadable directory is
    /// an error.
    pub fn load_directory(&mut self, dir: &Path) -> Result<LoadOutcome> {
        let mut outcome = LoadOutcome::default();

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            match load_file(self, &path) {
                Ok(true) => outcome.loaded += 1,
                Ok(false) => outcome.skipped += 1,
                Err(reason) => {
                    tracing::warn!(file = %file_name, %reason, "failed to load definition");
                    outcome.failures.insert(file_name, reason);
                }
            }
        }

        tracing::debug!(
            loaded = outcome.loaded,
            skipped = outcome.skipped,
            failed = outcome.failures.len(),
            "directory load complete"
        );
        Ok(outcome)
    }
}

/// Load one file. Ok(true) = added, Ok(false) = skipped, Err = reason text.
fn load_file(
    collection: &mut DefinitionCollection,
    path: &Path,
) -> std::result::Result<bool, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|e| e.to_string())?;

    let resource_type = value
        .get("resourceType")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "missing resourceType".to_string())?;

    match resource_type {
        "StructureDefinition" => {
            let sd: StructureDefinition =
                serde_json::from_value(value).map_err(|e| e.to_string())?;
            collection.add_structure(sd);
            Ok(true)
        }
        "ValueSet" => {
            let vs: ValueSet = serde_json::from_value(value).map_err(|e| e.to_string())?;
            collection.add_value_set(vs);
            Ok(true)
        }
        "SearchParameter" => {
            let sp: SearchParameter = serde_json::from_value(value).map_err(|e| e.to_string())?;
            collection.add_search_parameter(sp);
            Ok(true)
        }
        "OperationDefinition" => {
            let op: OperationDefinition =
                serde_json::from_value(value).map_err(|e| e.to_string())?;
            collection.add_operation(op);
            Ok(true)
        }
        _ => Ok(false),
    }
}
