//! Plain-text collection report
//!
//! A language-neutral summary of everything the engine resolved: one
//! section per structure with its components, element types, bindings and
//! slice discriminators, followed by the collection's search parameters
//! and operations. Useful for diffing two package versions and for
//! checking what an exporter will see.

use crate::components::ComponentWalker;
use crate::config::GeneratorConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::exporters::{ExporterKind, LanguageExporter};
use crate::primitives::PrimitiveTypeMap;
use crate::resolver::TypeResolver;
use crate::slicing::describe_slicing;
use crate::writer::IndentedWriter;
use crucible_defs::DefinitionCollection;

#[derive(Default)]
pub struct InfoExporter;

impl InfoExporter {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageExporter for InfoExporter {
    fn kind(&self) -> ExporterKind {
        ExporterKind::Info
    }

    fn file_name(&self, collection: &DefinitionCollection) -> String {
        format!("Info_{}.txt", collection.sequence())
    }

    fn export(
        &self,
        collection: &DefinitionCollection,
        _config: &GeneratorConfig,
        diagnostics: &mut Diagnostics,
    ) -> Result<String> {
        // The report shows FHIR types as-is; an identity table keeps the
        // resolver's choice-name expansion unchanged.
        let primitives = PrimitiveTypeMap::default();
        let resolver = TypeResolver::new(collection, &primitives);
        let mut w = IndentedWriter::new();

        w.push_line(&format!(
            "Package: {} {} ({})",
            collection.name(),
            collection.version(),
            collection.sequence()
        ));
        w.push_line(&format!(
            "Structures: {}, ValueSets: {}, SearchParameters: {}, Operations: {}",
            collection.structures().count(),
            collection.value_sets().count(),
            collection.search_parameters().count(),
            collection.operations().count()
        ));
        w.blank_line();

        for structure in collection.structures() {
            w.push_line(&format!("{} ({:?})", structure.name, structure.kind));
            w.indent();

            for component in ComponentWalker::new(structure).walk() {
                let slice_tag = component
                    .slice_name
                    .as_deref()
                    .map(|s| format!(" (slice {s})"))
                    .unwrap_or_default();
                w.push_line(&format!(
                    "{}{} [{}]",
                    component.path,
                    slice_tag,
                    component.element.cardinality_string()
                ));
                w.indent();
                for element in &component.elements {
                    let resolved = resolver.resolve(structure, element, diagnostics);
                    let types: Vec<&str> =
                        resolved.variants.iter().map(|v| v.code.as_str()).collect();
                    let binding = element
                        .binding
                        .as_ref()
                        .and_then(|b| {
                            b.value_set
                                .as_deref()
                                .map(|vs| format!(" binding {:?} {vs}", b.strength))
                        })
                        .unwrap_or_default();
                    w.push_line(&format!(
                        "{}: {} [{}]{}",
                        element.name(),
                        types.join(" | "),
                        element.cardinality_string(),
                        binding
                    ));

                    if element.slicing.is_some() {
                        for description in describe_slicing(collection, structure, element) {
                            w.indent();
                            w.push_line(&format!(
                                "slice {}: {:?} {}",
                                description.slice_name,
                                description.discriminator,
                                description.detail
                            ));
                            w.dedent();
                        }
                    }
                }
                w.dedent();
            }

            let search_params = collection.search_parameters_for(&structure.type_);
            if !search_params.is_empty() {
                w.push_line("search parameters:");
                w.indent();
                for sp in search_params {
                    w.push_line(&format!("{} ({:?})", sp.code, sp.type_));
                }
                w.dedent();
            }

            w.dedent();
            w.blank_line();
        }

        let operations: Vec<_> = collection.operations().collect();
        if !operations.is_empty() {
            w.push_line("operations:");
            w.indent();
            for op in operations {
                w.push_line(&format!(
                    "${} in: {} out: {}",
                    op.code,
                    op.in_parameters().len(),
                    op.out_parameters().len()
                ));
            }
            w.dedent();
        }

        Ok(w.into_inner())
    }
}
