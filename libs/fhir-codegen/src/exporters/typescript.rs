//! TypeScript exporter
//!
//! Emits one `.ts` file per collection: an interface per component with
//! camelCase fields, extension-companion fields for primitives, and an
//! enum per required-bound code element. Output depends only on the
//! collection contents, so reruns are byte-identical.

use crate::components::ComponentWalker;
use crate::config::{EnumStyle, GeneratorConfig};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::exporters::{ExporterKind, LanguageExporter};
use crate::naming::{escape_reserved, path_to_name, sanitize_for_identifier, NameScope, NamingConvention};
use crate::primitives::PrimitiveTypeMap;
use crate::resolver::{CodedKind, TypeResolver, UNRESOLVED_TYPE};
use crate::writer::IndentedWriter;
use crucible_defs::DefinitionCollection;
use crucible_models::FlatConcept;
use heck::ToUpperCamelCase;
use std::collections::BTreeMap;

static TS_RESERVED: phf::Set<&'static str> = phf::phf_set! {
    "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "export", "extends", "false",
    "finally", "for", "function", "if", "implements", "import", "in",
    "instanceof", "interface", "let", "new", "null", "package", "private",
    "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with",
    "yield",
};

/// An enum declaration gathered during interface rendering, emitted after
/// all interfaces.
struct EnumDecl {
    name: String,
    concepts: Vec<FlatConcept>,
}

pub struct TypeScriptExporter {
    primitives: PrimitiveTypeMap,
}

impl TypeScriptExporter {
    pub fn new() -> Self {
        Self {
            primitives: PrimitiveTypeMap::new(&[
                ("boolean", "boolean"),
                ("integer", "number"),
                ("decimal", "number"),
                ("unsignedInt", "number"),
                ("positiveInt", "number"),
                // 64-bit values overflow JS numbers; FHIR's JSON form is a string
                ("integer64", "string"),
                ("string", "string"),
                ("code", "string"),
                ("id", "string"),
                ("markdown", "string"),
                ("uri", "string"),
                ("url", "string"),
                ("canonical", "string"),
                ("oid", "string"),
                ("uuid", "string"),
                ("date", "string"),
                ("dateTime", "string"),
                ("instant", "string"),
                ("time", "string"),
                ("base64Binary", "string"),
                ("xhtml", "string"),
            ]),
        }
    }

    fn type_expression(
        &self,
        code: &str,
        native: &str,
        enums: &BTreeMap<String, EnumDecl>,
        coded: &CodedKind,
        config: &GeneratorConfig,
        collection: &DefinitionCollection,
    ) -> String {
        if let CodedKind::Enum { value_set } = coded {
            match config.enum_style.get() {
                EnumStyle::Referenced => {
                    if let Some(decl) = enums.get(value_set) {
                        return decl.name.clone();
                    }
                }
                EnumStyle::Inline => {
                    if let Some(vs) = collection.value_set(value_set) {
                        let literals: Vec<String> = vs
                            .flattened_expansion()
                            .iter()
                            .map(|c| format!("\"{}\"", c.code))
                            .collect();
                        if !literals.is_empty() {
                            return literals.join(" | ");
                        }
                    }
                }
            }
        }

        if code.contains('.') {
            // Backbone or content-reference target: the rooted interface name
            return path_to_name(code, NamingConvention::Pascal, true, None);
        }
        if code == UNRESOLVED_TYPE {
            return UNRESOLVED_TYPE.to_string();
        }
        native.to_string()
    }
}

impl Default for TypeScriptExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageExporter for TypeScriptExporter {
    fn kind(&self) -> ExporterKind {
        ExporterKind::TypeScript
    }

    fn file_name(&self, collection: &DefinitionCollection) -> String {
        format!("{}.ts", collection.sequence())
    }

    fn export(
        &self,
        collection: &DefinitionCollection,
        config: &GeneratorConfig,
        diagnostics: &mut Diagnostics,
    ) -> Result<String> {
        let resolver = TypeResolver::new(collection, &self.primitives);
        let mut type_scope = NameScope::new("typescript types");
        let mut enums: BTreeMap<String, EnumDecl> = BTreeMap::new();
        let mut uses_sentinel = false;
        let mut body = IndentedWriter::new();

        for structure in collection.structures() {
            if structure.is_primitive() || structure.is_profile() {
                continue;
            }
            if !config.wants_structure(&structure.name) {
                continue;
            }

            for component in ComponentWalker::new(structure).walk() {
                let mut base_name =
                    path_to_name(&component.path, NamingConvention::Pascal, true, None);
                if let Some(slice) = &component.slice_name {
                    base_name.push_str(&sanitize_for_identifier(slice).to_upper_camel_case());
                }
                let interface_name = type_scope.claim(&base_name)?;

                let mut lines: Vec<String> = Vec::new();
                if component.is_root_of_structure && structure.is_resource() {
                    lines.push(format!("resourceType: \"{}\";", structure.type_));
                }

                for element in &component.elements {
                    let resolved = resolver.resolve(structure, element, diagnostics);

                    if let CodedKind::Enum { value_set } = &resolved.coded {
                        if *config.enum_style.get() == EnumStyle::Referenced
                            && !enums.contains_key(value_set)
                        {
                            if let Some(vs) = collection.value_set(value_set) {
                                let raw = vs
                                    .name
                                    .clone()
                                    .unwrap_or_else(|| last_url_segment(value_set));
                                let enum_base = format!(
                                    "{}Codes",
                                    sanitize_for_identifier(&raw).to_upper_camel_case()
                                );
                                let name = type_scope.claim(&enum_base)?;
                                enums.insert(
                                    value_set.clone(),
                                    EnumDecl {
                                        name,
                                        concepts: vs.flattened_expansion(),
                                    },
                                );
                            }
                        }
                    }

                    let optional = if resolved.is_optional() || resolved.is_choice {
                        "?"
                    } else {
                        ""
                    };
                    let array = if resolved.is_array() { "[]" } else { "" };

                    if *config.write_docs.get() {
                        if let Some(short) = &element.short {
                            lines.push(format!("/** {short} */"));
                        }
                    }

                    for variant in &resolved.variants {
                        if variant.code == UNRESOLVED_TYPE {
                            uses_sentinel = true;
                        }
                        let field = escape_reserved(
                            &NamingConvention::Camel.apply(&variant.name),
                            NamingConvention::Camel,
                            &TS_RESERVED,
                        );
                        let ts_type = self.type_expression(
                            &variant.code,
                            &variant.native,
                            &enums,
                            &resolved.coded,
                            config,
                            collection,
                        );
                        lines.push(format!("{field}{optional}: {ts_type}{array};"));
                        if variant.needs_companion {
                            lines.push(format!("_{field}?: Element{array};"));
                        }
                    }
                }

                if *config.write_docs.get() {
                    if let Some(short) = &component.element.short {
                        body.push_line(&format!("/** {short} */"));
                    }
                }

                let heritage = component
                    .is_root_of_structure
                    .then(|| structure.base_type_name())
                    .flatten()
                    .filter(|base| collection.structure_by_name(base).is_some())
                    .map(|base| format!(" extends {}", base.to_upper_camel_case()))
                    .unwrap_or_default();

                body.block(
                    &format!("export interface {interface_name}{heritage} {{"),
                    "}",
                    |body| {
                        for line in &lines {
                            body.push_line(line);
                        }
                    },
                );
                body.blank_line();
            }
        }

        // Enum declarations, ordered by value-set URL
        let mut enum_writer = IndentedWriter::new();
        for decl in enums.values() {
            let mut members = NameScope::new(decl.name.clone());
            let mut member_lines = Vec::with_capacity(decl.concepts.len());
            for concept in &decl.concepts {
                let base = sanitize_for_identifier(&concept.code).to_upper_camel_case();
                let member = members.claim(&base)?;
                member_lines.push(format!("{member} = \"{}\",", concept.code));
            }
            enum_writer.block(&format!("export enum {} {{", decl.name), "}", |w| {
                for line in &member_lines {
                    w.push_line(line);
                }
            });
            enum_writer.blank_line();
        }

        let mut content = body.into_inner();
        content.push_str(&enum_writer.into_inner());

        let mut out = IndentedWriter::new();
        out.push_line(&format!(
            "// Generated from {} {} ({})",
            collection.name(),
            collection.version(),
            collection.sequence()
        ));
        if let Some(min) = config.min_target_version.get() {
            out.push_line(&format!("// Minimum TypeScript version: {min}"));
        }
        out.blank_line();
        if uses_sentinel {
            out.push_line(&format!("export type {UNRESOLVED_TYPE} = unknown;"));
            out.blank_line();
        }

        let mut text = out.into_inner();
        match config.namespace.get() {
            Some(namespace) => {
                text.push_str(&format!("export namespace {namespace} {{\n"));
                for line in content.lines() {
                    if line.is_empty() {
                        text.push('\n');
                    } else {
                        text.push_str("  ");
                        text.push_str(line);
                        text.push('\n');
                    }
                }
                text.push_str("}\n");
            }
            None => text.push_str(&content),
        }

        Ok(text)
    }
}

fn last_url_segment(url: &str) -> String {
    let bare = url.split('|').next().unwrap_or(url);
    bare.rsplit('/').next().unwrap_or(bare).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_models::{
        BindingStrength, ElementDefinition, ElementDefinitionBase, ElementDefinitionBinding,
        ElementDefinitionType, PublicationStatus, Snapshot, StructureDefinition,
        StructureDefinitionKind, ValueSet, ValueSetExpansion, ValueSetExpansionContains,
    };

    fn element(path: &str, codes: &[&str], min: u32, max: &str) -> ElementDefinition {
        let mut elem = ElementDefinition::new(path);
        elem.min = Some(min);
        elem.max = Some(max.to_string());
        elem.base = Some(ElementDefinitionBase {
            path: path.to_string(),
            min,
            max: max.to_string(),
        });
        if !codes.is_empty() {
            elem.types = Some(codes.iter().map(|c| ElementDefinitionType::new(*c)).collect());
        }
        elem
    }

    fn observation_like() -> DefinitionCollection {
        let mut sd = StructureDefinition::new(
            "http://hl7.org/fhir/StructureDefinition/Observation",
            "Observation",
            StructureDefinitionKind::Resource,
            "Observation",
        );
        sd.snapshot = Some(Snapshot {
            element: vec![
                element("Observation", &[], 0, "*"),
                element("Observation.status", &["code"], 1, "1"),
                element(
                    "Observation.value[x]",
                    &["Quantity", "CodeableConcept", "string"],
                    0,
                    "1",
                ),
                element("Observation.component", &["BackboneElement"], 0, "*"),
                element("Observation.component.code", &["CodeableConcept"], 1, "1"),
            ],
        });

        let mut vs = ValueSet::new(
            "http://hl7.org/fhir/ValueSet/observation-status",
            PublicationStatus::Active,
        );
        vs.name = Some("ObservationStatus".to_string());
        vs.expansion = Some(ValueSetExpansion {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            total: None,
            contains: Some(
                ["registered", "preliminary", "final", "amended"]
                    .iter()
                    .map(|code| ValueSetExpansionContains {
                        system: Some("http://hl7.org/fhir/observation-status".to_string()),
                        is_abstract: None,
                        code: Some(code.to_string()),
                        display: None,
                        contains: None,
                    })
                    .collect(),
            ),
        });

        let mut status = ElementDefinition::new("Observation.status");
        // rebuild status with binding
        status.min = Some(1);
        status.max = Some("1".to_string());
        status.types = Some(vec![ElementDefinitionType::new("code")]);
        status.base = Some(ElementDefinitionBase {
            path: "Observation.status".to_string(),
            min: 1,
            max: "1".to_string(),
        });
        status.binding = Some(ElementDefinitionBinding {
            strength: BindingStrength::Required,
            description: None,
            value_set: Some("http://hl7.org/fhir/ValueSet/observation-status".to_string()),
        });
        sd.snapshot.as_mut().unwrap().element[1] = status;

        let mut collection = DefinitionCollection::new("hl7.fhir.r4.core", "4.0.1", "r4");
        collection.add_structure(sd);
        collection.add_value_set(vs);
        collection
    }

    fn run_export(collection: &DefinitionCollection) -> String {
        let exporter = TypeScriptExporter::new();
        let config = GeneratorConfig::default();
        let mut diagnostics = Diagnostics::new();
        exporter
            .export(collection, &config, &mut diagnostics)
            .unwrap()
    }

    #[test]
    fn file_name_uses_release_sequence() {
        let collection = observation_like();
        assert_eq!(
            TypeScriptExporter::new().file_name(&collection),
            "r4.ts"
        );
    }

    #[test]
    fn choice_element_emits_every_variant() {
        let text = run_export(&observation_like());
        assert!(text.contains("valueCodeableConcept?: CodeableConcept;"));
        assert!(text.contains("valueQuantity?: Quantity;"));
        assert!(text.contains("valueString?: string;"));
        // Companion only on the primitive variant
        assert!(text.contains("_valueString?: Element;"));
        assert!(!text.contains("_valueQuantity"));
    }

    #[test]
    fn backbone_gets_rooted_interface() {
        let text = run_export(&observation_like());
        assert!(text.contains("export interface ObservationComponent {"));
        assert!(text.contains("component?: ObservationComponent[];"));
    }

    #[test]
    fn required_binding_becomes_enum() {
        let text = run_export(&observation_like());
        assert!(text.contains("status: ObservationStatusCodes;"));
        assert!(text.contains("export enum ObservationStatusCodes {"));
        assert!(text.contains("Registered = \"registered\","));
    }

    #[test]
    fn resource_type_literal_on_root() {
        let text = run_export(&observation_like());
        assert!(text.contains("resourceType: \"Observation\";"));
    }

    #[test]
    fn inline_enum_style_writes_literal_union() {
        let collection = observation_like();
        let exporter = TypeScriptExporter::new();
        let mut config = GeneratorConfig::default();
        config.enum_style = crate::config::ConfigValue::explicit(EnumStyle::Inline);
        let mut diagnostics = Diagnostics::new();
        let text = exporter
            .export(&collection, &config, &mut diagnostics)
            .unwrap();
        assert!(text.contains("status: \"registered\" | \"preliminary\" | \"final\" | \"amended\";"));
        assert!(!text.contains("export enum"));
    }

    #[test]
    fn namespace_and_min_version_options() {
        let collection = observation_like();
        let exporter = TypeScriptExporter::new();
        let mut config = GeneratorConfig::default();
        config.namespace = crate::config::ConfigValue::explicit(Some("fhir".to_string()));
        config.min_target_version = crate::config::ConfigValue::explicit(Some("4.7".to_string()));
        let mut diagnostics = Diagnostics::new();
        let text = exporter
            .export(&collection, &config, &mut diagnostics)
            .unwrap();

        assert!(text.contains("// Minimum TypeScript version: 4.7"));
        assert!(text.contains("export namespace fhir {"));
        assert!(text.contains("  export interface Observation {"));
        assert!(text.trim_end().ends_with('}'));
    }

    #[test]
    fn structure_restriction_skips_others() {
        let collection = observation_like();
        let exporter = TypeScriptExporter::new();
        let mut config = GeneratorConfig::default();
        config.structure_names.insert("Patient".to_string());
        let mut diagnostics = Diagnostics::new();
        let text = exporter
            .export(&collection, &config, &mut diagnostics)
            .unwrap();
        assert!(!text.contains("export interface Observation"));
    }

    #[test]
    fn reruns_are_byte_identical() {
        let collection = observation_like();
        assert_eq!(run_export(&collection), run_export(&collection));
        assert!(TypeScriptExporter::new().is_idempotent());
    }

    #[test]
    fn reserved_field_names_are_escaped() {
        let mut sd = StructureDefinition::new(
            "http://example.org/StructureDefinition/Encounter",
            "Encounter",
            StructureDefinitionKind::Resource,
            "Encounter",
        );
        sd.snapshot = Some(Snapshot {
            element: vec![
                element("Encounter", &[], 0, "*"),
                element("Encounter.class", &["Coding"], 1, "1"),
            ],
        });
        let mut collection = DefinitionCollection::new("test.pkg", "1.0.0", "r4");
        collection.add_structure(sd);

        let text = run_export(&collection);
        assert!(text.contains("fhirClass: Coding;"));
        assert!(!text.contains("\nclass:"));
    }

    #[test]
    fn colliding_enum_members_get_numeric_suffixes() {
        let mut vs = ValueSet::new("http://example.org/vs/outcome", PublicationStatus::Active);
        vs.name = Some("Outcome".to_string());
        vs.expansion = Some(ValueSetExpansion {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            total: None,
            contains: Some(
                ["error", "Error", "ERROR"]
                    .iter()
                    .map(|code| ValueSetExpansionContains {
                        system: Some("http://example.org/cs".to_string()),
                        is_abstract: None,
                        code: Some(code.to_string()),
                        display: None,
                        contains: None,
                    })
                    .collect(),
            ),
        });

        let mut sd = StructureDefinition::new(
            "http://example.org/StructureDefinition/Job",
            "Job",
            StructureDefinitionKind::Resource,
            "Job",
        );
        let mut outcome = element("Job.outcome", &["code"], 0, "1");
        outcome.binding = Some(ElementDefinitionBinding {
            strength: BindingStrength::Required,
            description: None,
            value_set: Some("http://example.org/vs/outcome".to_string()),
        });
        sd.snapshot = Some(Snapshot {
            element: vec![element("Job", &[], 0, "*"), outcome],
        });

        let mut collection = DefinitionCollection::new("test.pkg", "1.0.0", "r4");
        collection.add_structure(sd);
        collection.add_value_set(vs);

        let text = run_export(&collection);
        assert!(text.contains("Error = \"error\","));
        assert!(text.contains("Error_2 = \"Error\","));
        assert!(text.contains("Error_3 = \"ERROR\","));
    }

    #[test]
    fn unresolved_elements_use_sentinel_alias() {
        let mut sd = StructureDefinition::new(
            "http://example.org/StructureDefinition/Broken",
            "Broken",
            StructureDefinitionKind::Resource,
            "Broken",
        );
        sd.snapshot = Some(Snapshot {
            element: vec![
                element("Broken", &[], 0, "*"),
                element("Broken.orphan", &[], 0, "1"),
            ],
        });
        let mut collection = DefinitionCollection::new("test.pkg", "1.0.0", "r4");
        collection.add_structure(sd);

        let exporter = TypeScriptExporter::new();
        let config = GeneratorConfig::default();
        let mut diagnostics = Diagnostics::new();
        let text = exporter
            .export(&collection, &config, &mut diagnostics)
            .unwrap();

        assert!(text.contains("export type UnresolvedType = unknown;"));
        assert!(text.contains("orphan?: UnresolvedType;"));
        assert_eq!(diagnostics.len(), 1);
    }
}
