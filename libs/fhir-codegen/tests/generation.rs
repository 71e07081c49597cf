//! End-to-end generation over a small synthetic package

use crucible_codegen::exporters::{ExporterRegistry, TypeScriptExporter};
use crucible_codegen::{CodeGenerator, GeneratorConfig};
use crucible_defs::DefinitionCollection;
use crucible_models::{
    BindingStrength, ElementDefinition, ElementDefinitionBase, ElementDefinitionBinding,
    ElementDefinitionType, PublicationStatus, Snapshot, StructureDefinition,
    StructureDefinitionKind, ValueSet, ValueSetExpansion, ValueSetExpansionContains,
};
use std::fs;
use std::path::PathBuf;

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

fn inherited(path: &str, base_path: &str, code: &str) -> ElementDefinition {
    let mut elem = element(path, &[code], 0, "1");
    elem.base.as_mut().unwrap().path = base_path.to_string();
    elem
}

/// An Observation-like resource: required bound status, a three-type
/// choice, a nested backbone and a couple of inherited elements.
fn fixture_collection() -> DefinitionCollection {
    let mut sd = StructureDefinition::new(
        "http://hl7.org/fhir/StructureDefinition/Observation",
        "Observation",
        StructureDefinitionKind::Resource,
        "Observation",
    );
    let mut status = element("Observation.status", &["code"], 1, "1");
    status.binding = Some(ElementDefinitionBinding {
        strength: BindingStrength::Required,
        description: None,
        value_set: Some("http://hl7.org/fhir/ValueSet/observation-status".to_string()),
    });

    sd.snapshot = Some(Snapshot {
        element: vec![
            element("Observation", &[], 0, "*"),
            inherited("Observation.id", "Resource.id", "id"),
            inherited("Observation.language", "Resource.language", "code"),
            status,
            element(
                "Observation.value[x]",
                &["Quantity", "CodeableConcept", "string"],
                0,
                "1",
            ),
            element("Observation.component", &["BackboneElement"], 0, "*"),
            element("Observation.component.code", &["CodeableConcept"], 1, "1"),
            element(
                "Observation.component.value[x]",
                &["Quantity", "string"],
                0,
                "1",
            ),
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

    let mut collection = DefinitionCollection::new("hl7.fhir.r4.core", "4.0.1", "r4");
    collection.add_structure(sd);
    collection.add_value_set(vs);
    collection
}

fn run_once(tag: &str) -> (PathBuf, String) {
    let collection = fixture_collection();
    let out = std::env::temp_dir().join(format!("crucible-gen-{tag}-{}", std::process::id()));

    let mut registry = ExporterRegistry::new();
    registry.register(Box::new(TypeScriptExporter::new()));

    let summary = CodeGenerator::new(&collection, GeneratorConfig::new(&out))
        .run(&registry)
        .unwrap();
    assert!(summary.failures.is_empty());
    assert!(summary.diagnostics.is_empty());

    let path = out.join("r4.ts");
    let text = fs::read_to_string(&path).unwrap();
    (out, text)
}

#[test]
fn reruns_write_byte_identical_files() {
    let (out, first) = run_once("idem");
    let second = fs::read_to_string(out.join("r4.ts")).unwrap();
    assert_eq!(first, second);

    // A second full run over a fresh collection reproduces the same bytes
    let (out2, third) = run_once("idem2");
    assert_eq!(first, third);

    fs::remove_dir_all(&out).ok();
    fs::remove_dir_all(&out2).ok();
}

#[test]
fn choice_elements_are_complete_and_companioned() {
    let (out, text) = run_once("choice");

    assert!(text.contains("valueCodeableConcept?: CodeableConcept;"));
    assert!(text.contains("valueQuantity?: Quantity;"));
    assert!(text.contains("valueString?: string;"));
    assert!(text.contains("_valueString?: Element;"));
    assert!(!text.contains("_valueQuantity"));
    assert!(!text.contains("value[x]"));

    fs::remove_dir_all(&out).ok();
}

#[test]
fn inherited_elements_are_excluded() {
    let (out, text) = run_once("inherit");

    assert!(!text.contains("language"));
    assert!(!text.contains("\n  id"));

    fs::remove_dir_all(&out).ok();
}

#[test]
fn nested_backbone_gets_rooted_type() {
    let (out, text) = run_once("backbone");

    assert!(text.contains("export interface ObservationComponent {"));
    assert!(text.contains("component?: ObservationComponent[];"));
    // The nested choice keeps its own variants inside the component type
    let component_block = text
        .split("export interface ObservationComponent {")
        .nth(1)
        .unwrap();
    assert!(component_block.contains("valueQuantity?: Quantity;"));

    fs::remove_dir_all(&out).ok();
}

#[test]
fn required_binding_is_enumerated() {
    let (out, text) = run_once("enum");

    assert!(text.contains("status: ObservationStatusCodes;"));
    assert!(text.contains("export enum ObservationStatusCodes {"));
    assert!(text.contains("Final = \"final\","));

    fs::remove_dir_all(&out).ok();
}
