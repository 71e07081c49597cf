//! Effective-type resolution for elements
//!
//! For a given element this module determines the ordered set of
//! name/type variants it exports as, the fallback type when no type
//! reference is declared (content reference, inline backbone, or base
//! type), and whether a required binding makes the element eligible for
//! an enumerated representation.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::naming::strip_choice_marker;
use crate::primitives::{is_fhir_primitive, PrimitiveTypeMap};
use crucible_defs::DefinitionCollection;
use crucible_models::{ElementDefinition, StructureDefinition};
use heck::ToUpperCamelCase;

/// Sentinel type name substituted when an element has neither a type,
/// children, nor a usable base. Generation continues; the affected path
/// is reported as a diagnostic.
pub const UNRESOLVED_TYPE: &str = "UnresolvedType";

/// Value sets excluded from enumerated-type generation: their expansions
/// are open-ended or impractically large.
static UNEXPORTABLE_VALUE_SETS: phf::Set<&'static str> = phf::phf_set! {
    "http://hl7.org/fhir/ValueSet/mimetypes",
    "http://hl7.org/fhir/ValueSet/all-languages",
    "http://hl7.org/fhir/ValueSet/languages",
    "http://hl7.org/fhir/ValueSet/ucum-units",
};

/// Where a resolved type came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOrigin {
    /// An explicit type reference on the element
    Declared,
    /// Borrowed from a contentReference target's subtree
    ContentReference,
    /// The element's own path - an inline backbone with children
    InlineBackbone,
    /// The element's base type (e.g. BackboneElement, Element)
    BaseFallback,
    /// Nothing usable; the sentinel type
    Unresolved,
}

/// One exportable name/type pair for an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeVariant {
    /// Export name for this variant ("value" or "valueQuantity")
    pub name: String,
    /// FHIR type code, or a dotted path for backbone/content-reference types
    pub code: String,
    /// Target-language native type (after primitive substitution)
    pub native: String,
    /// Target profiles (for Reference/canonical types)
    pub target_profiles: Vec<String>,
    /// Primitive variants get an extension-companion field in exporters
    pub needs_companion: bool,
}

/// Enumerated-code companion decision for a bound element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodedKind {
    /// Not eligible; export the raw primitive type
    None,
    /// Eligible: a required binding with a resolvable expansion
    Enum { value_set: String },
}

/// The resolver's output for one element
#[derive(Debug, Clone)]
pub struct ResolvedElement {
    pub path: String,
    /// Element name with the choice placeholder stripped
    pub base_name: String,
    pub min: u32,
    /// None = unbounded ("*")
    pub max: Option<u32>,
    /// Name/type pairs, ordered by type code for deterministic output
    pub variants: Vec<TypeVariant>,
    pub origin: TypeOrigin,
    pub is_choice: bool,
    pub coded: CodedKind,
}

impl ResolvedElement {
    pub fn is_array(&self) -> bool {
        self.max.map(|m| m > 1).unwrap_or(true)
    }

    pub fn is_optional(&self) -> bool {
        self.min == 0
    }
}

/// Resolves elements against a definition collection and a
/// language-supplied primitive table.
pub struct TypeResolver<'a> {
    collection: &'a DefinitionCollection,
    primitives: &'a PrimitiveTypeMap,
}

impl<'a> TypeResolver<'a> {
    pub fn new(collection: &'a DefinitionCollection, primitives: &'a PrimitiveTypeMap) -> Self {
        Self {
            collection,
            primitives,
        }
    }

    /// Resolve an element's effective type set.
    ///
    /// Never fails: authoring errors in the source definitions resolve to
    /// [`UNRESOLVED_TYPE`] and a diagnostic, so a run can complete and
    /// report all affected paths at once.
    pub fn resolve(
        &self,
        structure: &StructureDefinition,
        element: &ElementDefinition,
        diagnostics: &mut Diagnostics,
    ) -> ResolvedElement {
        let base_name = strip_choice_marker(element.name()).to_string();
        let is_choice = element.is_choice_type();
        let (min, max) = cardinality(element);

        let declared = element.types.as_deref().unwrap_or(&[]);

        let (variants, origin) = if declared.is_empty() {
            self.resolve_fallback(structure, element, &base_name, diagnostics)
        } else if is_choice {
            (
                self.resolve_choice(element, &base_name, declared, diagnostics),
                TypeOrigin::Declared,
            )
        } else if self.is_inline_backbone(element, declared) {
            // Declared as BackboneElement/Element with child elements: the
            // element's own subtree is the type.
            (
                vec![self.path_variant(&base_name, &element.path)],
                TypeOrigin::InlineBackbone,
            )
        } else {
            // Multiple non-choice type references collapse onto one name;
            // order by code and keep them all as alternatives.
            let mut sorted: Vec<_> = declared.iter().collect();
            sorted.sort_by(|a, b| a.code.cmp(&b.code));
            let variants = sorted
                .into_iter()
                .map(|t| self.make_variant(base_name.clone(), &t.code, t))
                .collect();
            (variants, TypeOrigin::Declared)
        };

        let coded = self.coded_kind(element, &variants, diagnostics);

        ResolvedElement {
            path: element.path.clone(),
            base_name,
            min,
            max,
            variants,
            origin,
            is_choice,
            coded,
        }
    }

    fn is_inline_backbone(
        &self,
        element: &ElementDefinition,
        declared: &[crucible_models::ElementDefinitionType],
    ) -> bool {
        declared.len() == 1
            && matches!(declared[0].code.as_str(), "BackboneElement" | "Element")
            && self.collection.path_has_children(&element.path)
    }

    /// Fallback chain for elements with no declared type references:
    /// content reference -> inline backbone -> base type -> sentinel.
    fn resolve_fallback(
        &self,
        structure: &StructureDefinition,
        element: &ElementDefinition,
        base_name: &str,
        diagnostics: &mut Diagnostics,
    ) -> (Vec<TypeVariant>, TypeOrigin) {
        if let Some(reference) = &element.content_reference {
            return match self.collection.resolve_content_reference(structure, reference) {
                Ok(target) => {
                    let variant = self.path_variant(base_name, &target.path);
                    (vec![variant], TypeOrigin::ContentReference)
                }
                Err(_) => {
                    diagnostics.push(Diagnostic::UnknownContentReference {
                        path: element.path.clone(),
                        reference: reference.clone(),
                    });
                    (
                        vec![self.sentinel_variant(base_name)],
                        TypeOrigin::Unresolved,
                    )
                }
            };
        }

        if self.collection.path_has_children(&element.path) {
            let variant = self.path_variant(base_name, &element.path);
            return (vec![variant], TypeOrigin::InlineBackbone);
        }

        // A base path identical to the element's own carries no extra type
        // information; only a redefinition elsewhere does.
        let redefined = element
            .base
            .as_ref()
            .is_some_and(|b| b.path != element.path);
        if redefined {
            if let Some(base_type) = element.base_root() {
                let variant = self.make_variant_bare(base_name.to_string(), base_type);
                return (vec![variant], TypeOrigin::BaseFallback);
            }
        }

        diagnostics.push(Diagnostic::UnresolvedType {
            path: element.path.clone(),
        });
        (
            vec![self.sentinel_variant(base_name)],
            TypeOrigin::Unresolved,
        )
    }

    /// Expand a choice element into one variant per declared type.
    ///
    /// Variants are ordered by type code. Two types that sanitize to the
    /// same combined name keep the first and report the duplicate - the
    /// source data is ambiguous and must not be silently dropped.
    fn resolve_choice(
        &self,
        element: &ElementDefinition,
        base_name: &str,
        declared: &[crucible_models::ElementDefinitionType],
        diagnostics: &mut Diagnostics,
    ) -> Vec<TypeVariant> {
        let mut sorted: Vec<_> = declared.iter().collect();
        sorted.sort_by(|a, b| a.code.cmp(&b.code));

        let mut variants: Vec<TypeVariant> = Vec::with_capacity(sorted.len());
        for type_ref in sorted {
            let native = self.primitives.native(&type_ref.code);
            let combined = format!("{base_name}{}", native.to_upper_camel_case());

            if variants.iter().any(|v| v.name == combined) {
                diagnostics.push(Diagnostic::DuplicateChoiceVariant {
                    path: element.path.clone(),
                    variant: combined,
                });
                continue;
            }

            variants.push(self.make_variant(combined, &type_ref.code, type_ref));
        }
        variants
    }

    fn make_variant(
        &self,
        name: String,
        code: &str,
        type_ref: &crucible_models::ElementDefinitionType,
    ) -> TypeVariant {
        TypeVariant {
            name,
            code: code.to_string(),
            native: self.primitives.native(code).to_string(),
            target_profiles: type_ref.target_profile.clone().unwrap_or_default(),
            needs_companion: is_fhir_primitive(code),
        }
    }

    fn make_variant_bare(&self, name: String, code: &str) -> TypeVariant {
        TypeVariant {
            name,
            code: code.to_string(),
            native: self.primitives.native(code).to_string(),
            target_profiles: Vec::new(),
            needs_companion: is_fhir_primitive(code),
        }
    }

    /// A variant whose type is a dotted path (backbone or content
    /// reference); the exporter resolves the path to a rooted type name.
    fn path_variant(&self, base_name: &str, path: &str) -> TypeVariant {
        TypeVariant {
            name: base_name.to_string(),
            code: path.to_string(),
            native: path.to_string(),
            target_profiles: Vec::new(),
            needs_companion: false,
        }
    }

    fn sentinel_variant(&self, base_name: &str) -> TypeVariant {
        TypeVariant {
            name: base_name.to_string(),
            code: UNRESOLVED_TYPE.to_string(),
            native: UNRESOLVED_TYPE.to_string(),
            target_profiles: Vec::new(),
            needs_companion: false,
        }
    }

    /// Decide enumerated-representation eligibility: a leaf `code`-typed
    /// element with a required binding, whose value set is exportable and
    /// actually expandable.
    fn coded_kind(
        &self,
        element: &ElementDefinition,
        variants: &[TypeVariant],
        diagnostics: &mut Diagnostics,
    ) -> CodedKind {
        let is_code_leaf = variants.len() == 1 && variants[0].code == "code";
        if !is_code_leaf {
            return CodedKind::None;
        }

        let Some(value_set_url) = element.required_binding() else {
            return CodedKind::None;
        };

        let bare_url = value_set_url.split('|').next().unwrap_or(value_set_url);
        if UNEXPORTABLE_VALUE_SETS.contains(bare_url) {
            return CodedKind::None;
        }

        match self.collection.value_set(value_set_url) {
            Some(vs) if vs.has_expansion() => CodedKind::Enum {
                value_set: value_set_url.to_string(),
            },
            _ => {
                diagnostics.push(Diagnostic::MissingExpansion {
                    path: element.path.clone(),
                    value_set: value_set_url.to_string(),
                });
                CodedKind::None
            }
        }
    }
}

fn cardinality(element: &ElementDefinition) -> (u32, Option<u32>) {
    let min = element.min.unwrap_or(0);
    let max = match element.max.as_deref() {
        Some("*") => None,
        Some(n) => n.parse().ok(),
        None => Some(1),
    };
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_models::{
        BindingStrength, ElementDefinitionBase, ElementDefinitionBinding, ElementDefinitionType,
        PublicationStatus, Snapshot, StructureDefinitionKind, ValueSet, ValueSetExpansion,
        ValueSetExpansionContains,
    };

    fn make_structure(name: &str, paths: &[&str]) -> crucible_models::StructureDefinition {
        let mut sd = crucible_models::StructureDefinition::new(
            format!("http://hl7.org/fhir/StructureDefinition/{name}"),
            name,
            StructureDefinitionKind::Resource,
            name,
        );
        sd.snapshot = Some(Snapshot {
            element: paths.iter().map(|p| ElementDefinition::new(*p)).collect(),
        });
        sd
    }

    fn make_collection() -> DefinitionCollection {
        DefinitionCollection::new("test.pkg", "1.0.0", "r4")
    }

    fn primitives() -> PrimitiveTypeMap {
        PrimitiveTypeMap::new(&[
            ("boolean", "boolean"),
            ("integer", "number"),
            ("string", "string"),
            ("code", "string"),
            ("dateTime", "string"),
        ])
    }

    fn typed_element(path: &str, codes: &[&str]) -> ElementDefinition {
        let mut elem = ElementDefinition::new(path);
        elem.max = Some("1".to_string());
        elem.types = Some(codes.iter().copied().map(ElementDefinitionType::new).collect());
        elem
    }

    #[test]
    fn choice_element_expands_per_variant() {
        let collection = make_collection();
        let primitives = primitives();
        let resolver = TypeResolver::new(&collection, &primitives);
        let sd = make_structure("Observation", &["Observation"]);
        let elem = typed_element(
            "Observation.value[x]",
            &["Quantity", "CodeableConcept", "string"],
        );

        let mut diagnostics = Diagnostics::new();
        let resolved = resolver.resolve(&sd, &elem, &mut diagnostics);

        assert!(resolved.is_choice);
        let names: Vec<_> = resolved.variants.iter().map(|v| v.name.as_str()).collect();
        // Ordered by type code: CodeableConcept < Quantity < string
        assert_eq!(
            names,
            vec!["valueCodeableConcept", "valueQuantity", "valueString"]
        );
        assert!(!resolved.variants[0].needs_companion);
        assert!(!resolved.variants[1].needs_companion);
        assert!(resolved.variants[2].needs_companion);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn duplicate_choice_variant_is_reported_not_dropped_silently() {
        let collection = make_collection();
        // Both map to native "string", so both combine to "valueString"
        let primitives = PrimitiveTypeMap::new(&[("string", "string"), ("markdown", "string")]);
        let resolver = TypeResolver::new(&collection, &primitives);
        let sd = make_structure("Test", &["Test"]);
        let elem = typed_element("Test.value[x]", &["markdown", "string"]);

        let mut diagnostics = Diagnostics::new();
        let resolved = resolver.resolve(&sd, &elem, &mut diagnostics);

        assert_eq!(resolved.variants.len(), 1);
        assert_eq!(resolved.variants[0].code, "markdown");
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics.iter().next().unwrap(),
            Diagnostic::DuplicateChoiceVariant { .. }
        ));
    }

    #[test]
    fn content_reference_borrows_target_path() {
        let mut collection = make_collection();
        collection.add_structure(make_structure(
            "Questionnaire",
            &["Questionnaire", "Questionnaire.item", "Questionnaire.item.text"],
        ));
        let primitives = primitives();
        let resolver = TypeResolver::new(&collection, &primitives);

        let sd = collection.structure_by_name("Questionnaire").unwrap();
        let mut elem = ElementDefinition::new("Questionnaire.item.item");
        elem.content_reference = Some("#Questionnaire.item".to_string());

        let mut diagnostics = Diagnostics::new();
        let resolved = resolver.resolve(sd, &elem, &mut diagnostics);

        assert_eq!(resolved.origin, TypeOrigin::ContentReference);
        assert_eq!(resolved.variants[0].code, "Questionnaire.item");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn inline_backbone_uses_own_path() {
        let mut collection = make_collection();
        collection.add_structure(make_structure(
            "Patient",
            &["Patient", "Patient.contact", "Patient.contact.name"],
        ));
        let primitives = primitives();
        let resolver = TypeResolver::new(&collection, &primitives);

        let sd = collection.structure_by_name("Patient").unwrap();
        let elem = ElementDefinition::new("Patient.contact");

        let mut diagnostics = Diagnostics::new();
        let resolved = resolver.resolve(sd, &elem, &mut diagnostics);

        assert_eq!(resolved.origin, TypeOrigin::InlineBackbone);
        assert_eq!(resolved.variants[0].code, "Patient.contact");
    }

    #[test]
    fn base_fallback_translates_through_primitive_map() {
        let collection = make_collection();
        let primitives = primitives();
        let resolver = TypeResolver::new(&collection, &primitives);
        let sd = make_structure("Test", &["Test"]);

        let mut elem = ElementDefinition::new("Test.leaf");
        elem.base = Some(ElementDefinitionBase {
            path: "Element.leaf".to_string(),
            min: 0,
            max: "1".to_string(),
        });

        let mut diagnostics = Diagnostics::new();
        let resolved = resolver.resolve(&sd, &elem, &mut diagnostics);

        assert_eq!(resolved.origin, TypeOrigin::BaseFallback);
        assert_eq!(resolved.variants[0].code, "Element");
    }

    #[test]
    fn unresolvable_element_gets_sentinel_and_diagnostic() {
        let collection = make_collection();
        let primitives = primitives();
        let resolver = TypeResolver::new(&collection, &primitives);
        let sd = make_structure("Test", &["Test"]);
        let elem = ElementDefinition::new("Test.orphan");

        let mut diagnostics = Diagnostics::new();
        let resolved = resolver.resolve(&sd, &elem, &mut diagnostics);

        assert_eq!(resolved.origin, TypeOrigin::Unresolved);
        assert_eq!(resolved.variants[0].code, UNRESOLVED_TYPE);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn required_code_binding_is_enum_eligible() {
        let mut collection = make_collection();
        let mut vs = ValueSet::new(
            "http://hl7.org/fhir/ValueSet/remittance-outcome",
            PublicationStatus::Active,
        );
        vs.expansion = Some(ValueSetExpansion {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            total: None,
            contains: Some(
                ["complete", "error", "partial", "queued"]
                    .iter()
                    .map(|code| ValueSetExpansionContains {
                        system: Some("http://hl7.org/fhir/remittance-outcome".to_string()),
                        is_abstract: None,
                        code: Some(code.to_string()),
                        display: None,
                        contains: None,
                    })
                    .collect(),
            ),
        });
        collection.add_value_set(vs);

        let primitives = primitives();
        let resolver = TypeResolver::new(&collection, &primitives);
        let sd = make_structure("PaymentReconciliation", &["PaymentReconciliation"]);

        let mut elem = typed_element("PaymentReconciliation.outcome", &["code"]);
        elem.binding = Some(ElementDefinitionBinding {
            strength: BindingStrength::Required,
            description: None,
            value_set: Some("http://hl7.org/fhir/ValueSet/remittance-outcome".to_string()),
        });

        let mut diagnostics = Diagnostics::new();
        let resolved = resolver.resolve(&sd, &elem, &mut diagnostics);

        assert_eq!(
            resolved.coded,
            CodedKind::Enum {
                value_set: "http://hl7.org/fhir/ValueSet/remittance-outcome".to_string()
            }
        );
    }

    #[test]
    fn unexportable_value_sets_stay_raw() {
        let collection = make_collection();
        let primitives = primitives();
        let resolver = TypeResolver::new(&collection, &primitives);
        let sd = make_structure("Attachment", &["Attachment"]);

        let mut elem = typed_element("Attachment.contentType", &["code"]);
        elem.binding = Some(ElementDefinitionBinding {
            strength: BindingStrength::Required,
            description: None,
            value_set: Some("http://hl7.org/fhir/ValueSet/mimetypes|4.0.1".to_string()),
        });

        let mut diagnostics = Diagnostics::new();
        let resolved = resolver.resolve(&sd, &elem, &mut diagnostics);

        assert_eq!(resolved.coded, CodedKind::None);
        // Exclusion is not a missing expansion; no diagnostic expected
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn example_binding_is_not_enum_eligible() {
        let collection = make_collection();
        let primitives = primitives();
        let resolver = TypeResolver::new(&collection, &primitives);
        let sd = make_structure("Test", &["Test"]);

        let mut elem = typed_element("Test.status", &["code"]);
        elem.binding = Some(ElementDefinitionBinding {
            strength: BindingStrength::Example,
            description: None,
            value_set: Some("http://example.org/vs".to_string()),
        });

        let mut diagnostics = Diagnostics::new();
        let resolved = resolver.resolve(&sd, &elem, &mut diagnostics);
        assert_eq!(resolved.coded, CodedKind::None);
    }

    #[test]
    fn unbounded_cardinality_is_array() {
        let collection = make_collection();
        let primitives = primitives();
        let resolver = TypeResolver::new(&collection, &primitives);
        let sd = make_structure("Patient", &["Patient"]);

        let mut elem = typed_element("Patient.name", &["HumanName"]);
        elem.max = Some("*".to_string());

        let mut diagnostics = Diagnostics::new();
        let resolved = resolver.resolve(&sd, &elem, &mut diagnostics);
        assert!(resolved.is_array());
        assert!(resolved.is_optional());
    }
}
