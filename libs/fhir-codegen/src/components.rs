//! Structure decomposition into components
//!
//! A component is one generated type: the structure root, each backbone
//! element with children, and each named slice with its own sub-elements.
//! The walk is depth-first with parents emitted before their children, so
//! exporters can write nested types in declaration order.

use crate::error::{Error, Result};
use crucible_models::{ElementDefinition, StructureDefinition};

/// One generated type rooted at an element path
#[derive(Debug, Clone)]
pub struct Component<'a> {
    /// Dotted path of the component root ("Patient.contact")
    pub path: String,
    /// The root element itself
    pub element: &'a ElementDefinition,
    /// True only for the component at the structure's own root
    pub is_root_of_structure: bool,
    /// Set when this component represents a named slice
    pub slice_name: Option<String>,
    /// Direct child elements, in snapshot order, with inherited elements
    /// and slice entries filtered out
    pub elements: Vec<&'a ElementDefinition>,
}

impl<'a> Component<'a> {
    fn new(element: &'a ElementDefinition, is_root_of_structure: bool) -> Self {
        Self {
            path: element.path.clone(),
            element,
            is_root_of_structure,
            slice_name: element.slice_name.clone(),
            elements: Vec::new(),
        }
    }

    /// Merge another component's elements into this one. Both must be
    /// rooted at the same path; anything else is a programming error in
    /// the caller and fails immediately.
    pub fn absorb(&mut self, other: Component<'a>) -> Result<()> {
        if self.path != other.path {
            return Err(Error::ComponentMismatch {
                expected: self.path.clone(),
                found: other.path,
            });
        }
        self.elements.extend(other.elements);
        Ok(())
    }
}

/// Decomposes one structure's snapshot into its components
pub struct ComponentWalker<'a> {
    structure: &'a StructureDefinition,
}

impl<'a> ComponentWalker<'a> {
    pub fn new(structure: &'a StructureDefinition) -> Self {
        Self { structure }
    }

    /// Walk the whole snapshot. The first component is the structure root;
    /// backbone and slice components follow in depth-first order.
    ///
    /// Primitive structures yield exactly one component: their synthetic
    /// value/extension children belong to the primitive machinery, not to
    /// generated types.
    pub fn walk(&self) -> Vec<Component<'a>> {
        let elements = self.structure.elements();
        let Some(root) = elements.first() else {
            return Vec::new();
        };

        if self.structure.is_primitive() {
            return vec![Component::new(root, true)];
        }

        self.walk_elements(root, &elements[1..], true)
    }

    /// Resume the walk at an element inside the snapshot, yielding only the
    /// components of that subtree. Used for content-reference targets.
    pub fn walk_from(&self, resume_path: &str) -> Vec<Component<'a>> {
        let elements = self.structure.elements();
        let Some(start) = elements.iter().position(|e| e.path == resume_path) else {
            return Vec::new();
        };

        let root = &elements[start];
        let subtree_end = elements[start + 1..]
            .iter()
            .position(|e| !e.is_descendant_of(resume_path))
            .map(|offset| start + 1 + offset)
            .unwrap_or(elements.len());

        self.walk_elements(root, &elements[start + 1..subtree_end], false)
    }

    fn walk_elements(
        &self,
        root: &'a ElementDefinition,
        rest: &'a [ElementDefinition],
        is_structure_root: bool,
    ) -> Vec<Component<'a>> {
        let mut components = vec![Component::new(root, is_structure_root)];

        for element in rest {
            if self.is_inherited(element) {
                continue;
            }

            let Some(parent) = element.parent_path() else {
                continue;
            };
            // Attach to the most recently opened component at the parent
            // path; after a slice entry that is the slice's component.
            let Some(owner) = components.iter().rposition(|c| c.path == parent) else {
                continue;
            };

            if element.is_slice() {
                components.push(Component::new(element, false));
                continue;
            }

            components[owner].elements.push(element);

            let opens_component = !element.is_choice_type()
                && rest.iter().any(|e| e.is_descendant_of(&element.path));
            if opens_component {
                components.push(Component::new(element, false));
            }
        }

        // A component with no sub-elements of its own (a slice without
        // children, or a sliced entry whose children all sit under its
        // slices) reuses the unsliced or parent type instead.
        components.retain(|c| c.is_root_of_structure || !c.elements.is_empty());
        components
    }

    /// An element first defined by some other structure was inherited from
    /// a base type and belongs to the base's generated type, not this one.
    fn is_inherited(&self, element: &ElementDefinition) -> bool {
        match element.base_root() {
            Some(root) => root != self.structure.name && root != self.structure.type_,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_models::{ElementDefinitionBase, Snapshot, StructureDefinitionKind};

    fn based(path: &str, base_path: &str) -> ElementDefinition {
        let mut elem = ElementDefinition::new(path);
        elem.base = Some(ElementDefinitionBase {
            path: base_path.to_string(),
            min: 0,
            max: "1".to_string(),
        });
        elem
    }

    fn make_structure(
        name: &str,
        kind: StructureDefinitionKind,
        elements: Vec<ElementDefinition>,
    ) -> StructureDefinition {
        let mut sd = StructureDefinition::new(
            format!("http://hl7.org/fhir/StructureDefinition/{name}"),
            name,
            kind,
            name,
        );
        sd.snapshot = Some(Snapshot { element: elements });
        sd
    }

    #[test]
    fn root_then_backbones_depth_first() {
        let sd = make_structure(
            "Patient",
            StructureDefinitionKind::Resource,
            vec![
                based("Patient", "Patient"),
                based("Patient.gender", "Patient.gender"),
                based("Patient.contact", "Patient.contact"),
                based("Patient.contact.name", "Patient.contact.name"),
                based("Patient.contact.telecom", "Patient.contact.telecom"),
                based("Patient.link", "Patient.link"),
                based("Patient.link.other", "Patient.link.other"),
            ],
        );

        let components = ComponentWalker::new(&sd).walk();
        let paths: Vec<_> = components.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["Patient", "Patient.contact", "Patient.link"]);
        assert!(components[0].is_root_of_structure);
        assert!(!components[1].is_root_of_structure);

        let root_fields: Vec<_> = components[0]
            .elements
            .iter()
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(
            root_fields,
            vec!["Patient.gender", "Patient.contact", "Patient.link"]
        );
        let contact_fields: Vec<_> = components[1]
            .elements
            .iter()
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(
            contact_fields,
            vec!["Patient.contact.name", "Patient.contact.telecom"]
        );
    }

    #[test]
    fn inherited_elements_are_excluded() {
        let sd = make_structure(
            "Patient",
            StructureDefinitionKind::Resource,
            vec![
                based("Patient", "Patient"),
                based("Patient.id", "Resource.id"),
                based("Patient.meta", "Resource.meta"),
                based("Patient.gender", "Patient.gender"),
            ],
        );

        let components = ComponentWalker::new(&sd).walk();
        assert_eq!(components.len(), 1);
        let fields: Vec<_> = components[0]
            .elements
            .iter()
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(fields, vec!["Patient.gender"]);
    }

    #[test]
    fn primitive_structure_is_single_component() {
        let sd = make_structure(
            "string",
            StructureDefinitionKind::PrimitiveType,
            vec![
                based("string", "string"),
                based("string.value", "string.value"),
            ],
        );

        let components = ComponentWalker::new(&sd).walk();
        assert_eq!(components.len(), 1);
        assert!(components[0].is_root_of_structure);
        assert!(components[0].elements.is_empty());
    }

    #[test]
    fn slice_with_children_becomes_component() {
        let mut slice = based("Observation.component", "Observation.component");
        slice.slice_name = Some("systolic".to_string());

        let sd = make_structure(
            "Observation",
            StructureDefinitionKind::Resource,
            vec![
                based("Observation", "Observation"),
                based("Observation.component", "Observation.component"),
                slice,
                based("Observation.component.code", "Observation.component.code"),
            ],
        );

        let components = ComponentWalker::new(&sd).walk();
        let descriptors: Vec<_> = components
            .iter()
            .map(|c| (c.path.as_str(), c.slice_name.as_deref()))
            .collect();
        assert_eq!(
            descriptors,
            vec![
                ("Observation", None),
                ("Observation.component", Some("systolic")),
            ]
        );
        // The slice entry itself is not a field of the root component
        let root_fields: Vec<_> = components[0]
            .elements
            .iter()
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(root_fields, vec!["Observation.component"]);
    }

    #[test]
    fn choice_elements_never_open_components() {
        let mut choice = based("Observation.value[x]", "Observation.value[x]");
        choice.max = Some("1".to_string());

        let sd = make_structure(
            "Observation",
            StructureDefinitionKind::Resource,
            vec![based("Observation", "Observation"), choice],
        );

        let components = ComponentWalker::new(&sd).walk();
        assert_eq!(components.len(), 1);
    }

    #[test]
    fn walk_from_restricts_to_subtree() {
        let sd = make_structure(
            "Questionnaire",
            StructureDefinitionKind::Resource,
            vec![
                based("Questionnaire", "Questionnaire"),
                based("Questionnaire.item", "Questionnaire.item"),
                based("Questionnaire.item.text", "Questionnaire.item.text"),
                based(
                    "Questionnaire.item.enableWhen",
                    "Questionnaire.item.enableWhen",
                ),
                based(
                    "Questionnaire.item.enableWhen.question",
                    "Questionnaire.item.enableWhen.question",
                ),
                based("Questionnaire.status", "Questionnaire.status"),
            ],
        );

        let components = ComponentWalker::new(&sd).walk_from("Questionnaire.item");
        let paths: Vec<_> = components.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["Questionnaire.item", "Questionnaire.item.enableWhen"]
        );
        assert!(!components[0].is_root_of_structure);
    }

    #[test]
    fn absorb_rejects_mismatched_roots() {
        let root = based("Patient", "Patient");
        let other_root = based("Observation", "Observation");
        let mut a = Component::new(&root, true);
        let b = Component::new(&other_root, true);

        let err = a.absorb(b).unwrap_err();
        assert!(matches!(err, Error::ComponentMismatch { .. }));
    }
}
