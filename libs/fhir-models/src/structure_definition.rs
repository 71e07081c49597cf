//! FHIR StructureDefinition model
//!
//! Version-agnostic model for StructureDefinitions that works across R4, R4B and R5.

use super::complex::PublicationStatus;
use super::element_definition::{Differential, ElementDefinition, Snapshot};
use super::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR StructureDefinition resource
///
/// Defines the structure, constraints, and terminology bindings for FHIR
/// resources and data types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinition {
    /// Resource type - always "StructureDefinition"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical identifier for this structure definition (unique globally)
    pub url: String,

    /// Business version of the structure definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Name for this structure definition (computer friendly)
    #[serde(default)]
    pub name: String,

    /// Name for this structure definition (human friendly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Publication status (draft | active | retired | unknown)
    pub status: PublicationStatus,

    /// For testing purposes, not real usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<bool>,

    /// Natural language description of the structure definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// FHIR version this StructureDefinition targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhir_version: Option<String>,

    /// Kind of structure (primitive-type | complex-type | resource | logical)
    pub kind: StructureDefinitionKind,

    /// Whether this is an abstract type
    #[serde(rename = "abstract")]
    pub is_abstract: bool,

    /// Type defined or constrained by this structure
    #[serde(rename = "type")]
    pub type_: String,

    /// Definition that this type is constrained/specialized from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_definition: Option<String>,

    /// Derivation type (specialization | constraint)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<TypeDerivationRule>,

    /// Snapshot view of the structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,

    /// Differential view of the structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub differential: Option<Differential>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "StructureDefinition".to_string()
}

/// Kind of structure this definition describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureDefinitionKind {
    /// A primitive data type
    PrimitiveType,
    /// A complex data type
    ComplexType,
    /// A resource
    Resource,
    /// A logical model (not directly implementable)
    Logical,
}

/// How the type relates to its baseDefinition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeDerivationRule {
    /// This definition defines a new type based on the baseDefinition
    Specialization,
    /// This definition constrains the baseDefinition
    Constraint,
}

impl StructureDefinition {
    /// Create a new StructureDefinition with minimal required fields
    pub fn new(
        url: impl Into<String>,
        name: impl Into<String>,
        kind: StructureDefinitionKind,
        type_: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: "StructureDefinition".to_string(),
            id: None,
            url: url.into(),
            version: None,
            name: name.into(),
            title: None,
            status: PublicationStatus::Draft,
            experimental: None,
            description: None,
            fhir_version: None,
            kind,
            is_abstract: false,
            type_: type_.into(),
            base_definition: None,
            derivation: None,
            snapshot: None,
            differential: None,
            extensions: HashMap::new(),
        }
    }

    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(Error::from)
    }

    /// Get the root element from the snapshot
    pub fn root_element(&self) -> Option<&ElementDefinition> {
        self.snapshot.as_ref().and_then(|s| s.element.first())
    }

    /// Get an element by path from the snapshot
    pub fn element_by_path(&self, path: &str) -> Option<&ElementDefinition> {
        self.snapshot.as_ref().and_then(|s| s.get_element(path))
    }

    /// Get all snapshot elements
    pub fn elements(&self) -> &[ElementDefinition] {
        self.snapshot
            .as_ref()
            .map(|s| s.element.as_slice())
            .unwrap_or(&[])
    }

    /// Check if this is a resource definition
    pub fn is_resource(&self) -> bool {
        self.kind == StructureDefinitionKind::Resource
    }

    /// Check if this is a primitive type definition
    pub fn is_primitive(&self) -> bool {
        self.kind == StructureDefinitionKind::PrimitiveType
    }

    /// Check if this is a profile (constraint on another definition)
    pub fn is_profile(&self) -> bool {
        self.derivation == Some(TypeDerivationRule::Constraint)
    }

    /// Get the version with the URL (canonical|version format)
    pub fn versioned_url(&self) -> String {
        match &self.version {
            Some(v) => format!("{}|{}", self.url, v),
            None => self.url.clone(),
        }
    }

    /// Get base type name (strips the canonical URL)
    pub fn base_type_name(&self) -> Option<&str> {
        self.base_definition
            .as_deref()
            .and_then(|url| url.rsplit('/').next())
    }
}
