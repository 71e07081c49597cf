//! FHIR ElementDefinition model
//!
//! Version-agnostic model for the element tree inside StructureDefinition
//! snapshots and differentials. Only the fields the generation engine reads
//! are typed; everything else lands in the flattened `extensions` map.

use super::complex::BindingStrength;
use super::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR ElementDefinition - one node in a structure's element tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    /// Unique id for inter-element referencing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Path of the element in the hierarchy (e.g., "Patient.name")
    pub path: String,

    /// Name for this particular element (in a slice)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice_name: Option<String>,

    /// Short label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    /// Full formal definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    /// Minimum cardinality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    /// Maximum cardinality (an integer or "*")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    /// Base definition information (where the element was first defined)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<ElementDefinitionBase>,

    /// Reference to the definition of content, if borrowed from another element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<String>,

    /// Data type(s) for this element
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<ElementDefinitionType>>,

    /// If this modifies the meaning of other elements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_modifier: Option<bool>,

    /// Include when in summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_summary: Option<bool>,

    /// If this element must be supported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_support: Option<bool>,

    /// ValueSet binding if this element is coded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<ElementDefinitionBinding>,

    /// This element is sliced - slices follow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slicing: Option<ElementDefinitionSlicing>,

    /// Additional content beyond core fields. FHIR's choice-typed value
    /// properties (fixed[x], pattern[x], defaultValue[x]) land here under
    /// their expanded names, e.g. "patternCoding" or "fixedUri".
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Base definition information for an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDefinitionBase {
    /// Path that identifies the base element
    pub path: String,

    /// Min cardinality of the base element
    pub min: u32,

    /// Max cardinality of the base element
    pub max: String,
}

/// Data type for an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionType {
    /// Data type code
    pub code: String,

    /// Profile (StructureDefinition canonical URLs) that apply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Vec<String>>,

    /// Profile for Reference/canonical target types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_profile: Option<Vec<String>>,
}

impl ElementDefinitionType {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            profile: None,
            target_profile: None,
        }
    }
}

/// ValueSet binding for a coded element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionBinding {
    /// Binding strength (required | extensible | preferred | example)
    pub strength: BindingStrength,

    /// Human explanation of the value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Source of value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,
}

/// Slicing information for an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDefinitionSlicing {
    /// Element values that are used to distinguish slices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Vec<ElementDefinitionDiscriminator>>,

    /// Text description of how slicing works
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// If elements must be in same order as slices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordered: Option<bool>,

    /// Slicing rules (closed | open | openAtEnd)
    pub rules: SlicingRules,
}

/// Discriminator for slicing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDefinitionDiscriminator {
    /// Type of discriminator (value | exists | pattern | type | profile)
    #[serde(rename = "type")]
    pub discriminator_type: DiscriminatorType,

    /// Path to the discriminating element value
    pub path: String,
}

/// Type of slicing discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscriminatorType {
    Value,
    Exists,
    Pattern,
    Type,
    Profile,
}

/// Slicing rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlicingRules {
    Closed,
    Open,
    OpenAtEnd,
}

/// Snapshot - the full element tree of a structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Snapshot {
    pub element: Vec<ElementDefinition>,
}

/// Differential - the elements that differ from the base
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Differential {
    pub element: Vec<ElementDefinition>,
}

impl ElementDefinition {
    /// Create a minimal element with just a path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Get the key for this element (path:sliceName for slices, just path otherwise)
    pub fn key(&self) -> String {
        match &self.slice_name {
            Some(slice_name) => format!("{}:{}", self.path, slice_name),
            None => self.path.clone(),
        }
    }

    /// Check if this element has a slice name
    pub fn is_slice(&self) -> bool {
        self.slice_name.is_some()
    }

    /// Get the last segment of the path (the element's own name)
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Get the parent path (everything before the last '.')
    pub fn parent_path(&self) -> Option<String> {
        self.path.rfind('.').map(|pos| self.path[..pos].to_string())
    }

    /// Check if this element is a descendant of the given path
    pub fn is_descendant_of(&self, parent_path: &str) -> bool {
        self.path.starts_with(parent_path)
            && self.path.len() > parent_path.len()
            && self.path.as_bytes().get(parent_path.len()) == Some(&b'.')
    }

    /// Check if this is a choice type element (ends with [x])
    pub fn is_choice_type(&self) -> bool {
        self.path.ends_with("[x]")
    }

    /// Get type codes for this element
    pub fn type_codes(&self) -> Vec<String> {
        self.types
            .as_ref()
            .map(|types| types.iter().map(|t| t.code.clone()).collect())
            .unwrap_or_default()
    }

    /// Check if element is required (min > 0)
    pub fn is_required(&self) -> bool {
        self.min.unwrap_or(0) > 0
    }

    /// Check if element is array/list (max = "*" or max > 1)
    pub fn is_array(&self) -> bool {
        self.max
            .as_ref()
            .map(|m| m == "*" || m.parse::<u32>().map(|n| n > 1).unwrap_or(false))
            .unwrap_or(false)
    }

    /// Get the cardinality as a string (e.g., "0..1", "1..*")
    pub fn cardinality_string(&self) -> String {
        let min = self.min.unwrap_or(0);
        let max = self.max.as_deref().unwrap_or("*");
        format!("{}..{}", min, max)
    }

    /// Structure name that first defined this element, from `base.path`.
    ///
    /// Returns `None` when the element carries no base information.
    pub fn base_root(&self) -> Option<&str> {
        self.base
            .as_ref()
            .map(|b| b.path.split('.').next().unwrap_or(&b.path))
    }

    /// Look up a choice-typed value property by prefix ("fixed", "pattern",
    /// "defaultValue"). Returns the type suffix and the raw value, e.g.
    /// `("Coding", {...})` for a "patternCoding" key. When several are
    /// present the lexicographically first key wins, keeping output stable.
    pub fn choice_value(&self, prefix: &str) -> Option<(&str, &Value)> {
        let mut keys: Vec<&String> = self
            .extensions
            .keys()
            .filter(|k| {
                k.starts_with(prefix)
                    && k[prefix.len()..]
                        .chars()
                        .next()
                        .is_some_and(|c| c.is_ascii_uppercase())
            })
            .collect();
        keys.sort();
        keys.first()
            .map(|k| (&k[prefix.len()..], &self.extensions[k.as_str()]))
    }

    /// Fixed value constraint, if any (fixed[x])
    pub fn fixed_value(&self) -> Option<(&str, &Value)> {
        self.choice_value("fixed")
    }

    /// Pattern value constraint, if any (pattern[x])
    pub fn pattern_value(&self) -> Option<(&str, &Value)> {
        self.choice_value("pattern")
    }

    /// A required binding on a resolvable value set, if any
    pub fn required_binding(&self) -> Option<&str> {
        self.binding
            .as_ref()
            .filter(|b| b.strength.is_required())
            .and_then(|b| b.value_set.as_deref())
    }
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(Error::from)
    }

    /// Get an element by path
    pub fn get_element(&self, path: &str) -> Option<&ElementDefinition> {
        self.element.iter().find(|e| e.path == path)
    }

    /// Get all direct children of a path, in snapshot order
    pub fn get_children(&self, parent_path: &str) -> Vec<&ElementDefinition> {
        let expected_depth = parent_path.matches('.').count() + 1;
        self.element
            .iter()
            .filter(|e| {
                e.is_descendant_of(parent_path) && e.path.matches('.').count() == expected_depth
            })
            .collect()
    }

    /// Check whether a path has any child elements
    pub fn has_children(&self, parent_path: &str) -> bool {
        self.element.iter().any(|e| e.is_descendant_of(parent_path))
    }
}
