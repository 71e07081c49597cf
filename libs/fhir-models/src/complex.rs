//! Shared FHIR complex types
//!
//! Enums and small structs reused across conformance resources.
//! No validation - just data representation.

use serde::{Deserialize, Serialize};

/// Publication status of a conformance resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    #[default]
    Draft,
    Active,
    Retired,
    Unknown,
}

/// Binding strength for terminology bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingStrength {
    Example,
    Preferred,
    Extensible,
    Required,
}

impl BindingStrength {
    /// Only required bindings are eligible for enumerated-type generation.
    pub fn is_required(&self) -> bool {
        matches!(self, BindingStrength::Required)
    }
}

/// Coding - a reference to a code defined by a terminology system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}
