//! FHIR OperationDefinition model

use super::complex::PublicationStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR OperationDefinition resource
///
/// Declares an operation or named query invokable at system, type or
/// instance level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationDefinition {
    /// Resource type - always "OperationDefinition"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical identifier
    pub url: String,

    /// Business version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Name (computer friendly)
    pub name: String,

    /// Publication status
    pub status: PublicationStatus,

    /// operation | query
    pub kind: OperationKind,

    /// Invocation name, e.g. "expand" for $expand
    pub code: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Invokable at the system level
    #[serde(default)]
    pub system: bool,

    /// Invokable at the type level
    #[serde(rename = "type", default)]
    pub type_: bool,

    /// Invokable at the instance level
    #[serde(default)]
    pub instance: bool,

    /// Resource types this operation applies to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Vec<String>>,

    /// Parameters for the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Vec<OperationDefinitionParameter>>,

    /// Additional content
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "OperationDefinition".to_string()
}

/// Whether this is an operation or a named query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Operation,
    Query,
}

/// One parameter of an operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationDefinitionParameter {
    /// Parameter name
    pub name: String,

    /// in | out
    #[serde(rename = "use")]
    pub use_: ParameterUse,

    /// Minimum cardinality
    pub min: u32,

    /// Maximum cardinality (an integer or "*")
    pub max: String,

    /// Parameter type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Description of meaning and use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,

    /// Nested parts for multi-part parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<Vec<OperationDefinitionParameter>>,
}

/// Direction of an operation parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterUse {
    In,
    Out,
}

impl OperationDefinition {
    /// Get the version with the URL (canonical|version format)
    pub fn versioned_url(&self) -> String {
        match &self.version {
            Some(v) => format!("{}|{}", self.url, v),
            None => self.url.clone(),
        }
    }

    /// Input parameters, in declaration order
    pub fn in_parameters(&self) -> Vec<&OperationDefinitionParameter> {
        self.parameter
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter(|p| p.use_ == ParameterUse::In)
            .collect()
    }

    /// Output parameters, in declaration order
    pub fn out_parameters(&self) -> Vec<&OperationDefinitionParameter> {
        self.parameter
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter(|p| p.use_ == ParameterUse::Out)
            .collect()
    }
}
