//! FHIR SearchParameter model

use super::complex::PublicationStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR SearchParameter resource
///
/// Declares a search parameter usable against one or more resource types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameter {
    /// Resource type - always "SearchParameter"
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

    /// Recommended name for the parameter in search URLs
    pub code: String,

    /// Resource type(s) this parameter applies to
    #[serde(default)]
    pub base: Vec<String>,

    /// Parameter value type
    #[serde(rename = "type")]
    pub type_: SearchParamType,

    /// FHIRPath expression that extracts the values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Additional content
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "SearchParameter".to_string()
}

/// Type of a search parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchParamType {
    Number,
    Date,
    String,
    Token,
    Reference,
    Composite,
    Quantity,
    Uri,
    Special,
}

impl SearchParameter {
    /// Get the version with the URL (canonical|version format)
    pub fn versioned_url(&self) -> String {
        match &self.version {
            Some(v) => format!("{}|{}", self.url, v),
            None => self.url.clone(),
        }
    }

    /// Check if this parameter applies to the given resource type
    pub fn applies_to(&self, resource_type: &str) -> bool {
        self.base.iter().any(|b| b == resource_type || b == "Resource")
    }
}
