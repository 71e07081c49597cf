//! Primitive-type substitution
//!
//! Every exporter supplies its own table from FHIR primitive-type names to
//! target-language native types; the resolver consults whichever table it
//! is handed. The set of FHIR primitive names itself is fixed.

use std::collections::BTreeMap;

/// Check if a type code names a FHIR primitive
pub fn is_fhir_primitive(type_name: &str) -> bool {
    matches!(
        type_name,
        "boolean"
            | "integer"
            | "unsignedInt"
            | "positiveInt"
            | "integer64"
            | "decimal"
            | "string"
            | "code"
            | "id"
            | "markdown"
            | "uri"
            | "url"
            | "canonical"
            | "oid"
            | "uuid"
            | "date"
            | "dateTime"
            | "instant"
            | "time"
            | "base64Binary"
            | "xhtml"
    )
}

/// A fixed table from FHIR primitive-type name to a target-language native
/// type name. Lookups for non-primitive codes fall through to the code
/// itself, so complex type references pass unchanged.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveTypeMap {
    entries: BTreeMap<&'static str, &'static str>,
}

impl PrimitiveTypeMap {
    pub fn new(entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            entries: entries.iter().copied().collect(),
        }
    }

    /// Native type for a FHIR type code; the code itself when no mapping
    /// exists (complex types, resource names).
    pub fn native<'a>(&'a self, fhir_type: &'a str) -> &'a str {
        self.entries.get(fhir_type).copied().unwrap_or(fhir_type)
    }

    /// Whether the code has an explicit primitive mapping
    pub fn maps(&self, fhir_type: &str) -> bool {
        self.entries.contains_key(fhir_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_detection() {
        assert!(is_fhir_primitive("boolean"));
        assert!(is_fhir_primitive("integer64"));
        assert!(is_fhir_primitive("xhtml"));
        assert!(!is_fhir_primitive("CodeableConcept"));
        assert!(!is_fhir_primitive("BackboneElement"));
    }

    #[test]
    fn native_falls_through_for_complex_types() {
        let map = PrimitiveTypeMap::new(&[("boolean", "boolean"), ("integer", "number")]);
        assert_eq!(map.native("boolean"), "boolean");
        assert_eq!(map.native("integer"), "number");
        assert_eq!(map.native("Quantity"), "Quantity");
        assert!(map.maps("boolean"));
        assert!(!map.maps("Quantity"));
    }
}
