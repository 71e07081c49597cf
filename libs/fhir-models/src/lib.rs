//! FHIR conformance-resource models
//!
//! This crate provides strongly-typed Rust structures for the FHIR artifacts
//! that drive code generation: StructureDefinitions, ValueSets,
//! SearchParameters and OperationDefinitions.
//!
//! # Design Philosophy
//!
//! - **Version-agnostic**: only fields shared across FHIR R4, R4B and R5
//! - **Extensible**: a flattened `extensions` map captures version-specific
//!   or custom properties without loss
//! - **Flexible**: round-trips to/from JSON via serde
//!
//! # Example
//!
//! ```rust
//! use crucible_models::{StructureDefinition, StructureDefinitionKind};
//! use serde_json::json;
//!
//! let sd_json = json!({
//!     "resourceType": "StructureDefinition",
//!     "url": "http://hl7.org/fhir/StructureDefinition/Patient",
//!     "name": "Patient",
//!     "status": "active",
//!     "kind": "resource",
//!     "abstract": false,
//!     "type": "Patient"
//! });
//!
//! let sd: StructureDefinition = serde_json::from_value(sd_json).unwrap();
//! assert_eq!(sd.name, "Patient");
//! assert_eq!(sd.kind, StructureDefinitionKind::Resource);
//! ```

pub mod complex;
pub mod element_definition;
pub mod error;
pub mod operation_definition;
pub mod search_parameter;
pub mod structure_definition;
pub mod value_set;

pub use complex::*;
pub use element_definition::*;
pub use error::{Error, Result};
pub use operation_definition::*;
pub use search_parameter::*;
pub use structure_definition::*;
pub use value_set::*;
