//! Indexed access to loaded FHIR definitions
//!
//! Provides the [`DefinitionCollection`]: an in-memory index of a FHIR
//! package's structures, value sets, search parameters and operations,
//! keyed by canonical URL. The collection owns every artifact (arena
//! model); anything that needs to refer back to a structure or element
//! does so through a `(url, path)` lookup rather than a live reference.
//!
//! The collection is populated once - from a directory of resource JSON
//! files or programmatically - and is treated as immutable for the
//! duration of a generation run.

pub mod collection;
pub mod error;
pub mod loader;

pub use collection::DefinitionCollection;
pub use error::{Error, Result};
pub use loader::LoadOutcome;
