//! Non-fatal findings collected during a generation run
//!
//! Malformed input never aborts a run: the resolver substitutes a sentinel
//! type and records what it saw here, so callers can report all affected
//! paths together at the end.

use std::fmt;

/// One non-fatal finding, keyed by the element path it concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Element had neither a type, children, nor a usable base
    UnresolvedType { path: String },
    /// contentReference pointed at nothing the collection knows
    UnknownContentReference { path: String, reference: String },
    /// Two choice variants collapsed to the same combined name; the first
    /// declaration was kept
    DuplicateChoiceVariant { path: String, variant: String },
    /// A required binding named a value set with no resolvable expansion
    MissingExpansion { path: String, value_set: String },
}

impl Diagnostic {
    /// The element path this finding concerns
    pub fn path(&self) -> &str {
        match self {
            Diagnostic::UnresolvedType { path }
            | Diagnostic::UnknownContentReference { path, .. }
            | Diagnostic::DuplicateChoiceVariant { path, .. }
            | Diagnostic::MissingExpansion { path, .. } => path,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvedType { path } => {
                write!(f, "{path}: no type, children or base; using sentinel type")
            }
            Diagnostic::UnknownContentReference { path, reference } => {
                write!(f, "{path}: unresolvable content reference '{reference}'")
            }
            Diagnostic::DuplicateChoiceVariant { path, variant } => {
                write!(f, "{path}: duplicate choice variant name '{variant}'")
            }
            Diagnostic::MissingExpansion { path, value_set } => {
                write!(f, "{path}: required binding to '{value_set}' has no expansion")
            }
        }
    }
}

/// Accumulator for diagnostics over one run
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(%diagnostic, "generation diagnostic");
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Merge another set of findings into this one
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }
}
