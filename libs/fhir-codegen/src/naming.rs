//! Identifier naming and collision handling
//!
//! Converts FHIR dotted paths and slice names into target-language
//! identifiers, escapes reserved words, and disambiguates collisions
//! with numeric suffixes.

use crate::error::{Error, Result};
use heck::{ToKebabCase, ToLowerCamelCase, ToUpperCamelCase};
use std::collections::BTreeSet;

/// Safety ceiling for numeric-suffix disambiguation. Running past it is a
/// fatal error for the export pass, not an ordinary resolution failure.
pub const COLLISION_CEILING: u32 = 1000;

/// Target identifier conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingConvention {
    /// PascalCase
    Pascal,
    /// camelCase
    Camel,
    /// Flat upper case (PATIENTCONTACT)
    Upper,
    /// Flat lower case (patientcontact)
    Lower,
    /// lower-kebab-case
    LowerKebab,
    /// Literal FHIR dot notation, unchanged
    FhirDotNotation,
}

impl NamingConvention {
    /// Convert one word or dotted-path segment to this convention
    pub fn apply(&self, segment: &str) -> String {
        let segment = strip_choice_marker(segment);
        match self {
            NamingConvention::Pascal => segment.to_upper_camel_case(),
            NamingConvention::Camel => segment.to_lower_camel_case(),
            NamingConvention::Upper => segment.to_upper_camel_case().to_uppercase(),
            NamingConvention::Lower => segment.to_upper_camel_case().to_lowercase(),
            NamingConvention::LowerKebab => segment.to_kebab_case(),
            NamingConvention::FhirDotNotation => segment.to_string(),
        }
    }

    /// Delimiter used between joined segments when none is requested
    fn implicit_delimiter(&self) -> &'static str {
        match self {
            NamingConvention::LowerKebab => "-",
            NamingConvention::FhirDotNotation => ".",
            _ => "",
        }
    }
}

/// Remove the choice-type placeholder from a segment ("value[x]" -> "value")
pub fn strip_choice_marker(segment: &str) -> &str {
    segment.strip_suffix("[x]").unwrap_or(segment)
}

/// Convert a dotted path to an export identifier.
///
/// Non-concatenated mode uses only the last path segment. Concatenated
/// mode joins every segment, producing the globally-distinguishing
/// "rooted" name required for nested components (`Patient.contact` ->
/// `PatientContact`, distinct from `RelatedPerson.contact`).
pub fn path_to_name(
    path: &str,
    convention: NamingConvention,
    concatenated: bool,
    delimiter: Option<&str>,
) -> String {
    if convention == NamingConvention::FhirDotNotation {
        return path.to_string();
    }

    if !concatenated {
        let last = path.rsplit('.').next().unwrap_or(path);
        return convention.apply(last);
    }

    let delimiter = delimiter.unwrap_or_else(|| convention.implicit_delimiter());
    path.split('.')
        .map(|segment| convention.apply(segment))
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Escape an identifier that collides with a reserved word by prefixing a
/// convention-cased "fhir" word, rather than failing.
pub fn escape_reserved(
    name: &str,
    convention: NamingConvention,
    reserved: &phf::Set<&'static str>,
) -> String {
    if reserved.contains(name) {
        convention.apply(&format!("fhir {name}"))
    } else {
        name.to_string()
    }
}

/// Tracks names already emitted in one scope (e.g. the members of a
/// generated enum) and hands out disambiguated names on collision.
#[derive(Debug, Clone)]
pub struct NameScope {
    scope: String,
    used: BTreeSet<String>,
}

impl NameScope {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            used: BTreeSet::new(),
        }
    }

    /// Claim a name in this scope. On collision the numeric suffix starts
    /// at 2 and increments until a free name is found, up to
    /// [`COLLISION_CEILING`].
    pub fn claim(&mut self, base: &str) -> Result<String> {
        if self.used.insert(base.to_string()) {
            return Ok(base.to_string());
        }

        for n in 2..=COLLISION_CEILING {
            let candidate = format!("{base}_{n}");
            if self.used.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }

        Err(Error::CollisionExhausted {
            scope: self.scope.clone(),
            name: base.to_string(),
            ceiling: COLLISION_CEILING,
        })
    }

    /// Whether a name was already claimed
    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }
}

/// Sanitize an arbitrary string (a code or display text) into identifier
/// characters before convention casing. Non-alphanumerics become word
/// breaks; a leading digit is prefixed with an underscore.
pub fn sanitize_for_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_break = false;
    for c in raw.chars() {
        if c.is_alphanumeric() {
            out.push(c);
            last_was_break = false;
        } else if !out.is_empty() && !last_was_break {
            out.push('_');
            last_was_break = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}
