//! Human-readable slicing descriptions
//!
//! Slices do not change the shape of generated types, but exporters that
//! emit documentation (and the info report) describe how each slice is
//! discriminated: the discriminator kind, the path it inspects, and the
//! fixed/pattern value or bound code set that selects the slice.

use crucible_defs::DefinitionCollection;
use crucible_models::{
    DiscriminatorType, ElementDefinition, StructureDefinition, ValueSet,
};
use serde_json::Value;

/// How many expansion concepts a description quotes before eliding
pub const EXPANSION_PREVIEW_LIMIT: usize = 10;

/// One discriminator's description for one slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceDescription {
    /// Name of the slice being described
    pub slice_name: String,
    /// Discriminator kind (value, pattern, exists, type, profile)
    pub discriminator: DiscriminatorType,
    /// Discriminator path, relative to the sliced element
    pub path: String,
    /// Rendered selection criterion
    pub detail: String,
}

/// Describe every slice of a sliced element.
///
/// `sliced` is the entry carrying the `slicing` block; its named slices
/// are located in the structure's snapshot by shared path. Slices without
/// a renderable criterion still get an entry, with the discriminator path
/// alone as the detail.
pub fn describe_slicing(
    collection: &DefinitionCollection,
    structure: &StructureDefinition,
    sliced: &ElementDefinition,
) -> Vec<SliceDescription> {
    let Some(slicing) = &sliced.slicing else {
        return Vec::new();
    };
    let discriminators = slicing.discriminator.as_deref().unwrap_or(&[]);

    let slices = structure
        .elements()
        .iter()
        .filter(|e| e.path == sliced.path && e.is_slice());

    let mut out = Vec::new();
    for slice in slices {
        let slice_name = slice.slice_name.clone().unwrap_or_default();
        for discriminator in discriminators {
            let target = discriminator_target(structure, slice, &discriminator.path);
            let detail = render_detail(
                collection,
                discriminator.discriminator_type,
                target,
                &discriminator.path,
            );
            out.push(SliceDescription {
                slice_name: slice_name.clone(),
                discriminator: discriminator.discriminator_type,
                path: discriminator.path.clone(),
                detail,
            });
        }
    }
    out
}

/// Locate the element a discriminator path points at, starting from the
/// slice entry. `$this` is the slice itself; `resolve()` segments reach
/// through a reference and are dropped from the lookup path.
fn discriminator_target<'a>(
    structure: &'a StructureDefinition,
    slice: &'a ElementDefinition,
    discriminator_path: &str,
) -> Option<&'a ElementDefinition> {
    if discriminator_path == "$this" {
        return Some(slice);
    }

    let relative: Vec<&str> = discriminator_path
        .split('.')
        .filter(|segment| *segment != "$this" && !segment.starts_with("resolve("))
        .collect();
    if relative.is_empty() {
        return Some(slice);
    }

    let target_path = format!("{}.{}", slice.path, relative.join("."));
    structure.element_by_path(&target_path)
}

fn render_detail(
    collection: &DefinitionCollection,
    kind: DiscriminatorType,
    target: Option<&ElementDefinition>,
    discriminator_path: &str,
) -> String {
    let Some(target) = target else {
        return discriminator_path.to_string();
    };

    match kind {
        DiscriminatorType::Exists => format!(
            "{} {}",
            discriminator_path,
            if target.is_required() { "exists" } else { "is absent" }
        ),
        DiscriminatorType::Type => {
            let codes = target.type_codes().join(" | ");
            if codes.is_empty() {
                discriminator_path.to_string()
            } else {
                format!("{discriminator_path} is {codes}")
            }
        }
        DiscriminatorType::Profile => {
            let profiles: Vec<String> = target
                .types
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .flat_map(|t| t.profile.clone().unwrap_or_default())
                .collect();
            if profiles.is_empty() {
                discriminator_path.to_string()
            } else {
                format!("{discriminator_path} conforms to {}", profiles.join(" | "))
            }
        }
        DiscriminatorType::Value | DiscriminatorType::Pattern => {
            if let Some((suffix, value)) = target.fixed_value().or_else(|| target.pattern_value()) {
                return format!("{discriminator_path} = {}", render_value(suffix, value));
            }
            if let Some(value_set_url) = target.required_binding() {
                if let Some(vs) = collection.value_set(value_set_url) {
                    return format!(
                        "{discriminator_path} from {}",
                        render_expansion_preview(vs)
                    );
                }
                return format!("{discriminator_path} from {value_set_url}");
            }
            discriminator_path.to_string()
        }
    }
}

/// Render a fixed/pattern value by its declared type; anything unfamiliar
/// falls back to compact JSON.
fn render_value(type_suffix: &str, value: &Value) -> String {
    match type_suffix {
        "CodeableConcept" => value
            .get("coding")
            .and_then(Value::as_array)
            .and_then(|codings| codings.first())
            .map(render_coding)
            .or_else(|| value.get("text").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| value.to_string()),
        "Coding" => render_coding(value),
        "Quantity" => {
            let amount = value
                .get("value")
                .map(Value::to_string)
                .unwrap_or_else(|| "?".to_string());
            match value
                .get("unit")
                .or_else(|| value.get("code"))
                .and_then(Value::as_str)
            {
                Some(unit) => format!("{amount} {unit}"),
                None => amount,
            }
        }
        "Range" => {
            let bound = |key: &str| {
                value
                    .get(key)
                    .and_then(|q| q.get("value"))
                    .map(Value::to_string)
                    .unwrap_or_else(|| "?".to_string())
            };
            format!("{}..{}", bound("low"), bound("high"))
        }
        "Period" => {
            let edge = |key: &str| {
                value
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or("?")
                    .to_string()
            };
            format!("{}..{}", edge("start"), edge("end"))
        }
        _ => match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

fn render_coding(coding: &Value) -> String {
    let system = coding.get("system").and_then(Value::as_str);
    let code = coding.get("code").and_then(Value::as_str);
    match (system, code) {
        (Some(system), Some(code)) => format!("{system}|{code}"),
        (None, Some(code)) => code.to_string(),
        _ => coding.to_string(),
    }
}

/// Quote the first few expansion codes; large expansions are elided with
/// a count of what was omitted.
fn render_expansion_preview(value_set: &ValueSet) -> String {
    let concepts = value_set.flattened_expansion();
    if concepts.is_empty() {
        return value_set.url.clone();
    }

    let preview: Vec<&str> = concepts
        .iter()
        .take(EXPANSION_PREVIEW_LIMIT)
        .map(|c| c.code.as_str())
        .collect();
    let omitted = concepts.len().saturating_sub(EXPANSION_PREVIEW_LIMIT);
    if omitted > 0 {
        format!("[{}, ... {omitted} more]", preview.join(", "))
    } else {
        format!("[{}]", preview.join(", "))
    }
}
