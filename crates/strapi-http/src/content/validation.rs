//! Validation failure enrichment.
//!
//! The backend reports missing required fields as a flat list of paths and
//! messages. This module picks those out and resolves where each field
//! lives and what type the schema expects, walking into components and
//! dynamic zones.

use serde_json::{Map, Value};

use strapi_core::error::{FieldLocation, MissingField, ValidationError};

use super::schema::{Registry, attributes_of};

/// Annotate `error` with the required fields absent from `payload`.
///
/// Schemas are optional: without them, paths and locations are still
/// reported but expected types are left unknown.
pub(crate) fn annotate(
    mut error: ValidationError,
    payload: &Value,
    content_type: Option<&Value>,
    components: Option<&Registry>,
) -> ValidationError {
    let attributes = content_type.and_then(attributes_of);

    error.missing = missing_paths(error.details.as_ref())
        .into_iter()
        .map(|segments| {
            let expected_type =
                attributes.and_then(|attrs| resolve_type(&segments, attrs, payload, components));
            let location = match segments.split_last() {
                Some((_, parents)) if !parents.is_empty() => FieldLocation::Component {
                    parent: parents.join("."),
                },
                _ => FieldLocation::Root,
            };
            MissingField {
                path: segments.join("."),
                location,
                expected_type,
            }
        })
        .collect();

    error
}

/// Paths of "required"/"must be defined" errors in validation details.
pub(crate) fn missing_paths(details: Option<&Value>) -> Vec<Vec<String>> {
    let Some(errors) = details
        .and_then(|d| d.get("errors"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let mut paths: Vec<Vec<String>> = Vec::new();
    for entry in errors {
        let message = entry
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !(message.contains("must be defined") || message.contains("required")) {
            continue;
        }
        let Some(path) = entry.get("path").map(path_segments) else {
            continue;
        };
        if !path.is_empty() && !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

fn path_segments(path: &Value) -> Vec<String> {
    match path {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(s) => s
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn resolve_type(
    path: &[String],
    attributes: &Map<String, Value>,
    payload: &Value,
    components: Option<&Registry>,
) -> Option<String> {
    let (head, rest) = path.split_first()?;
    let attribute = attributes.get(head)?;
    let kind = attribute.get("type")?.as_str()?;

    if rest.is_empty() {
        return Some(describe(kind, attribute));
    }

    let nested = payload.get(head).unwrap_or(&Value::Null);
    match kind {
        "component" => {
            let uid = attribute.get("component")?.as_str()?;
            let component_attributes = attributes_of(components?.get(uid)?)?;
            let repeatable = attribute
                .get("repeatable")
                .and_then(Value::as_bool)
                .unwrap_or(false);

            match rest.split_first() {
                Some((index, remaining)) if repeatable => {
                    let item = index
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| nested.get(i))
                        .unwrap_or(&Value::Null);
                    resolve_type(remaining, component_attributes, item, components)
                }
                _ => resolve_type(rest, component_attributes, nested, components),
            }
        }
        "dynamiczone" => {
            let (index, remaining) = rest.split_first()?;
            let item = nested.get(index.parse::<usize>().ok()?)?;
            let uid = item.get("__component")?.as_str()?;
            let component_attributes = attributes_of(components?.get(uid)?)?;
            resolve_type(remaining, component_attributes, item, components)
        }
        _ => None,
    }
}

fn describe(kind: &str, attribute: &Value) -> String {
    match kind {
        "component" => {
            let uid = attribute
                .get("component")
                .and_then(Value::as_str)
                .unwrap_or("?");
            let repeatable = attribute
                .get("repeatable")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if repeatable {
                format!("repeatable component {}", uid)
            } else {
                format!("component {}", uid)
            }
        }
        "relation" => match attribute.get("target").and_then(Value::as_str) {
            Some(target) => format!("relation to {}", target),
            None => "relation".to_string(),
        },
        "enumeration" => match attribute.get("enum").and_then(Value::as_array) {
            Some(values) => {
                let values: Vec<&str> = values.iter().filter_map(Value::as_str).collect();
                format!("enumeration [{}]", values.join(", "))
            }
            None => "enumeration".to_string(),
        },
        other => other.to_string(),
    }
}
