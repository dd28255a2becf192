//! Entry payloads and mutation scoping.
//!
//! The backend rejects payloads that echo its own bookkeeping fields, and
//! the resulting validation error does not name the offending field. Every
//! outbound payload therefore passes through [`EntryData::into_outbound`].

use serde_json::{Map, Value};

use crate::error::{Error, InvalidInputError};
use crate::types::Locale;

/// Top-level fields owned by the backend.
pub const METADATA_FIELDS: &[&str] = &[
    "id",
    "documentId",
    "createdAt",
    "updatedAt",
    "publishedAt",
    "createdBy",
    "updatedBy",
    "locale",
    "localizations",
    "status",
];

/// A validated entry payload (always a JSON object).
///
/// # Example
///
/// ```
/// use strapi_core::EntryData;
/// use serde_json::json;
///
/// let data = EntryData::new(json!({
///     "documentId": "abc",
///     "name": "Test Project",
///     "updatedAt": "2024-01-01T00:00:00.000Z"
/// })).unwrap();
///
/// assert_eq!(data.into_outbound(), json!({ "name": "Test Project" }));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EntryData(Map<String, Value>);

impl EntryData {
    /// Wrap a JSON value, which must be an object.
    ///
    /// A `{"data": {...}}` envelope is unwrapped, since callers often copy
    /// request bodies from the REST documentation.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object.
    pub fn new(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(mut map) => {
                if map.len() == 1
                    && let Some(Value::Object(_)) = map.get("data")
                    && let Some(Value::Object(inner)) = map.remove("data")
                {
                    return Ok(Self(inner));
                }
                Ok(Self(map))
            }
            other => Err(InvalidInputError::EntryData {
                reason: format!("entry data must be a JSON object, got {}", type_name(&other)),
            }
            .into()),
        }
    }

    /// Returns the top-level fields.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns a field from the payload.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge these top-level fields over an existing entry.
    ///
    /// Only the supplied keys change; nested values are replaced whole, not
    /// deep-merged. Metadata in `current` is dropped.
    pub fn merge_onto(self, current: &Value) -> EntryData {
        let mut merged = current
            .as_object()
            .cloned()
            .map(strip_stored)
            .unwrap_or_default();
        for (key, value) in self.0 {
            merged.insert(key, value);
        }
        EntryData(merged)
    }

    /// Wrap an entry as read back from the backend, for resending.
    ///
    /// Unlike [`EntryData::new`], this also drops the relation-count stubs
    /// (`{"count": n}`) that admin reads return in place of relations.
    pub fn from_stored(value: Value) -> Result<Self, Error> {
        let EntryData(map) = Self::new(value)?;
        Ok(EntryData(strip_stored(map)))
    }

    /// Strip backend-managed fields and return the JSON body to send.
    pub fn into_outbound(self) -> Value {
        Value::Object(strip_metadata(self.0))
    }
}

/// Remove backend-managed fields from a top-level entry object.
///
/// Besides [`METADATA_FIELDS`], this drops `__`-prefixed computed keys.
pub fn strip_metadata(mut map: Map<String, Value>) -> Map<String, Value> {
    map.retain(|key, _| !METADATA_FIELDS.contains(&key.as_str()) && !key.starts_with("__"));
    map
}

/// Metadata stripping for entries read from the backend, which also carry
/// relation-count stubs. Caller data of the same shape is left alone.
fn strip_stored(map: Map<String, Value>) -> Map<String, Value> {
    let mut map = strip_metadata(map);
    map.retain(|_, value| !is_count_stub(value));
    map
}

fn is_count_stub(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.len() == 1 && map.get("count").is_some_and(Value::is_number),
        _ => false,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The locale variants a mutating operation affects.
///
/// Scope is always explicit: an operation never infers "all locales" from
/// a missing value on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocaleScope {
    /// Every locale variant of the document.
    All,
    /// One locale variant.
    Only(Locale),
}

impl LocaleScope {
    /// Map an optional locale to a scope, where absence means every variant.
    pub fn from_optional(locale: Option<Locale>) -> Self {
        match locale {
            Some(locale) => LocaleScope::Only(locale),
            None => LocaleScope::All,
        }
    }

    /// The `locale` query value for this scope.
    pub fn as_param(&self) -> &str {
        match self {
            LocaleScope::All => "*",
            LocaleScope::Only(locale) => locale.as_str(),
        }
    }
}

/// How an update treats fields the caller did not supply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateMode {
    /// Send the payload as given.
    #[default]
    Replace,
    /// Merge the payload's top-level fields over the current entry.
    Partial,
}

/// Extract the `documentId` of an entry object.
pub fn document_id_of(entry: &Value) -> Option<&str> {
    entry.get("documentId").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_objects() {
        assert!(EntryData::new(json!("name")).is_err());
        assert!(EntryData::new(json!([1, 2])).is_err());
    }

    #[test]
    fn unwraps_data_envelope() {
        let data = EntryData::new(json!({ "data": { "name": "x" } })).unwrap();
        assert_eq!(data.get("name"), Some(&json!("x")));
    }

    #[test]
    fn strips_all_metadata_fields() {
        let data = EntryData::new(json!({
            "id": 4,
            "documentId": "abc",
            "createdAt": "t",
            "updatedAt": "t",
            "publishedAt": null,
            "createdBy": { "id": 1 },
            "updatedBy": { "id": 1 },
            "locale": "en",
            "localizations": [],
            "status": "draft",
            "__temp_key__": "x",
            "name": "kept"
        }))
        .unwrap();

        assert_eq!(data.into_outbound(), json!({ "name": "kept" }));
    }

    #[test]
    fn caller_count_objects_are_kept() {
        let data = EntryData::new(json!({
            "name": "kept",
            "stats": { "count": 3 }
        }))
        .unwrap();

        assert_eq!(
            data.into_outbound(),
            json!({ "name": "kept", "stats": { "count": 3 } })
        );
    }

    #[test]
    fn stored_entries_lose_relation_counts() {
        let stored = json!({
            "documentId": "abc",
            "name": "kept",
            "tags": { "count": 3 }
        });

        let data = EntryData::from_stored(stored.clone()).unwrap();
        assert_eq!(data.into_outbound(), json!({ "name": "kept" }));

        let patch = EntryData::new(json!({ "stats": { "count": 1 } })).unwrap();
        assert_eq!(
            patch.merge_onto(&stored).into_outbound(),
            json!({ "name": "kept", "stats": { "count": 1 } })
        );
    }

    #[test]
    fn partial_merge_keeps_unsupplied_fields() {
        let current = json!({
            "documentId": "abc",
            "name": "Old",
            "description": "kept",
            "updatedAt": "t"
        });
        let patch = EntryData::new(json!({ "name": "New" })).unwrap();

        let merged = patch.merge_onto(&current).into_outbound();
        assert_eq!(merged, json!({ "name": "New", "description": "kept" }));
    }

    #[test]
    fn partial_merge_is_idempotent() {
        let current = json!({ "name": "Old", "description": "kept" });
        let patch = EntryData::new(json!({ "name": "New" })).unwrap();

        let once = patch.clone().merge_onto(&current).into_outbound();
        let twice = patch.merge_onto(&once).into_outbound();
        assert_eq!(once, twice);
    }

    #[test]
    fn locale_scope_params() {
        assert_eq!(LocaleScope::from_optional(None).as_param(), "*");
        let fr = Locale::new("fr").unwrap();
        assert_eq!(LocaleScope::from_optional(Some(fr)).as_param(), "fr");
    }
}
