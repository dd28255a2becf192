//! Population directives.
//!
//! Population is a tagged union: the `*` wildcard, an ordered list of
//! relation names, or a per-relation mapping whose values recursively carry
//! their own population, field selection, sort and filters.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{Error, InvalidInputError};

use super::sort::Sort;

/// Which related content to include in a response.
#[derive(Clone, Debug, PartialEq)]
pub enum Populate {
    /// Every first-level relation (`*`).
    All,
    /// The named relations, in order.
    Fields(Vec<String>),
    /// Per-relation nested directives.
    Nested(BTreeMap<String, PopulateRelation>),
}

/// The nested directive for one relation.
///
/// An empty directive means "populate this relation with defaults".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PopulateRelation {
    pub populate: Option<Populate>,
    pub fields: Option<Vec<String>>,
    pub sort: Option<Sort>,
    pub filters: Option<Value>,
    /// Keys with no dedicated slot (`on`, `count`, ...), kept verbatim.
    pub extra: BTreeMap<String, Value>,
}

impl PopulateRelation {
    pub fn is_empty(&self) -> bool {
        self.populate.is_none()
            && self.fields.is_none()
            && self.sort.is_none()
            && self.filters.is_none()
            && self.extra.is_empty()
    }
}

impl Populate {
    /// Build a directive from loosely shaped JSON.
    ///
    /// # Errors
    ///
    /// Returns an error for numbers, `null`, lists containing non-strings,
    /// and malformed nested directives.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::String(s) if s.trim() == "*" => Ok(Populate::All),
            Value::String(s) => {
                let fields = split_names(&s);
                if fields.is_empty() {
                    return Err(invalid("populate string names no relations"));
                }
                Ok(Populate::Fields(fields))
            }
            Value::Bool(true) => Ok(Populate::All),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(invalid(&format!(
                        "populate list entries must be strings, got {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Populate::Fields),
            Value::Object(map) => map
                .into_iter()
                .map(|(name, nested)| Ok((name, PopulateRelation::from_value(nested)?)))
                .collect::<Result<BTreeMap<_, _>, Error>>()
                .map(Populate::Nested),
            other => Err(invalid(&format!("unsupported populate value {}", other))),
        }
    }
}

impl PopulateRelation {
    /// Build a nested directive from JSON.
    ///
    /// `true` means defaults and `"*"` means "populate everything below".
    pub fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Bool(true) => Ok(Self::default()),
            Value::String(s) if s.trim() == "*" => Ok(Self {
                populate: Some(Populate::All),
                ..Self::default()
            }),
            Value::Object(map) => Self::from_map(map),
            other => Err(invalid(&format!(
                "nested populate must be true, \"*\" or an object, got {}",
                other
            ))),
        }
    }

    fn from_map(map: Map<String, Value>) -> Result<Self, Error> {
        let mut relation = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "populate" => relation.populate = Some(Populate::from_value(value)?),
                "fields" => {
                    relation.fields = Some(match value {
                        Value::String(s) => split_names(&s),
                        other => serde_json::from_value(other)
                            .map_err(|e| invalid(&format!("nested fields: {}", e)))?,
                    })
                }
                "sort" => {
                    relation.sort = Some(
                        serde_json::from_value(value)
                            .map_err(|e| invalid(&format!("nested sort: {}", e)))?,
                    )
                }
                "filters" => {
                    if !value.is_object() {
                        return Err(invalid("nested filters must be an object"));
                    }
                    relation.filters = Some(value);
                }
                _ => {
                    relation.extra.insert(key, value);
                }
            }
        }
        Ok(relation)
    }
}

impl<'de> Deserialize<'de> for Populate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Populate::from_value(value).map_err(serde::de::Error::custom)
    }
}

fn split_names(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn invalid(reason: &str) -> Error {
    InvalidInputError::Query {
        reason: reason.to_string(),
    }
    .into()
}
