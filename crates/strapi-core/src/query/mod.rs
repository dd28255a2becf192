//! Endpoint-agnostic query specification.
//!
//! A [`QuerySpec`] describes what to fetch without committing to any
//! endpoint's parameter convention; it is always translated before use.
//!
//! # Example
//!
//! ```
//! use strapi_core::query::{LocaleSelector, PublicationState, QuerySpec};
//! use serde_json::json;
//!
//! let spec: QuerySpec = serde_json::from_value(json!({
//!     "filters": { "title": { "$containsi": "rust" } },
//!     "pagination": { "page": 2, "pageSize": 10 },
//!     "sort": ["publishedAt:desc"],
//!     "populate": { "author": { "fields": ["name"] } },
//!     "locale": "all",
//!     "status": "published",
//!     "withCount": true
//! })).unwrap();
//!
//! assert_eq!(spec.locale, Some(LocaleSelector::All));
//! assert_eq!(spec.status, Some(PublicationState::Published));
//! assert!(spec.extra.contains_key("withCount"));
//! ```

mod populate;
mod sort;

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, InvalidInputError};
use crate::types::Locale;

pub use populate::{Populate, PopulateRelation};
pub use sort::{Sort, SortDirection, SortField};

/// A caller-supplied description of what content to fetch.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    /// Predicates in the backend's native filter language.
    #[serde(default)]
    pub filters: Option<Value>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub sort: Option<Sort>,
    #[serde(default)]
    pub populate: Option<Populate>,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub locale: Option<LocaleSelector>,
    #[serde(default)]
    pub status: Option<PublicationState>,
    /// Unrecognized keys, forwarded verbatim after everything else.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl QuerySpec {
    /// A query selecting one locale and nothing else.
    pub fn for_locale(locale: Option<&Locale>) -> Self {
        Self {
            locale: locale.cloned().map(LocaleSelector::Code),
            ..Self::default()
        }
    }

    /// Set the publish-state selector.
    pub fn with_status(mut self, status: PublicationState) -> Self {
        self.status = Some(status);
        self
    }

    /// Check the parts of the query that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns an error for pre-serialized (string) filters, non-object
    /// filters, and zero page numbers or sizes.
    pub fn validate(&self) -> Result<(), Error> {
        match &self.filters {
            None | Some(Value::Object(_)) => {}
            Some(Value::String(_)) => {
                return Err(invalid(
                    "filters must be structured JSON, not a pre-serialized string",
                ));
            }
            Some(other) => {
                return Err(InvalidInputError::Query {
                    reason: format!("filters must be an object, got {}", other),
                }
                .into());
            }
        }

        if let Some(pagination) = &self.pagination {
            if pagination.page == Some(0) {
                return Err(invalid("pagination page starts at 1"));
            }
            if pagination.page_size == Some(0) {
                return Err(invalid("pagination pageSize must be at least 1"));
            }
        }

        Ok(())
    }
}

/// Page-number pagination.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    /// Other pagination keys (`start`, `limit`, `withCount`), forwarded
    /// verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Which locale variants a read targets.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum LocaleSelector {
    /// Every locale variant (`"all"` or `"*"`).
    All,
    /// Exactly this locale.
    Code(Locale),
}

impl LocaleSelector {
    /// The query-string value for this selector.
    pub fn as_param(&self) -> &str {
        match self {
            LocaleSelector::All => "*",
            LocaleSelector::Code(locale) => locale.as_str(),
        }
    }
}

impl TryFrom<String> for LocaleSelector {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s == "*" || s.eq_ignore_ascii_case("all") {
            Ok(LocaleSelector::All)
        } else {
            Locale::new(s).map(LocaleSelector::Code)
        }
    }
}

/// Which lifecycle state a read targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationState {
    Draft,
    #[serde(alias = "live")]
    Published,
    All,
}

impl PublicationState {
    /// The `status` query value, or `None` to leave the backend default.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            PublicationState::Draft => Some("draft"),
            PublicationState::Published => Some("published"),
            PublicationState::All => None,
        }
    }
}

fn invalid(reason: &str) -> Error {
    InvalidInputError::Query {
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_is_default() {
        let spec: QuerySpec = serde_json::from_value(json!({})).unwrap();
        assert_eq!(spec, QuerySpec::default());
    }

    #[test]
    fn unknown_pagination_keys_are_kept() {
        let spec: QuerySpec = serde_json::from_value(json!({
            "pagination": { "start": 20, "limit": 10, "withCount": false }
        }))
        .unwrap();
        let pagination = spec.pagination.unwrap();
        assert_eq!(pagination.page, None);
        assert_eq!(pagination.extra["start"], json!(20));
        assert_eq!(pagination.extra["withCount"], json!(false));
    }

    #[test]
    fn unknown_keys_land_in_extra() {
        let spec: QuerySpec = serde_json::from_value(json!({
            "fields": ["title"],
            "hasPublishedVersion": true
        }))
        .unwrap();
        assert_eq!(spec.fields, Some(vec!["title".to_string()]));
        assert_eq!(spec.extra["hasPublishedVersion"], json!(true));
        assert!(!spec.extra.contains_key("fields"));
    }

    #[test]
    fn locale_selector_parsing() {
        let all: LocaleSelector = serde_json::from_value(json!("all")).unwrap();
        assert_eq!(all, LocaleSelector::All);
        let star: LocaleSelector = serde_json::from_value(json!("*")).unwrap();
        assert_eq!(star.as_param(), "*");
        let fr: LocaleSelector = serde_json::from_value(json!("fr")).unwrap();
        assert_eq!(fr.as_param(), "fr");
        assert!(serde_json::from_value::<LocaleSelector>(json!("not a locale")).is_err());
    }

    #[test]
    fn string_filters_are_rejected() {
        let spec: QuerySpec = serde_json::from_value(json!({
            "filters": "{\"title\":{\"$eq\":\"x\"}}"
        }))
        .unwrap();
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("pre-serialized"));
    }

    #[test]
    fn zero_page_is_rejected() {
        let spec: QuerySpec = serde_json::from_value(json!({
            "pagination": { "page": 0 }
        }))
        .unwrap();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn publication_state_values() {
        let state: PublicationState = serde_json::from_value(json!("live")).unwrap();
        assert_eq!(state, PublicationState::Published);
        assert_eq!(PublicationState::All.as_param(), None);
        assert_eq!(PublicationState::Draft.as_param(), Some("draft"));
    }
}
