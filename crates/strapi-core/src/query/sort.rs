//! Sort directives.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// A single `field[:direction]` sort term.
///
/// # Example
///
/// ```
/// use strapi_core::query::{SortDirection, SortField};
///
/// let term = SortField::new("publishedAt:DESC").unwrap();
/// assert_eq!(term.field(), "publishedAt");
/// assert_eq!(term.direction(), Some(SortDirection::Desc));
/// assert_eq!(term.to_string(), "publishedAt:desc");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct SortField {
    field: String,
    direction: Option<SortDirection>,
}

impl SortField {
    /// Parse a `field` or `field:asc|desc` term.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty field or a direction other than
    /// ascending or descending.
    pub fn new(term: impl AsRef<str>) -> Result<Self, Error> {
        let term = term.as_ref().trim();
        let invalid = |reason: String| -> Error { InvalidInputError::Query { reason }.into() };

        let (field, direction) = match term.split_once(':') {
            Some((field, direction)) => {
                let direction = match direction.trim().to_ascii_lowercase().as_str() {
                    "asc" => SortDirection::Asc,
                    "desc" => SortDirection::Desc,
                    other => {
                        return Err(invalid(format!(
                            "sort direction '{}' in '{}' must be asc or desc",
                            other, term
                        )));
                    }
                };
                (field.trim(), Some(direction))
            }
            None => (term, None),
        };

        if field.is_empty() {
            return Err(invalid(format!("sort term '{}' has no field", term)));
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> Option<SortDirection> {
        self.direction
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Some(direction) => write!(f, "{}:{}", self.field, direction.as_str()),
            None => write!(f, "{}", self.field),
        }
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SortField {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

/// One sort term or an ordered list of them.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Sort {
    Single(SortField),
    Many(Vec<SortField>),
}

impl Sort {
    /// Returns the terms in priority order.
    pub fn fields(&self) -> &[SortField] {
        match self {
            Sort::Single(field) => std::slice::from_ref(field),
            Sort::Many(fields) => fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_field_without_direction() {
        let term = SortField::new("title").unwrap();
        assert_eq!(term.field(), "title");
        assert_eq!(term.direction(), None);
        assert_eq!(term.to_string(), "title");
    }

    #[test]
    fn rejects_unknown_direction() {
        let err = SortField::new("title:sideways").unwrap_err();
        assert!(err.to_string().contains("must be asc or desc"));
    }

    #[test]
    fn rejects_empty_field() {
        assert!(SortField::new(":asc").is_err());
    }

    #[test]
    fn deserializes_single_and_list() {
        let single: Sort = serde_json::from_value(json!("createdAt:desc")).unwrap();
        assert_eq!(single.fields().len(), 1);

        let many: Sort = serde_json::from_value(json!(["title:asc", "createdAt:desc"])).unwrap();
        let rendered: Vec<String> = many.fields().iter().map(|f| f.to_string()).collect();
        assert_eq!(rendered, vec!["title:asc", "createdAt:desc"]);
    }

    #[test]
    fn rejects_invalid_term_in_list() {
        assert!(serde_json::from_value::<Sort>(json!(["title:up"])).is_err());
    }
}
