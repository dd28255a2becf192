//! Content-type UID type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated content-type UID such as `api::article.article`.
///
/// UIDs are `<namespace>::<name>` where the namespace is `api`, `plugin`,
/// `admin` or `strapi`, and the name is one or more dot-separated segments.
///
/// # Example
///
/// ```
/// use strapi_core::ContentTypeUid;
///
/// let uid = ContentTypeUid::new("api::article.article").unwrap();
/// assert_eq!(uid.namespace(), "api");
/// assert_eq!(uid.model_name(), "article");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentTypeUid(String);

const NAMESPACES: &[&str] = &["api", "plugin", "admin", "strapi"];

impl ContentTypeUid {
    /// Create a new UID from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid content-type UID.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the namespace (`api`, `plugin`, ...).
    pub fn namespace(&self) -> &str {
        self.0.split_once("::").map(|(ns, _)| ns).unwrap_or("")
    }

    /// Returns everything after the namespace separator.
    pub fn name(&self) -> &str {
        self.0.split_once("::").map(|(_, name)| name).unwrap_or("")
    }

    /// Returns the last dotted segment of the name (the model name).
    ///
    /// For `api::article.article`, returns `article`.
    pub fn model_name(&self) -> &str {
        self.name().rsplit('.').next().unwrap_or("")
    }

    /// Returns the full UID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::ContentType {
                value: s.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        let Some((namespace, name)) = s.split_once("::") else {
            return Err(invalid("must look like 'api::article.article'"));
        };

        if !NAMESPACES.contains(&namespace) {
            return Err(invalid("namespace must be one of api, plugin, admin, strapi"));
        }

        if name.is_empty() {
            return Err(invalid("name cannot be empty"));
        }

        for segment in name.split('.') {
            if segment.is_empty() {
                return Err(invalid("name contains an empty segment"));
            }
            if let Some(c) = segment
                .chars()
                .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
            {
                return Err(InvalidInputError::ContentType {
                    value: s.to_string(),
                    reason: format!("contains invalid character '{}'", c),
                }
                .into());
            }
        }

        Ok(())
    }
}

impl fmt::Display for ContentTypeUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentTypeUid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContentTypeUid {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContentTypeUid> for String {
    fn from(uid: ContentTypeUid) -> Self {
        uid.0
    }
}

impl AsRef<str> for ContentTypeUid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_api_uid() {
        let uid = ContentTypeUid::new("api::project.project").unwrap();
        assert_eq!(uid.namespace(), "api");
        assert_eq!(uid.name(), "project.project");
        assert_eq!(uid.model_name(), "project");
    }

    #[test]
    fn valid_plugin_uid() {
        let uid = ContentTypeUid::new("plugin::users-permissions.user").unwrap();
        assert_eq!(uid.namespace(), "plugin");
        assert_eq!(uid.model_name(), "user");
    }

    #[test]
    fn invalid_missing_separator() {
        assert!(ContentTypeUid::new("project").is_err());
    }

    #[test]
    fn invalid_unknown_namespace() {
        assert!(ContentTypeUid::new("foo::bar.bar").is_err());
    }

    #[test]
    fn invalid_path_characters() {
        assert!(ContentTypeUid::new("api::project/../x").is_err());
    }
}
