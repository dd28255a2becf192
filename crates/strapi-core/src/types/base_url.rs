//! Backend base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated backend base URL.
///
/// Self-hosted CMS instances commonly run on private networks, so plain
/// HTTP is accepted for any host. A path prefix (for instances mounted
/// under a sub-path) is preserved; a trailing slash is not.
///
/// # Example
///
/// ```
/// use strapi_core::BaseUrl;
///
/// let base = BaseUrl::new("http://localhost:1337/").unwrap();
/// assert_eq!(base.endpoint("/admin/login"), "http://localhost:1337/admin/login");
///
/// let mounted = BaseUrl::new("https://example.com/cms").unwrap();
/// assert_eq!(mounted.endpoint("api/articles"), "https://example.com/cms/api/articles");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Create a new base URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute http(s) URL with a
    /// host, or if it carries a query string or fragment.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::BaseUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the absolute URL for a backend path.
    pub fn endpoint(&self, path: &str) -> String {
        // The URL crate always adds a trailing slash to root paths,
        // so both sides are trimmed before joining.
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Returns the base URL as a string without a trailing slash.
    pub fn as_str(&self) -> &str {
        self.0.as_str().trim_end_matches('/')
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(invalid("must use http or https"));
        }

        if url.host_str().is_none() {
            return Err(invalid("must have a host"));
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not contain a query string or fragment"));
        }

        Ok(())
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BaseUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for BaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BaseUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let base = BaseUrl::new("https://cms.example.com").unwrap();
        assert_eq!(base.host(), Some("cms.example.com"));
    }

    #[test]
    fn plain_http_is_allowed_for_private_hosts() {
        let base = BaseUrl::new("http://strapi.internal:1337").unwrap();
        assert_eq!(
            base.endpoint("/api/articles"),
            "http://strapi.internal:1337/api/articles"
        );
    }

    #[test]
    fn normalizes_trailing_slash() {
        let base = BaseUrl::new("https://cms.example.com/").unwrap();
        assert_eq!(base.as_str(), "https://cms.example.com");
        assert_eq!(
            base.endpoint("/admin/login"),
            "https://cms.example.com/admin/login"
        );
    }

    #[test]
    fn keeps_path_prefix() {
        let base = BaseUrl::new("https://example.com/cms/").unwrap();
        assert_eq!(
            base.endpoint("/i18n/locales"),
            "https://example.com/cms/i18n/locales"
        );
    }

    #[test]
    fn invalid_scheme() {
        assert!(BaseUrl::new("ftp://example.com").is_err());
        assert!(BaseUrl::new("file:///tmp/cms").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(BaseUrl::new("/api/articles").is_err());
    }

    #[test]
    fn invalid_query_string() {
        assert!(BaseUrl::new("https://example.com/?token=abc").is_err());
    }
}
