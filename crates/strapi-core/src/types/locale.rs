//! Locale code type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated locale code such as `en`, `fr-FR` or `zh-Hans`.
///
/// The `*` wildcard is not a locale; requests covering every locale variant
/// use [`LocaleSelector::All`](crate::query::LocaleSelector::All) or
/// [`LocaleScope::All`](crate::entry::LocaleScope::All).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Create a new locale from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error unless the code is a primary language subtag of 2-3
    /// letters followed by optional alphanumeric subtags.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the locale code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let invalid = |reason: String| -> Error {
            InvalidInputError::Locale {
                value: s.to_string(),
                reason,
            }
            .into()
        };

        if s == "*" || s.eq_ignore_ascii_case("all") {
            return Err(invalid(
                "wildcards are not locale codes; select all locales explicitly".to_string(),
            ));
        }

        if s.len() > 35 {
            return Err(invalid("exceeds maximum length of 35 characters".to_string()));
        }

        let mut subtags = s.split('-');
        let primary = subtags.next().unwrap_or("");
        if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(invalid(
                "primary language subtag must be 2-3 letters".to_string(),
            ));
        }

        for subtag in subtags {
            if subtag.is_empty() || subtag.len() > 8 {
                return Err(invalid(format!("subtag '{}' must be 1-8 characters", subtag)));
            }
            if let Some(c) = subtag.chars().find(|c| !c.is_ascii_alphanumeric()) {
                return Err(invalid(format!("contains invalid character '{}'", c)));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
