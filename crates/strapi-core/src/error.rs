//! Error types for strapi-mcp.
//!
//! A single [`Error`] enum with explicit variants for transport,
//! authentication, backend, validation, and local input failures. Every
//! variant is `Clone` so a shared login attempt can hand the same outcome to
//! all of its waiters.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// The unified error type for adapter operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Network transport errors (connection refused, timeout, decoding).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (missing credentials, expired session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The backend rejected the payload.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The addressed document, locale variant, or resource does not exist.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The caller lacks the privilege for this operation.
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// The backend answered with a rate-limit response.
    #[error("rate limited by backend: {message}")]
    RateLimited { message: String },

    /// Any other error response from the backend.
    #[error("backend error: {0}")]
    Api(#[from] ApiError),

    /// Input validation errors (malformed identifiers, query shapes).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Media payload rejected before any network call.
    #[error("media rejected: {0}")]
    Media(#[from] MediaError),
}

impl Error {
    /// Returns true when the backend could not be reached at all.
    pub fn is_connection_refused(&self) -> bool {
        matches!(self, Error::Transport(TransportError::Connection { .. }))
    }

    /// Returns true for not-found conditions.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The backend refused or dropped the connection.
    #[error("connection refused: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The response body could not be decoded.
    #[error("could not decode response: {message}")]
    Decode { message: String },

    /// Generic HTTP client error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// No credential of any kind is configured.
    #[error("no credentials configured: set an API token or admin email and password")]
    NoCredentials,

    /// A privileged route was called without admin credentials configured.
    #[error("admin email and password are required for this operation")]
    AdminCredentialsRequired,

    /// Admin login did not produce a session.
    #[error("admin login failed")]
    LoginFailed,

    /// The admin session expired and could not be renewed.
    #[error("admin session expired and re-login did not succeed")]
    SessionExpired,

    /// The static API token was rejected.
    #[error("API token was rejected by the backend")]
    InvalidApiToken,

    /// An anonymous request hit a protected route.
    #[error("authentication required: no credential was attached to the request")]
    AuthenticationRequired,
}

/// An error response from the backend that has no more specific mapping.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Backend error name (e.g. `ApplicationError`).
    pub name: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
    /// Structured details, passed through verbatim.
    pub details: Option<Value>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, name: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            name,
            message,
            details: None,
        }
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: Option<Value>) -> Self {
        self.details = details;
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref name) = self.name {
            write!(f, " [{}]", name)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        if let Some(ref details) = self.details
            && !is_empty_details(details)
        {
            write!(f, " (details: {})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// A backend validation failure, preserved verbatim and optionally annotated
/// with the required fields that were missing from the payload.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Backend message, unchanged.
    pub message: String,
    /// Backend details, unchanged.
    pub details: Option<Value>,
    /// Required fields the payload did not supply.
    pub missing: Vec<MissingField>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            message: message.into(),
            details,
            missing: Vec::new(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.missing.is_empty() {
            write!(f, "; missing required fields: ")?;
            for (i, field) in self.missing.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", field)?;
            }
        } else if let Some(ref details) = self.details
            && !is_empty_details(details)
        {
            write!(f, " (details: {})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A required field that was absent from an outbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    /// Full dotted path, e.g. `seo.metaTitle` or `blocks.0.title`.
    pub path: String,
    /// Where the field is expected.
    pub location: FieldLocation,
    /// Attribute type from the schema, when it could be resolved.
    pub expected_type: Option<String>,
}

/// Where a missing field lives in the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLocation {
    /// A top-level attribute of the entry.
    Root,
    /// An attribute nested inside a component or dynamic zone.
    Component { parent: String },
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.path)?;
        let expected = self.expected_type.as_deref().unwrap_or("unknown type");
        match &self.location {
            FieldLocation::Root => write!(f, " ({}, root level)", expected),
            FieldLocation::Component { parent } => {
                write!(f, " ({}, inside component `{}`)", expected, parent)
            }
        }
    }
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid content-type UID.
    #[error("invalid content type '{value}': {reason}")]
    ContentType { value: String, reason: String },

    /// Invalid document identifier.
    #[error("invalid document id '{value}': {reason}")]
    DocumentId { value: String, reason: String },

    /// Invalid locale code.
    #[error("invalid locale '{value}': {reason}")]
    Locale { value: String, reason: String },

    /// Invalid backend base URL.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// Malformed query specification.
    #[error("invalid query: {reason}")]
    Query { reason: String },

    /// Entry payload is not usable.
    #[error("invalid entry data: {reason}")]
    EntryData { reason: String },

    /// Generic invalid input.
    #[error("{message}")]
    Other { message: String },
}

/// Local media validation failures.
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    /// Payload exceeds the ceiling for its transport path.
    #[error(
        "{transport} payload is too large: approximately {approx_bytes} bytes ({approx_mb:.2} MB), limit is {limit_bytes} bytes",
        approx_mb = *approx_bytes as f64 / (1024.0 * 1024.0)
    )]
    TooLarge {
        transport: &'static str,
        approx_bytes: u64,
        limit_bytes: u64,
    },

    /// Payload is not valid base64.
    #[error("payload is not valid base64: {reason}")]
    Encoding { reason: String },

    /// Payload is empty.
    #[error("payload is empty")]
    Empty,

    /// The file could not be read.
    #[error("could not read '{path}': {message}")]
    Io { path: String, message: String },
}

fn is_empty_details(details: &Value) -> bool {
    match details {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_error_display_includes_status_name_and_message() {
        let err = ApiError::new(
            409,
            Some("ApplicationError".to_string()),
            Some("already published".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "HTTP 409 [ApplicationError]: already published"
        );
    }

    #[test]
    fn validation_error_lists_missing_fields_with_location() {
        let mut err = ValidationError::new("2 errors occurred", Some(json!({"errors": []})));
        err.missing = vec![
            MissingField {
                path: "name".to_string(),
                location: FieldLocation::Root,
                expected_type: Some("string".to_string()),
            },
            MissingField {
                path: "seo.metaTitle".to_string(),
                location: FieldLocation::Component {
                    parent: "seo".to_string(),
                },
                expected_type: None,
            },
        ];

        let message = err.to_string();
        assert!(message.contains("`name` (string, root level)"));
        assert!(message.contains("`seo.metaTitle` (unknown type, inside component `seo`)"));
    }

    #[test]
    fn media_error_reports_computed_size() {
        let err = MediaError::TooLarge {
            transport: "inline base64",
            approx_bytes: 2 * 1024 * 1024,
            limit_bytes: 1024 * 1024,
        };
        let message = err.to_string();
        assert!(message.contains("2097152 bytes"));
        assert!(message.contains("2.00 MB"));
    }

    #[test]
    fn connection_refused_is_distinct_from_auth() {
        let err = Error::from(TransportError::Connection {
            message: "tcp connect error".to_string(),
        });
        assert!(err.is_connection_refused());
        assert!(err.to_string().contains("connection refused"));

        let auth = Error::from(AuthError::LoginFailed);
        assert!(!auth.is_connection_refused());
    }
}
