//! strapi-core - Core types for the strapi-mcp content adapter.
//!
//! Identifier newtypes, the error taxonomy, the endpoint-agnostic query
//! specification, entry payload hygiene, media validation, and response
//! redaction. Nothing in this crate performs I/O.

pub mod credentials;
pub mod entry;
pub mod error;
pub mod media;
pub mod query;
pub mod redact;
pub mod tokens;
pub mod types;

pub use credentials::AdminCredentials;
pub use entry::{EntryData, LocaleScope, UpdateMode};
pub use error::Error;
pub use media::MediaUpload;
pub use query::{LocaleSelector, Populate, PublicationState, QuerySpec, Sort};
pub use tokens::{ApiToken, SessionToken};
pub use types::{BaseUrl, ContentTypeUid, DocumentId, Locale};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
