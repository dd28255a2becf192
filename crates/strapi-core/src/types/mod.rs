//! Core identifier types.
//!
//! These types enforce backend invariants at construction time, so every
//! value that reaches a URL path or query string has already been checked.

mod base_url;
mod content_type;
mod document_id;
mod locale;

pub use base_url::BaseUrl;
pub use content_type::ContentTypeUid;
pub use document_id::DocumentId;
pub use locale::Locale;
