//! Tool argument shapes and their conversion into domain types.
//!
//! Conversion failures here are the caller's fault and surface as
//! `invalid_params`, before any request is made.

use rmcp::ErrorData as McpError;
use rmcp::schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use strapi_core::{ContentTypeUid, DocumentId, EntryData, Locale, LocaleScope, QuerySpec};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListEntriesParams {
    /// Content type UID, e.g. `api::article.article`
    pub content_type: String,
    /// Query object: filters, pagination {page, pageSize}, sort, populate,
    /// fields, locale ("all" or a code), status ("draft", "published", "all")
    #[serde(default)]
    pub query: Option<Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetEntryParams {
    pub content_type: String,
    pub document_id: String,
    /// Same shape as for entry lists; pagination and sort are ignored
    #[serde(default)]
    pub query: Option<Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateEntryParams {
    pub content_type: String,
    /// Field values. Backend-owned fields (id, documentId, timestamps,
    /// locale, status) are removed before sending
    pub data: Value,
    /// Locale to create the entry in; the default locale if omitted
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateEntryParams {
    pub content_type: String,
    pub document_id: String,
    pub data: Value,
    /// Locale variant to update; the default locale if omitted
    #[serde(default)]
    pub locale: Option<String>,
    /// Merge the given fields over the current entry instead of replacing it
    #[serde(default)]
    pub partial: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteEntryParams {
    pub content_type: String,
    pub document_id: String,
    /// Locale variant to delete, or "all" to delete every variant
    pub locale: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BulkParams {
    pub content_type: String,
    pub document_ids: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LocalizedParams {
    pub content_type: String,
    pub document_id: String,
    pub locale: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LocalizedDataParams {
    pub content_type: String,
    /// Document ID of the existing entry being translated
    pub document_id: String,
    pub locale: String,
    pub data: Value,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RelationParams {
    pub content_type: String,
    pub document_id: String,
    /// Relation attribute name
    pub field: String,
    /// Document IDs of the related entries
    pub targets: Vec<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UploadMediaParams {
    /// Base64 file content, optionally as a data: URI (max 1 MiB decoded)
    #[serde(default)]
    pub data: Option<String>,
    /// Local file path (max 200 MiB); use instead of `data`
    #[serde(default)]
    pub path: Option<String>,
    /// Required with `data`; defaults to the path's file name
    #[serde(default)]
    pub file_name: Option<String>,
    /// Guessed from the file extension if omitted
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Metadata: name, alternativeText, caption
    #[serde(default)]
    pub file_info: Option<Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryParams {
    #[serde(default)]
    pub query: Option<Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ContentTypeParams {
    pub content_type: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateLocaleParams {
    /// Display name, e.g. "French (France)"
    pub name: String,
    /// Locale code, e.g. "fr-FR"
    pub code: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IdParams {
    /// Numeric id as listed by the backend
    pub id: u64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateApiTokenParams {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Create a read-only token instead of a full-access one
    #[serde(default)]
    pub read_only: bool,
    /// Days until expiry; never expires if omitted
    #[serde(default)]
    pub lifespan_days: Option<u32>,
}

fn invalid(e: impl std::fmt::Display) -> McpError {
    McpError::invalid_params(e.to_string(), None)
}

pub fn parse_uid(s: &str) -> Result<ContentTypeUid, McpError> {
    ContentTypeUid::new(s).map_err(invalid)
}

pub fn parse_id(s: &str) -> Result<DocumentId, McpError> {
    DocumentId::new(s).map_err(invalid)
}

pub fn parse_ids(ids: &[String]) -> Result<Vec<DocumentId>, McpError> {
    if ids.is_empty() {
        return Err(invalid("document_ids must not be empty"));
    }
    ids.iter().map(|id| parse_id(id)).collect()
}

pub fn parse_locale(s: &str) -> Result<Locale, McpError> {
    Locale::new(s).map_err(invalid)
}

pub fn parse_optional_locale(s: Option<&str>) -> Result<Option<Locale>, McpError> {
    s.map(parse_locale).transpose()
}

/// `"all"` or `"*"` selects every variant; anything else must be a locale.
pub fn parse_scope(s: &str) -> Result<LocaleScope, McpError> {
    match s {
        "all" | "*" => Ok(LocaleScope::All),
        code => parse_locale(code).map(LocaleScope::Only),
    }
}

/// Absent or null means an empty query. Strings are rejected: the query
/// must be structured JSON.
pub fn parse_query(query: Option<Value>) -> Result<QuerySpec, McpError> {
    let spec: QuerySpec = match query {
        None | Some(Value::Null) => return Ok(QuerySpec::default()),
        Some(Value::Object(map)) => {
            serde_json::from_value(Value::Object(map)).map_err(|e| invalid(format!("query: {e}")))?
        }
        Some(Value::String(_)) => {
            return Err(invalid("query must be a JSON object, not a serialized string"));
        }
        Some(other) => return Err(invalid(format!("query must be a JSON object, got {other}"))),
    };
    spec.validate().map_err(invalid)?;
    Ok(spec)
}

pub fn parse_data(data: Value) -> Result<EntryData, McpError> {
    EntryData::new(data).map_err(invalid)
}
