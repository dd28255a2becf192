//! Backend route definitions and request/response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use strapi_core::{ContentTypeUid, DocumentId};

// ============================================================================
// Routes
// ============================================================================

/// Admin session login.
pub const ADMIN_LOGIN: &str = "/admin/login";

/// Content-type registry (administrative).
pub const CONTENT_TYPES: &str = "/content-manager/content-types";

/// Component registry (administrative).
pub const COMPONENTS: &str = "/content-manager/components";

/// Media upload.
pub const UPLOAD: &str = "/api/upload";

/// Media library listing.
pub const UPLOAD_FILES: &str = "/api/upload/files";

/// Configured locales.
pub const LOCALES: &str = "/i18n/locales";

/// API token administration.
pub const API_TOKENS: &str = "/admin/api-tokens";

/// `/content-manager/collection-types/{uid}`
pub fn collection(uid: &ContentTypeUid) -> String {
    format!("/content-manager/collection-types/{}", uid)
}

/// `/content-manager/collection-types/{uid}/{id}`
pub fn document(uid: &ContentTypeUid, id: &DocumentId) -> String {
    format!("{}/{}", collection(uid), id)
}

/// `/content-manager/collection-types/{uid}/actions/{action}`
pub fn collection_action(uid: &ContentTypeUid, action: &str) -> String {
    format!("{}/actions/{}", collection(uid), action)
}

/// `/content-manager/collection-types/{uid}/{id}/actions/{action}`
pub fn document_action(uid: &ContentTypeUid, id: &DocumentId, action: &str) -> String {
    format!("{}/actions/{}", document(uid, id), action)
}

/// `/content-type-builder/content-types/{uid}`
pub fn content_type_schema(uid: &ContentTypeUid) -> String {
    format!("/content-type-builder/content-types/{}", uid)
}

/// `/api/{pluralName}`
pub fn public_collection(plural_name: &str) -> String {
    format!("/api/{}", plural_name)
}

/// `/api/{pluralName}/{id}`
pub fn public_document(plural_name: &str, id: &DocumentId) -> String {
    format!("/api/{}/{}", plural_name, id)
}

/// `/i18n/locales/{id}`
pub fn locale(id: u64) -> String {
    format!("{}/{}", LOCALES, id)
}

/// `/admin/api-tokens/{id}`
pub fn api_token(id: u64) -> String {
    format!("{}/{}", API_TOKENS, id)
}

/// Document actions.
pub mod actions {
    pub const PUBLISH: &str = "publish";
    pub const UNPUBLISH: &str = "unpublish";
    pub const BULK_PUBLISH: &str = "bulkPublish";
    pub const BULK_UNPUBLISH: &str = "bulkUnpublish";
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for admin login.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from admin login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub data: LoginData,
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub token: String,
}

/// Request body for bulk publish and unpublish.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkActionRequest<'a> {
    pub document_ids: &'a [DocumentId],
}

/// Request body for creating a locale.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocaleRequest<'a> {
    pub name: &'a str,
    pub code: &'a str,
    pub is_default: bool,
}

/// Request body for creating an API token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiTokenRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(rename = "type")]
    pub kind: &'a str,
    /// Lifetime in milliseconds; `None` never expires.
    pub lifespan: Option<u64>,
}

/// Response from API token creation. The access key is only ever returned
/// here.
#[derive(Debug, Deserialize)]
pub struct CreateApiTokenResponse {
    pub data: ApiTokenData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTokenData {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Backend error envelope.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_routes() {
        let uid = ContentTypeUid::new("api::project.project").unwrap();
        let id = DocumentId::new("abc123").unwrap();
        assert_eq!(
            document_action(&uid, &id, actions::PUBLISH),
            "/content-manager/collection-types/api::project.project/abc123/actions/publish"
        );
        assert_eq!(
            collection_action(&uid, actions::BULK_PUBLISH),
            "/content-manager/collection-types/api::project.project/actions/bulkPublish"
        );
    }

    #[test]
    fn bulk_request_uses_camel_case() {
        let ids = vec![DocumentId::new("a").unwrap(), DocumentId::new("b").unwrap()];
        let body = serde_json::to_value(BulkActionRequest { document_ids: &ids }).unwrap();
        assert_eq!(body, serde_json::json!({ "documentIds": ["a", "b"] }));
    }
}
