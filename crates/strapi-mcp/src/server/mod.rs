//! MCP tool server.
//!
//! One tool per content operation. Tools only convert arguments and render
//! results; authentication, query encoding and payload hygiene live in
//! `strapi-http`.

mod params;

use std::path::PathBuf;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde_json::{Value, json};
use tracing::warn;

use strapi_core::UpdateMode;
use strapi_http::{ContentClient, MediaSource, TokenKind};

use params::*;

const INSTRUCTIONS: &str = r#"Content management tools for a Strapi CMS.

Content types are addressed by UID (api::article.article) and entries by documentId.
New entries are drafts; use the *_and_publish tools or publish_entries to publish.
Locales: pass a locale code to target one variant. delete_entry requires an explicit
locale, or "all" to delete every variant.
Queries are JSON objects, never strings: {"filters": {"slug": {"$eq": "x"}},
"populate": "*", "sort": ["title:asc"], "pagination": {"page": 1, "pageSize": 25},
"locale": "fr", "status": "draft"}.
Use get_content_type_schema to discover field names before writing."#;

#[derive(Clone)]
pub struct StrapiMcp {
    client: ContentClient,
    tool_router: ToolRouter<Self>,
}

/// Render a façade result. Backend and domain errors are reported to the
/// agent as tool errors so it can correct itself.
fn respond(result: strapi_core::Result<Value>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value)
                .map_err(|e| McpError::internal_error(e.to_string(), None))?;
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
        Err(e) => {
            warn!(error = %e, "tool call failed");
            Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
        }
    }
}

fn update_mode(partial: bool) -> UpdateMode {
    if partial {
        UpdateMode::Partial
    } else {
        UpdateMode::Replace
    }
}

#[tool_router]
impl StrapiMcp {
    pub fn new(client: ContentClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    // ----------------------------------------------------------------------
    // Reads
    // ----------------------------------------------------------------------

    #[tool(description = "List entries of a content type, drafts included, through the admin API. Requires admin credentials.")]
    async fn get_entries(
        &self,
        Parameters(p): Parameters<ListEntriesParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let query = parse_query(p.query)?;
        respond(self.client.get_entries(&uid, &query).await)
    }

    #[tool(description = "Get one entry by documentId through the admin API. Requires admin credentials.")]
    async fn get_entry(
        &self,
        Parameters(p): Parameters<GetEntryParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let id = parse_id(&p.document_id)?;
        let query = parse_query(p.query)?;
        respond(self.client.get_entry(&uid, &id, &query).await)
    }

    #[tool(description = "List published entries of a content type through the public content API.")]
    async fn get_public_entries(
        &self,
        Parameters(p): Parameters<ListEntriesParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let query = parse_query(p.query)?;
        respond(self.client.get_public_entries(&uid, &query).await)
    }

    #[tool(description = "Get one published entry by documentId through the public content API.")]
    async fn get_public_entry(
        &self,
        Parameters(p): Parameters<GetEntryParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let id = parse_id(&p.document_id)?;
        let query = parse_query(p.query)?;
        respond(self.client.get_public_entry(&uid, &id, &query).await)
    }

    // ----------------------------------------------------------------------
    // Writes
    // ----------------------------------------------------------------------

    #[tool(description = "Create a draft entry.")]
    async fn create_entry(
        &self,
        Parameters(p): Parameters<CreateEntryParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let data = parse_data(p.data)?;
        let locale = parse_optional_locale(p.locale.as_deref())?;
        respond(self.client.create_entry(&uid, data, locale.as_ref()).await)
    }

    #[tool(description = "Create an entry and publish it immediately.")]
    async fn create_and_publish_entry(
        &self,
        Parameters(p): Parameters<CreateEntryParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let data = parse_data(p.data)?;
        let locale = parse_optional_locale(p.locale.as_deref())?;
        respond(
            self.client
                .create_published_entry(&uid, data, locale.as_ref())
                .await,
        )
    }

    #[tool(description = "Update the draft of an entry. Set partial=true to change only the given fields.")]
    async fn update_entry(
        &self,
        Parameters(p): Parameters<UpdateEntryParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let id = parse_id(&p.document_id)?;
        let data = parse_data(p.data)?;
        let locale = parse_optional_locale(p.locale.as_deref())?;
        respond(
            self.client
                .update_entry_draft(&uid, &id, data, locale.as_ref(), update_mode(p.partial))
                .await,
        )
    }

    #[tool(description = "Update an entry and publish the result. Set partial=true to change only the given fields.")]
    async fn update_and_publish_entry(
        &self,
        Parameters(p): Parameters<UpdateEntryParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let id = parse_id(&p.document_id)?;
        let data = parse_data(p.data)?;
        let locale = parse_optional_locale(p.locale.as_deref())?;
        respond(
            self.client
                .update_entry_and_publish(&uid, &id, data, locale.as_ref(), update_mode(p.partial))
                .await,
        )
    }

    #[tool(description = "Delete an entry. locale selects one variant; \"all\" deletes every locale variant.")]
    async fn delete_entry(
        &self,
        Parameters(p): Parameters<DeleteEntryParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let id = parse_id(&p.document_id)?;
        let scope = parse_scope(&p.locale)?;
        respond(
            self.client
                .delete_entry(&uid, &id, &scope)
                .await
                .map(|_| json!({ "deleted": id.as_str(), "locale": scope.as_param() })),
        )
    }

    // ----------------------------------------------------------------------
    // Publication
    // ----------------------------------------------------------------------

    #[tool(description = "Publish entries in bulk, all locales.")]
    async fn publish_entries(
        &self,
        Parameters(p): Parameters<BulkParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let ids = parse_ids(&p.document_ids)?;
        respond(self.client.publish_entries(&uid, &ids).await)
    }

    #[tool(description = "Unpublish entries in bulk, all locales.")]
    async fn unpublish_entries(
        &self,
        Parameters(p): Parameters<BulkParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let ids = parse_ids(&p.document_ids)?;
        respond(self.client.unpublish_entries(&uid, &ids).await)
    }

    #[tool(description = "Publish the current draft of one locale variant.")]
    async fn publish_localized_entry(
        &self,
        Parameters(p): Parameters<LocalizedParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let id = parse_id(&p.document_id)?;
        let locale = parse_locale(&p.locale)?;
        respond(self.client.publish_localized_entry(&uid, &id, &locale).await)
    }

    #[tool(description = "Unpublish one locale variant.")]
    async fn unpublish_localized_entry(
        &self,
        Parameters(p): Parameters<LocalizedParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let id = parse_id(&p.document_id)?;
        let locale = parse_locale(&p.locale)?;
        respond(self.client.unpublish_localized_entry(&uid, &id, &locale).await)
    }

    // ----------------------------------------------------------------------
    // Localization
    // ----------------------------------------------------------------------

    #[tool(description = "Add a draft translation to an existing entry. The new variant shares the entry's documentId.")]
    async fn create_localized_draft(
        &self,
        Parameters(p): Parameters<LocalizedDataParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let id = parse_id(&p.document_id)?;
        let locale = parse_locale(&p.locale)?;
        let data = parse_data(p.data)?;
        respond(
            self.client
                .create_localized_draft(&uid, &id, &locale, data)
                .await,
        )
    }

    #[tool(description = "Add a translation to an existing entry and publish it.")]
    async fn create_and_publish_localized_entry(
        &self,
        Parameters(p): Parameters<LocalizedDataParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let id = parse_id(&p.document_id)?;
        let locale = parse_locale(&p.locale)?;
        let data = parse_data(p.data)?;
        respond(
            self.client
                .create_and_publish_localized_entry(&uid, &id, &locale, data)
                .await,
        )
    }

    // ----------------------------------------------------------------------
    // Relations
    // ----------------------------------------------------------------------

    #[tool(description = "Connect related entries to a relation field, keeping existing links.")]
    async fn connect_relation(
        &self,
        Parameters(p): Parameters<RelationParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let id = parse_id(&p.document_id)?;
        let targets = parse_ids(&p.targets)?;
        let locale = parse_optional_locale(p.locale.as_deref())?;
        respond(
            self.client
                .connect_relation(&uid, &id, &p.field, &targets, locale.as_ref())
                .await,
        )
    }

    #[tool(description = "Disconnect related entries from a relation field.")]
    async fn disconnect_relation(
        &self,
        Parameters(p): Parameters<RelationParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        let id = parse_id(&p.document_id)?;
        let targets = parse_ids(&p.targets)?;
        let locale = parse_optional_locale(p.locale.as_deref())?;
        respond(
            self.client
                .disconnect_relation(&uid, &id, &p.field, &targets, locale.as_ref())
                .await,
        )
    }

    // ----------------------------------------------------------------------
    // Media
    // ----------------------------------------------------------------------

    #[tool(description = "Upload a file to the media library, from base64 data (max 1 MiB) or a local path (max 200 MiB).")]
    async fn upload_media(
        &self,
        Parameters(p): Parameters<UploadMediaParams>,
    ) -> Result<CallToolResult, McpError> {
        let source = match (p.data, p.path) {
            (Some(data), None) => {
                let file_name = p.file_name.ok_or_else(|| {
                    McpError::invalid_params("file_name is required with data", None)
                })?;
                MediaSource::Inline {
                    data,
                    file_name,
                    mime_type: p.mime_type,
                }
            }
            (None, Some(path)) => MediaSource::Path {
                path: PathBuf::from(path),
                file_name: p.file_name,
                mime_type: p.mime_type,
            },
            _ => {
                return Err(McpError::invalid_params(
                    "exactly one of data or path is required",
                    None,
                ));
            }
        };
        respond(self.client.upload_media(source, p.file_info).await)
    }

    #[tool(description = "List files in the media library.")]
    async fn list_media(
        &self,
        Parameters(p): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = parse_query(p.query)?;
        respond(self.client.list_media(&query).await)
    }

    // ----------------------------------------------------------------------
    // Schema
    // ----------------------------------------------------------------------

    #[tool(description = "List content types with their UIDs and attributes. Requires admin credentials.")]
    async fn list_content_types(&self) -> Result<CallToolResult, McpError> {
        respond(self.client.list_content_types().await)
    }

    #[tool(description = "List components. Requires admin credentials.")]
    async fn list_components(&self) -> Result<CallToolResult, McpError> {
        respond(self.client.list_components().await)
    }

    #[tool(description = "Get the schema of one content type. Requires admin credentials.")]
    async fn get_content_type_schema(
        &self,
        Parameters(p): Parameters<ContentTypeParams>,
    ) -> Result<CallToolResult, McpError> {
        let uid = parse_uid(&p.content_type)?;
        respond(self.client.get_content_type_schema(&uid).await)
    }

    // ----------------------------------------------------------------------
    // Locales
    // ----------------------------------------------------------------------

    #[tool(description = "List configured locales. Requires admin credentials.")]
    async fn list_locales(&self) -> Result<CallToolResult, McpError> {
        respond(self.client.list_locales().await)
    }

    #[tool(description = "Add a locale. Requires admin credentials.")]
    async fn create_locale(
        &self,
        Parameters(p): Parameters<CreateLocaleParams>,
    ) -> Result<CallToolResult, McpError> {
        let code = parse_locale(&p.code)?;
        respond(
            self.client
                .create_locale(&p.name, code.as_str(), p.is_default)
                .await,
        )
    }

    #[tool(description = "Remove a locale by numeric id. Requires admin credentials.")]
    async fn delete_locale(
        &self,
        Parameters(p): Parameters<IdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.client.delete_locale(p.id).await)
    }

    // ----------------------------------------------------------------------
    // API tokens
    // ----------------------------------------------------------------------

    #[tool(description = "List API tokens (metadata only). Requires admin credentials.")]
    async fn list_api_tokens(&self) -> Result<CallToolResult, McpError> {
        respond(self.client.list_api_tokens().await)
    }

    #[tool(description = "Create an API token. The access key is shown once. Requires admin credentials.")]
    async fn create_api_token(
        &self,
        Parameters(p): Parameters<CreateApiTokenParams>,
    ) -> Result<CallToolResult, McpError> {
        let kind = if p.read_only {
            TokenKind::ReadOnly
        } else {
            TokenKind::FullAccess
        };
        let result = self
            .client
            .create_api_token(&p.name, p.description.as_deref(), kind, p.lifespan_days)
            .await
            .map(|token| {
                json!({
                    "id": token.id,
                    "name": token.name,
                    "type": kind.as_str(),
                    "accessKey": token.token.as_str(),
                })
            });
        respond(result)
    }

    #[tool(description = "Revoke an API token by numeric id. Requires admin credentials.")]
    async fn delete_api_token(
        &self,
        Parameters(p): Parameters<IdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.client.delete_api_token(p.id).await)
    }
}

#[tool_handler]
impl ServerHandler for StrapiMcp {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = Implementation::from_build_env();
        info.instructions = Some(INSTRUCTIONS.to_string());
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strapi_core::BaseUrl;
    use strapi_core::error::AuthError;
    use strapi_http::ClientConfig;

    fn server() -> StrapiMcp {
        let config = ClientConfig::new(BaseUrl::new("http://localhost:1337").unwrap());
        StrapiMcp::new(ContentClient::new(config).unwrap())
    }

    #[test]
    fn every_operation_is_a_tool() {
        let names: Vec<String> = server()
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();

        for expected in [
            "get_entries",
            "get_public_entry",
            "create_entry",
            "update_and_publish_entry",
            "delete_entry",
            "publish_entries",
            "publish_localized_entry",
            "create_localized_draft",
            "connect_relation",
            "upload_media",
            "create_api_token",
            "get_content_type_schema",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing tool {expected}");
        }
    }

    #[test]
    fn domain_errors_are_tool_errors() {
        let result = respond(Err(AuthError::AdminCredentialsRequired.into())).unwrap();
        assert_eq!(result.is_error, Some(true));
    }

    #[test]
    fn success_is_pretty_json() {
        let result = respond(Ok(json!({ "data": { "title": "Hello" } }))).unwrap();
        assert_ne!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn delete_without_valid_scope_is_invalid_params() {
        let err = server()
            .delete_entry(Parameters(DeleteEntryParams {
                content_type: "api::article.article".to_string(),
                document_id: "abc123".to_string(),
                locale: "not a locale".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn upload_needs_exactly_one_source() {
        let err = server()
            .upload_media(Parameters(UploadMediaParams {
                data: None,
                path: None,
                file_name: None,
                mime_type: None,
                file_info: None,
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }
}
