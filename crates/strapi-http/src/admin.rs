//! Administrative sub-resources: locales, API tokens, schema introspection.
//!
//! All of these require an admin session.

use serde_json::Value;
use tracing::{info, instrument};

use strapi_core::error::{InvalidInputError, TransportError};
use strapi_core::{ApiToken, ContentTypeUid, Result};

use crate::content::ContentClient;
use crate::dispatch::ApiRequest;
use crate::endpoints::{self, CreateApiTokenRequest, CreateApiTokenResponse, CreateLocaleRequest};

/// Access level of a provisioned API token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TokenKind {
    ReadOnly,
    #[default]
    FullAccess,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::ReadOnly => "read-only",
            TokenKind::FullAccess => "full-access",
        }
    }
}

/// A newly created API token. The access key is not retrievable later.
#[derive(Debug)]
pub struct ProvisionedToken {
    pub id: u64,
    pub name: String,
    pub token: ApiToken,
}

impl ContentClient {
    // ------------------------------------------------------------------
    // Locales
    // ------------------------------------------------------------------

    /// List configured locales.
    #[instrument(skip(self))]
    pub async fn list_locales(&self) -> Result<Value> {
        self.dispatcher
            .send(&ApiRequest::get(endpoints::LOCALES).privileged())
            .await
    }

    /// Add a locale.
    #[instrument(skip(self))]
    pub async fn create_locale(&self, name: &str, code: &str, is_default: bool) -> Result<Value> {
        let body = to_json(&CreateLocaleRequest {
            name,
            code,
            is_default,
        })?;
        let response = self
            .dispatcher
            .send(&ApiRequest::post(endpoints::LOCALES).json(body).privileged())
            .await?;
        info!(code, "locale created");
        Ok(response)
    }

    /// Remove a locale by its numeric id.
    #[instrument(skip(self))]
    pub async fn delete_locale(&self, id: u64) -> Result<Value> {
        self.dispatcher
            .send(&ApiRequest::delete(endpoints::locale(id)).privileged())
            .await
    }

    // ------------------------------------------------------------------
    // API tokens
    // ------------------------------------------------------------------

    /// List API tokens (metadata only; access keys are never listed).
    #[instrument(skip(self))]
    pub async fn list_api_tokens(&self) -> Result<Value> {
        self.dispatcher
            .send(&ApiRequest::get(endpoints::API_TOKENS).privileged())
            .await
    }

    /// Create an API token and return its access key.
    ///
    /// `lifespan_days` of `None` creates a token that never expires.
    #[instrument(skip(self, description))]
    pub async fn create_api_token(
        &self,
        name: &str,
        description: Option<&str>,
        kind: TokenKind,
        lifespan_days: Option<u32>,
    ) -> Result<ProvisionedToken> {
        let body = to_json(&CreateApiTokenRequest {
            name,
            description,
            kind: kind.as_str(),
            lifespan: lifespan_days.map(|days| u64::from(days) * 24 * 60 * 60 * 1000),
        })?;
        let response = self
            .dispatcher
            .send(&ApiRequest::post(endpoints::API_TOKENS).json(body).privileged())
            .await?;

        let created: CreateApiTokenResponse =
            serde_json::from_value(response).map_err(|e| TransportError::Decode {
                message: format!("unexpected API token response: {}", e),
            })?;
        let access_key = created.data.access_key.ok_or_else(|| TransportError::Decode {
            message: "API token response carried no access key".to_string(),
        })?;

        info!(id = created.data.id, kind = ?created.data.kind, "API token created");
        Ok(ProvisionedToken {
            id: created.data.id,
            name: created.data.name,
            token: ApiToken::new(access_key),
        })
    }

    /// Revoke an API token by its numeric id.
    #[instrument(skip(self))]
    pub async fn delete_api_token(&self, id: u64) -> Result<Value> {
        self.dispatcher
            .send(&ApiRequest::delete(endpoints::api_token(id)).privileged())
            .await
    }

    // ------------------------------------------------------------------
    // Schema introspection
    // ------------------------------------------------------------------

    /// List content types with their attributes.
    pub async fn list_content_types(&self) -> Result<Value> {
        let registry = self.content_type_registry().await?;
        Ok(Value::Array(registry.values().cloned().collect()))
    }

    /// List components with their attributes.
    pub async fn list_components(&self) -> Result<Value> {
        let registry = self.component_registry().await?;
        Ok(Value::Array(registry.values().cloned().collect()))
    }

    /// Full schema of one content type from the content-type builder.
    #[instrument(skip(self), fields(%uid))]
    pub async fn get_content_type_schema(&self, uid: &ContentTypeUid) -> Result<Value> {
        self.dispatcher
            .send(&ApiRequest::get(endpoints::content_type_schema(uid)).privileged())
            .await
    }
}

fn to_json<T: serde::Serialize>(body: &T) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| {
        InvalidInputError::Other {
            message: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_kinds() {
        assert_eq!(TokenKind::default().as_str(), "full-access");
        assert_eq!(TokenKind::ReadOnly.as_str(), "read-only");
    }

    #[test]
    fn lifespan_is_sent_in_milliseconds() {
        let body = to_json(&CreateApiTokenRequest {
            name: "agent",
            description: None,
            kind: "full-access",
            lifespan: Some(7 * 24 * 60 * 60 * 1000),
        })
        .unwrap();
        assert_eq!(body["lifespan"], 604_800_000u64);
        assert_eq!(body["type"], "full-access");
        assert!(body.get("description").is_none());
    }
}
