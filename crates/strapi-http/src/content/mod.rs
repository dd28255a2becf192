//! Content operations.
//!
//! [`ContentClient`] maps document-level operations (create, update,
//! publish, localize, delete) onto the backend's administrative and public
//! routes. It owns the session for its backend and guarantees that every
//! outbound payload is stripped of backend-managed fields.

mod schema;
mod validation;

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use strapi_core::entry::document_id_of;
use strapi_core::error::{ApiError, InvalidInputError};
use strapi_core::query::{LocaleSelector, QuerySpec};
use strapi_core::redact::redact_binary;
use strapi_core::{
    BaseUrl, ContentTypeUid, DocumentId, EntryData, Error, Locale, LocaleScope, Result, UpdateMode,
};

use crate::auth::Authenticator;
use crate::config::ClientConfig;
use crate::dispatch::{ApiRequest, Dispatcher};
use crate::endpoints::{self, BulkActionRequest, actions};
use crate::translate::{ApiFamily, translate};

pub use schema::{Registry, guess_plural};
use schema::SchemaCache;

/// High-level client for one backend instance.
///
/// Cheap to clone; clones share the session and schema cache.
#[derive(Clone, Debug)]
pub struct ContentClient {
    pub(crate) dispatcher: Dispatcher,
    schema: Arc<SchemaCache>,
}

impl ContentClient {
    /// Create a client. No network traffic happens until the first call.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = config.build_http_client()?;
        let auth = Authenticator::new(client.clone(), &config);
        let dispatcher = Dispatcher::new(client, config.base_url.clone(), auth);
        Ok(Self {
            dispatcher,
            schema: Arc::new(SchemaCache::default()),
        })
    }

    pub fn base_url(&self) -> &BaseUrl {
        self.dispatcher.base_url()
    }

    pub fn authenticator(&self) -> &Authenticator {
        self.dispatcher.authenticator()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// List entries of a content type through the content manager.
    #[instrument(skip(self, query), fields(%uid))]
    pub async fn get_entries(&self, uid: &ContentTypeUid, query: &QuerySpec) -> Result<Value> {
        let request = ApiRequest::get(endpoints::collection(uid))
            .query(translate(query, ApiFamily::ContentManager)?)
            .privileged();
        self.read(&request).await
    }

    /// Fetch one document through the content manager.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the document, or the requested locale
    /// variant, does not exist.
    #[instrument(skip(self, query), fields(%uid, %id))]
    pub async fn get_entry(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        query: &QuerySpec,
    ) -> Result<Value> {
        let request = ApiRequest::get(endpoints::document(uid, id))
            .query(translate(query, ApiFamily::ContentManager)?)
            .privileged();
        let response = self.read(&request).await?;
        ensure_found(&response, requested_locale(query), || {
            describe_document(uid, id, query.locale.as_ref().map(|l| l.as_param()))
        })?;
        Ok(response)
    }

    /// List published entries through the public content API.
    #[instrument(skip(self, query), fields(%uid))]
    pub async fn get_public_entries(
        &self,
        uid: &ContentTypeUid,
        query: &QuerySpec,
    ) -> Result<Value> {
        let plural = self.plural_name(uid).await?;
        let request = ApiRequest::get(endpoints::public_collection(&plural))
            .query(translate(query, ApiFamily::Content)?);
        self.read(&request).await
    }

    /// Fetch one published document through the public content API.
    #[instrument(skip(self, query), fields(%uid, %id))]
    pub async fn get_public_entry(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        query: &QuerySpec,
    ) -> Result<Value> {
        let plural = self.plural_name(uid).await?;
        let request = ApiRequest::get(endpoints::public_document(&plural, id))
            .query(translate(query, ApiFamily::Content)?);
        let response = self.read(&request).await?;
        ensure_found(&response, requested_locale(query), || {
            describe_document(uid, id, query.locale.as_ref().map(|l| l.as_param()))
        })?;
        Ok(response)
    }

    // ------------------------------------------------------------------
    // Creation and update
    // ------------------------------------------------------------------

    /// Create a draft entry.
    #[instrument(skip(self, data), fields(%uid))]
    pub async fn create_entry(
        &self,
        uid: &ContentTypeUid,
        data: EntryData,
        locale: Option<&Locale>,
    ) -> Result<Value> {
        let payload = data.into_outbound();
        let request = with_locale(ApiRequest::post(endpoints::collection(uid)), locale)
            .json(payload.clone())
            .privileged();
        let response = self.write(uid, &request, &payload).await?;
        info!(document_id = ?response.get("data").and_then(document_id_of), "draft created");
        Ok(response)
    }

    /// Create an entry and publish it in one step.
    #[instrument(skip(self, data), fields(%uid))]
    pub async fn create_published_entry(
        &self,
        uid: &ContentTypeUid,
        data: EntryData,
        locale: Option<&Locale>,
    ) -> Result<Value> {
        let payload = data.into_outbound();
        let request = with_locale(
            ApiRequest::post(endpoints::collection_action(uid, actions::PUBLISH)),
            locale,
        )
        .json(payload.clone())
        .privileged();
        self.write(uid, &request, &payload).await
    }

    /// Update the draft of one locale variant.
    #[instrument(skip(self, data), fields(%uid, %id, ?mode))]
    pub async fn update_entry_draft(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        data: EntryData,
        locale: Option<&Locale>,
        mode: UpdateMode,
    ) -> Result<Value> {
        let payload = self.prepare_update(uid, id, data, locale, mode).await?;
        let request = with_locale(ApiRequest::put(endpoints::document(uid, id)), locale)
            .json(payload.clone())
            .privileged();
        self.write(uid, &request, &payload).await
    }

    /// Update one locale variant and publish it.
    #[instrument(skip(self, data), fields(%uid, %id, ?mode))]
    pub async fn update_entry_and_publish(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        data: EntryData,
        locale: Option<&Locale>,
        mode: UpdateMode,
    ) -> Result<Value> {
        let payload = self.prepare_update(uid, id, data, locale, mode).await?;
        let request = with_locale(
            ApiRequest::post(endpoints::document_action(uid, id, actions::PUBLISH)),
            locale,
        )
        .json(payload.clone())
        .privileged();
        self.write(uid, &request, &payload).await
    }

    // ------------------------------------------------------------------
    // Deletion and publication
    // ------------------------------------------------------------------

    /// Delete a document, either every locale variant or just one.
    #[instrument(skip(self), fields(%uid, %id, locale = scope.as_param()))]
    pub async fn delete_entry(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        scope: &LocaleScope,
    ) -> Result<Value> {
        let request = ApiRequest::delete(endpoints::document(uid, id))
            .param("locale", scope.as_param())
            .privileged();
        let response = self.dispatcher.send(&request).await?;
        info!("document deleted");
        Ok(response)
    }

    /// Publish the given documents in every locale.
    #[instrument(skip(self, ids), fields(%uid, count = ids.len()))]
    pub async fn publish_entries(&self, uid: &ContentTypeUid, ids: &[DocumentId]) -> Result<Value> {
        self.bulk_action(uid, ids, actions::BULK_PUBLISH).await
    }

    /// Unpublish the given documents in every locale.
    #[instrument(skip(self, ids), fields(%uid, count = ids.len()))]
    pub async fn unpublish_entries(
        &self,
        uid: &ContentTypeUid,
        ids: &[DocumentId],
    ) -> Result<Value> {
        self.bulk_action(uid, ids, actions::BULK_UNPUBLISH).await
    }

    /// Publish exactly one locale variant of a document.
    ///
    /// The current draft is fetched and resubmitted through the publish
    /// action, so the published content is exactly the stored draft.
    #[instrument(skip(self), fields(%uid, %id, %locale))]
    pub async fn publish_localized_entry(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        locale: &Locale,
    ) -> Result<Value> {
        let current = self.fetch_variant(uid, id, locale).await?;
        let payload = EntryData::from_stored(current)?.into_outbound();
        let request = ApiRequest::post(endpoints::document_action(uid, id, actions::PUBLISH))
            .param("locale", locale.as_str())
            .json(payload.clone())
            .privileged();
        self.write(uid, &request, &payload).await
    }

    /// Unpublish exactly one locale variant of a document.
    #[instrument(skip(self), fields(%uid, %id, %locale))]
    pub async fn unpublish_localized_entry(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        locale: &Locale,
    ) -> Result<Value> {
        let request = ApiRequest::post(endpoints::document_action(uid, id, actions::UNPUBLISH))
            .param("locale", locale.as_str())
            .json(json!({}))
            .privileged();
        self.dispatcher.send(&request).await
    }

    // ------------------------------------------------------------------
    // Localization
    // ------------------------------------------------------------------

    /// Create (or overwrite) the draft of a new locale variant.
    ///
    /// The locale travels only as a routing parameter; the variant must come
    /// back under the parent's document id.
    #[instrument(skip(self, data), fields(%uid, %id, %locale))]
    pub async fn create_localized_draft(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        locale: &Locale,
        data: EntryData,
    ) -> Result<Value> {
        let payload = data.into_outbound();
        let request = ApiRequest::put(endpoints::document(uid, id))
            .param("locale", locale.as_str())
            .json(payload.clone())
            .privileged();
        let response = self.write(uid, &request, &payload).await?;
        ensure_same_document(&response, id)?;
        Ok(response)
    }

    /// Create a new locale variant and publish it.
    #[instrument(skip(self, data), fields(%uid, %id, %locale))]
    pub async fn create_and_publish_localized_entry(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        locale: &Locale,
        data: EntryData,
    ) -> Result<Value> {
        let payload = data.into_outbound();
        let request = ApiRequest::post(endpoints::document_action(uid, id, actions::PUBLISH))
            .param("locale", locale.as_str())
            .json(payload.clone())
            .privileged();
        let response = self.write(uid, &request, &payload).await?;
        ensure_same_document(&response, id)?;
        Ok(response)
    }

    // ------------------------------------------------------------------
    // Relations
    // ------------------------------------------------------------------

    /// Attach documents to a relation field, keeping existing links.
    pub async fn connect_relation(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        field: &str,
        targets: &[DocumentId],
        locale: Option<&Locale>,
    ) -> Result<Value> {
        self.relation_change(uid, id, field, targets, locale, "connect")
            .await
    }

    /// Detach documents from a relation field.
    pub async fn disconnect_relation(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        field: &str,
        targets: &[DocumentId],
        locale: Option<&Locale>,
    ) -> Result<Value> {
        self.relation_change(uid, id, field, targets, locale, "disconnect")
            .await
    }

    #[instrument(skip(self, targets), fields(%uid, %id, count = targets.len()))]
    async fn relation_change(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        field: &str,
        targets: &[DocumentId],
        locale: Option<&Locale>,
        operation: &str,
    ) -> Result<Value> {
        if field.is_empty() || targets.is_empty() {
            return Err(InvalidInputError::Other {
                message: format!("{} needs a relation field and at least one target", operation),
            }
            .into());
        }

        let links: Vec<Value> = targets
            .iter()
            .map(|target| json!({ "documentId": target }))
            .collect();
        let payload = json!({ field: { operation: links } });
        let request = with_locale(ApiRequest::put(endpoints::document(uid, id)), locale)
            .json(payload.clone())
            .privileged();
        self.write(uid, &request, &payload).await
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn read(&self, request: &ApiRequest) -> Result<Value> {
        let mut response = self.dispatcher.send(request).await?;
        let redacted = redact_binary(&mut response);
        if redacted > 0 {
            debug!(redacted, "binary strings redacted from response");
        }
        Ok(response)
    }

    async fn write(
        &self,
        uid: &ContentTypeUid,
        request: &ApiRequest,
        payload: &Value,
    ) -> Result<Value> {
        match self.dispatcher.send(request).await {
            Err(Error::Validation(error)) => {
                let content_types = self.content_type_registry().await.ok();
                let components = self.component_registry().await.ok();
                let error = validation::annotate(
                    error,
                    payload,
                    content_types.as_ref().and_then(|r| r.get(uid.as_str())),
                    components.as_deref(),
                );
                Err(error.into())
            }
            other => other,
        }
    }

    async fn bulk_action(
        &self,
        uid: &ContentTypeUid,
        ids: &[DocumentId],
        action: &str,
    ) -> Result<Value> {
        if ids.is_empty() {
            return Err(InvalidInputError::Other {
                message: "at least one document id is required".to_string(),
            }
            .into());
        }

        let body = serde_json::to_value(BulkActionRequest { document_ids: ids }).map_err(|e| {
            InvalidInputError::Other {
                message: e.to_string(),
            }
        })?;
        let request = ApiRequest::post(endpoints::collection_action(uid, action))
            .param("locale", LocaleScope::All.as_param())
            .json(body)
            .privileged();
        self.dispatcher.send(&request).await
    }

    /// Build the payload for an update.
    ///
    /// Partial updates merge over the stored variant, read without
    /// redaction so placeholders never reach the backend.
    async fn prepare_update(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        data: EntryData,
        locale: Option<&Locale>,
        mode: UpdateMode,
    ) -> Result<Value> {
        match mode {
            UpdateMode::Replace => Ok(data.into_outbound()),
            UpdateMode::Partial => {
                let current = match locale {
                    Some(locale) => self.fetch_variant(uid, id, locale).await?,
                    None => self.fetch_default_variant(uid, id).await?,
                };
                Ok(data.merge_onto(&current).into_outbound())
            }
        }
    }

    /// Fetch the stored draft of one locale variant, unredacted.
    async fn fetch_variant(
        &self,
        uid: &ContentTypeUid,
        id: &DocumentId,
        locale: &Locale,
    ) -> Result<Value> {
        let request = ApiRequest::get(endpoints::document(uid, id))
            .param("locale", locale.as_str())
            .privileged();
        let response = self.dispatcher.send(&request).await?;
        variant(&response, Some(locale.as_str()))
            .cloned()
            .ok_or_else(|| Error::NotFound {
                resource: describe_document(uid, id, Some(locale.as_str())),
            })
    }

    async fn fetch_default_variant(&self, uid: &ContentTypeUid, id: &DocumentId) -> Result<Value> {
        let request = ApiRequest::get(endpoints::document(uid, id)).privileged();
        let response = self.dispatcher.send(&request).await?;
        variant(&response, None)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                resource: describe_document(uid, id, None),
            })
    }
}

fn with_locale(request: ApiRequest, locale: Option<&Locale>) -> ApiRequest {
    match locale {
        Some(locale) => request.param("locale", locale.as_str()),
        None => request,
    }
}

fn describe_document(uid: &ContentTypeUid, id: &DocumentId, locale: Option<&str>) -> String {
    match locale {
        Some(locale) => format!("{} document {} (locale {})", uid, id, locale),
        None => format!("{} document {}", uid, id),
    }
}

/// The concrete locale a single-entry read asks for, if any.
fn requested_locale(query: &QuerySpec) -> Option<&str> {
    match &query.locale {
        Some(LocaleSelector::Code(locale)) => Some(locale.as_str()),
        Some(LocaleSelector::All) | None => None,
    }
}

/// The entry carried by a single-entry response, if the addressed variant
/// exists.
///
/// A document missing in the requested locale comes back as `data: null`,
/// as an empty `data` object listing `meta.availableLocales`, or as a
/// fallback variant in another locale.
fn variant<'a>(response: &'a Value, locale: Option<&str>) -> Option<&'a Value> {
    let data = response.get("data")?.as_object()?;
    if data.is_empty() {
        return None;
    }
    if let Some(locale) = locale
        && let Some(returned) = data.get("locale").and_then(Value::as_str)
        && returned != locale
    {
        return None;
    }
    response.get("data")
}

fn ensure_found(
    response: &Value,
    locale: Option<&str>,
    describe: impl FnOnce() -> String,
) -> Result<()> {
    match variant(response, locale) {
        Some(_) => Ok(()),
        None => Err(Error::NotFound {
            resource: describe(),
        }),
    }
}

fn ensure_same_document(response: &Value, expected: &DocumentId) -> Result<()> {
    let returned = response.get("data").and_then(document_id_of);
    if returned == Some(expected.as_str()) {
        return Ok(());
    }

    let message = match returned {
        Some(other) => format!(
            "locale variant was created under document {} instead of {}",
            other, expected
        ),
        None => format!(
            "response did not identify the locale variant of document {}",
            expected
        ),
    };
    Err(ApiError::new(200, Some("DocumentIdMismatch".to_string()), Some(message)).into())
}
