//! Content-type and component registries.
//!
//! Both registries are fetched once per client and cached. The content-type
//! registry resolves the plural API name used by the public content API, and
//! both feed validation enrichment.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use strapi_core::error::AuthError;
use strapi_core::{ContentTypeUid, Error, Result};

use crate::dispatch::ApiRequest;
use crate::endpoints;

use super::ContentClient;

/// Schema entries keyed by UID.
pub type Registry = BTreeMap<String, Value>;

#[derive(Debug, Default)]
pub(crate) struct SchemaCache {
    content_types: RwLock<Option<Arc<Registry>>>,
    components: RwLock<Option<Arc<Registry>>>,
}

impl ContentClient {
    /// The content-type registry, fetched on first use.
    pub async fn content_type_registry(&self) -> Result<Arc<Registry>> {
        self.cached_registry(&self.schema.content_types, endpoints::CONTENT_TYPES)
            .await
    }

    /// The component registry, fetched on first use.
    pub async fn component_registry(&self) -> Result<Arc<Registry>> {
        self.cached_registry(&self.schema.components, endpoints::COMPONENTS)
            .await
    }

    /// Forget cached registries so the next lookup refetches them.
    pub async fn invalidate_schema_cache(&self) {
        self.schema.content_types.write().await.take();
        self.schema.components.write().await.take();
    }

    /// Resolve the plural API name for a content type.
    ///
    /// Without admin credentials the registry is unreachable, so the name is
    /// derived from the model name instead.
    #[instrument(skip(self), fields(%uid))]
    pub async fn plural_name(&self, uid: &ContentTypeUid) -> Result<String> {
        let registry = match self.content_type_registry().await {
            Ok(registry) => registry,
            Err(Error::Auth(AuthError::AdminCredentialsRequired)) => {
                let guess = guess_plural(uid.model_name());
                debug!(plural = %guess, "registry unavailable, guessing plural name");
                return Ok(guess);
            }
            Err(err) => return Err(err),
        };

        let entry = registry.get(uid.as_str()).ok_or_else(|| Error::NotFound {
            resource: format!("content type {}", uid),
        })?;

        Ok(plural_name_of(entry)
            .map(str::to_string)
            .unwrap_or_else(|| guess_plural(uid.model_name())))
    }

    async fn cached_registry(
        &self,
        slot: &RwLock<Option<Arc<Registry>>>,
        path: &str,
    ) -> Result<Arc<Registry>> {
        if let Some(registry) = slot.read().await.as_ref() {
            return Ok(Arc::clone(registry));
        }

        let response = self
            .dispatcher
            .send(&ApiRequest::get(path).privileged())
            .await?;
        let registry = Arc::new(index_by_uid(&response));
        debug!(path, entries = registry.len(), "schema registry loaded");

        *slot.write().await = Some(Arc::clone(&registry));
        Ok(registry)
    }
}

/// Index a `{"data": [{"uid": ...}, ...]}` listing by UID.
pub(crate) fn index_by_uid(response: &Value) -> Registry {
    let items = response
        .get("data")
        .and_then(Value::as_array)
        .or_else(|| response.as_array());

    items
        .into_iter()
        .flatten()
        .filter_map(|item| {
            let uid = item.get("uid")?.as_str()?;
            Some((uid.to_string(), item.clone()))
        })
        .collect()
}

/// The plural API name of a registry entry.
pub(crate) fn plural_name_of(entry: &Value) -> Option<&str> {
    ["info", "schema"]
        .iter()
        .find_map(|key| entry.get(*key)?.get("pluralName")?.as_str())
        .or_else(|| entry.get("pluralName")?.as_str())
}

/// The attribute map of a registry entry.
pub(crate) fn attributes_of(entry: &Value) -> Option<&Map<String, Value>> {
    entry
        .get("attributes")
        .or_else(|| entry.get("schema")?.get("attributes"))
        .and_then(Value::as_object)
}

/// English pluralization good enough for generated API names.
pub fn guess_plural(singular: &str) -> String {
    let ends_with_consonant_y = singular.ends_with('y')
        && singular
            .chars()
            .rev()
            .nth(1)
            .is_some_and(|c| !"aeiou".contains(c));

    if ends_with_consonant_y {
        format!("{}ies", &singular[..singular.len() - 1])
    } else if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| singular.ends_with(suffix))
    {
        format!("{}es", singular)
    } else {
        format!("{}s", singular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn indexes_listing() {
        let registry = index_by_uid(&json!({
            "data": [
                { "uid": "api::project.project", "info": { "pluralName": "projects" } },
                { "uid": "api::category.category", "schema": { "pluralName": "categories" } },
                { "no_uid": true }
            ]
        }));
        assert_eq!(registry.len(), 2);
        assert_eq!(
            plural_name_of(&registry["api::project.project"]),
            Some("projects")
        );
        assert_eq!(
            plural_name_of(&registry["api::category.category"]),
            Some("categories")
        );
    }

    #[test]
    fn plural_guesses() {
        assert_eq!(guess_plural("project"), "projects");
        assert_eq!(guess_plural("category"), "categories");
        assert_eq!(guess_plural("day"), "days");
        assert_eq!(guess_plural("address"), "addresses");
        assert_eq!(guess_plural("box"), "boxes");
    }
}
