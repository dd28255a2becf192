//! Request dispatch.
//!
//! Every backend call goes through [`Dispatcher::send`], which attaches the
//! current credential, maps error statuses onto the error taxonomy, and
//! recovers from an expired admin session by logging in again and reissuing
//! the request once.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, instrument, trace, warn};

use strapi_core::error::{ApiError, AuthError, MediaError, TransportError, ValidationError};
use strapi_core::{BaseUrl, Error, MediaUpload, Result};

use crate::auth::{Authenticator, Credential};
use crate::endpoints::ErrorEnvelope;

/// Classify a reqwest failure.
pub fn transport_error(err: reqwest::Error) -> Error {
    let message = err.to_string();
    let transport = if err.is_timeout() {
        TransportError::Timeout { message }
    } else if err.is_connect() {
        TransportError::Connection { message }
    } else if err.is_decode() {
        TransportError::Decode { message }
    } else {
        TransportError::Http { message }
    };
    transport.into()
}

/// Body of an outgoing request.
#[derive(Clone, Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// A media upload, with optional `fileInfo` metadata.
    Multipart {
        upload: MediaUpload,
        file_info: Option<Value>,
    },
}

/// One backend call.
///
/// The request is kept whole so it can be reissued after a re-login.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    privileged: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            privileged: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append translated query pairs.
    pub fn query(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Append one query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, upload: MediaUpload, file_info: Option<Value>) -> Self {
        self.body = RequestBody::Multipart { upload, file_info };
        self
    }

    /// Mark the request as administrative: it requires an admin session.
    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }
}

/// Sends requests with credential attachment and expiry recovery.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    client: reqwest::Client,
    base_url: BaseUrl,
    auth: Authenticator,
}

impl Dispatcher {
    pub fn new(client: reqwest::Client, base_url: BaseUrl, auth: Authenticator) -> Self {
        Self {
            client,
            base_url,
            auth,
        }
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.auth
    }

    /// Send a request and decode the JSON response.
    ///
    /// A `401` on a request that carried an admin session triggers one
    /// re-login; on success the request is reissued exactly once with the
    /// new session. Nothing else is retried. Empty bodies decode to
    /// `Value::Null`.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, request: &ApiRequest) -> Result<Value> {
        let credential = if request.privileged {
            Some(self.auth.ensure_session().await?)
        } else {
            self.auth.credential().await
        };

        let response = self.execute(request, credential.as_ref()).await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            && let Some(used @ Credential::Session(_)) = &credential
        {
            if self.auth.handle_auth_error(used).await? {
                debug!("reissuing request with renewed session");
                let renewed = self.auth.credential().await;
                let retry = self.execute(request, renewed.as_ref()).await?;
                return self.decode(retry, renewed.as_ref()).await;
            }
            warn!("session renewal failed");
            return Err(AuthError::SessionExpired.into());
        }

        self.decode(response, credential.as_ref()).await
    }

    async fn execute(
        &self,
        request: &ApiRequest,
        credential: Option<&Credential>,
    ) -> Result<reqwest::Response> {
        let url = self.base_url.endpoint(&request.path);
        trace!(query = ?request.query, "request parameters");

        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(credential) = credential {
            builder = builder.bearer_auth(credential.as_str());
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart { upload, file_info } => {
                builder.multipart(upload_form(upload, file_info.as_ref())?)
            }
        };

        builder.send().await.map_err(transport_error)
    }

    async fn decode(
        &self,
        response: reqwest::Response,
        credential: Option<&Credential>,
    ) -> Result<Value> {
        let status = response.status();
        trace!(%status, "backend response");

        if !status.is_success() {
            return Err(error_from_response(response, credential).await);
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            TransportError::Decode {
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// Map an error response onto the error taxonomy.
///
/// A `401` is attributed by the credential the request carried, so an
/// expired session, a rejected static token, and a request that never had a
/// credential produce different errors.
async fn error_from_response(response: reqwest::Response, credential: Option<&Credential>) -> Error {
    let status = response.status().as_u16();
    let path = response.url().path().to_string();
    let body = response
        .json::<ErrorEnvelope>()
        .await
        .ok()
        .and_then(|envelope| envelope.error)
        .unwrap_or_default();

    debug!(status, name = ?body.name, message = ?body.message, "backend error response");

    match status {
        400 => ValidationError::new(
            body.message
                .unwrap_or_else(|| "request failed validation".to_string()),
            body.details,
        )
        .into(),
        401 => match credential {
            Some(Credential::Session(_)) => AuthError::SessionExpired.into(),
            Some(Credential::ApiToken(_)) => AuthError::InvalidApiToken.into(),
            None => AuthError::AuthenticationRequired.into(),
        },
        403 => Error::Forbidden {
            message: body.message.unwrap_or_else(|| "Forbidden".to_string()),
        },
        404 => Error::NotFound {
            resource: match body.message {
                Some(message) => format!("{} ({})", path, message),
                None => path,
            },
        },
        429 => Error::RateLimited {
            message: body
                .message
                .unwrap_or_else(|| "Too many requests".to_string()),
        },
        _ => ApiError::new(status, body.name, body.message)
            .with_details(body.details)
            .into(),
    }
}

fn upload_form(upload: &MediaUpload, file_info: Option<&Value>) -> Result<Form> {
    let part = Part::bytes(upload.bytes().to_vec())
        .file_name(upload.file_name().to_string())
        .mime_str(upload.mime_type())
        .map_err(|e| MediaError::Encoding {
            reason: format!("invalid MIME type '{}': {}", upload.mime_type(), e),
        })?;

    let mut form = Form::new().part("files", part);
    if let Some(info) = file_info {
        form = form.text("fileInfo", info.to_string());
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_keeps_pairs_in_order() {
        let request = ApiRequest::get("/api/articles")
            .query(vec![("filters[a]".to_string(), "1".to_string())])
            .param("locale", "*");

        assert_eq!(
            request.query_pairs(),
            &[
                ("filters[a]".to_string(), "1".to_string()),
                ("locale".to_string(), "*".to_string()),
            ]
        );
        assert!(!request.is_privileged());
        assert!(request.clone().privileged().is_privileged());
    }

    #[test]
    fn invalid_mime_type_is_a_media_error() {
        let upload = MediaUpload::from_base64("aGVsbG8=", "x.txt", Some("not a mime")).unwrap();
        let err = upload_form(&upload, None).unwrap_err();
        assert!(matches!(err, Error::Media(MediaError::Encoding { .. })));
    }
}
