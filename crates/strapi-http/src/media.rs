//! Media library uploads.
//!
//! Size and encoding checks run before any network call; a rejected upload
//! never reaches the backend.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument};

use strapi_core::error::MediaError;
use strapi_core::media::check_path_size;
use strapi_core::query::QuerySpec;
use strapi_core::redact::redact_binary;
use strapi_core::{MediaUpload, Result};

use crate::content::ContentClient;
use crate::dispatch::ApiRequest;
use crate::endpoints;
use crate::translate::{ApiFamily, translate};

/// Where an upload's bytes come from.
#[derive(Clone, Debug)]
pub enum MediaSource {
    /// Base64 payload, optionally with a `data:` URI prefix.
    Inline {
        data: String,
        file_name: String,
        mime_type: Option<String>,
    },
    /// A file on the local filesystem.
    Path {
        path: PathBuf,
        file_name: Option<String>,
        mime_type: Option<String>,
    },
}

impl MediaSource {
    /// Validate and load the payload.
    pub async fn load(self) -> Result<MediaUpload> {
        match self {
            MediaSource::Inline {
                data,
                file_name,
                mime_type,
            } => MediaUpload::from_base64(&data, file_name, mime_type.as_deref()),
            MediaSource::Path {
                path,
                file_name,
                mime_type,
            } => load_path(&path, file_name, mime_type.as_deref()).await,
        }
    }
}

async fn load_path(
    path: &Path,
    file_name: Option<String>,
    mime_type: Option<&str>,
) -> Result<MediaUpload> {
    let io_error = |e: std::io::Error| MediaError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let metadata = tokio::fs::metadata(path).await.map_err(io_error)?;
    if !metadata.is_file() {
        return Err(MediaError::Io {
            path: path.display().to_string(),
            message: "not a regular file".to_string(),
        }
        .into());
    }
    check_path_size(metadata.len())?;

    let bytes = tokio::fs::read(path).await.map_err(io_error)?;
    let file_name = file_name
        .or_else(|| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "upload".to_string());

    MediaUpload::from_file_bytes(bytes, file_name, mime_type)
}

impl ContentClient {
    /// Upload one file to the media library.
    ///
    /// `file_info` is forwarded as the backend's `fileInfo` metadata
    /// (`name`, `alternativeText`, `caption`).
    #[instrument(skip(self, source, file_info))]
    pub async fn upload_media(
        &self,
        source: MediaSource,
        file_info: Option<Value>,
    ) -> Result<Value> {
        let upload = source.load().await?;
        debug!(
            file_name = upload.file_name(),
            mime_type = upload.mime_type(),
            bytes = upload.len(),
            "uploading media"
        );

        let request = ApiRequest::post(endpoints::UPLOAD).multipart(upload, file_info);
        let response = self.dispatcher.send(&request).await?;
        info!("media uploaded");
        Ok(response)
    }

    /// List files in the media library.
    #[instrument(skip(self, query))]
    pub async fn list_media(&self, query: &QuerySpec) -> Result<Value> {
        let request =
            ApiRequest::get(endpoints::UPLOAD_FILES).query(translate(query, ApiFamily::Content)?);
        let mut response = self.dispatcher.send(&request).await?;
        redact_binary(&mut response);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn path_upload_uses_file_name() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"\x89PNG fake").unwrap();

        let upload = MediaSource::Path {
            path: file.path().to_path_buf(),
            file_name: None,
            mime_type: None,
        }
        .load()
        .await
        .unwrap();

        assert!(upload.file_name().ends_with(".png"));
        assert_eq!(upload.mime_type(), "image/png");
        assert_eq!(upload.len(), 9);
    }

    #[tokio::test]
    async fn missing_path_is_an_io_error() {
        let err = MediaSource::Path {
            path: PathBuf::from("/definitely/not/here.png"),
            file_name: None,
            mime_type: None,
        }
        .load()
        .await
        .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.png"));
    }
}
