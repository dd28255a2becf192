//! Media payload validation.
//!
//! Inline payloads arrive base64-encoded inside a tool call, so they are
//! held in memory several times over; they get a much smaller ceiling than
//! uploads read from a file path. All checks run before any network call.

use std::fmt;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, MediaError};

/// Ceiling for inline base64 payloads, measured in decoded bytes.
pub const MAX_INLINE_UPLOAD_BYTES: u64 = 1024 * 1024;

/// Ceiling for uploads read from a file path.
pub const MAX_PATH_UPLOAD_BYTES: u64 = 200 * 1024 * 1024;

/// A validated media payload ready for multipart upload.
#[derive(Clone)]
pub struct MediaUpload {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl MediaUpload {
    /// Decode an inline base64 payload.
    ///
    /// A `data:<mime>;base64,` prefix is accepted and supplies the MIME type
    /// when none is given. The approximate decoded size is checked against
    /// [`MAX_INLINE_UPLOAD_BYTES`] before decoding.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::TooLarge`] with the computed size,
    /// [`MediaError::Encoding`] for malformed base64, or
    /// [`MediaError::Empty`].
    pub fn from_base64(
        data: &str,
        file_name: impl Into<String>,
        mime_type: Option<&str>,
    ) -> Result<Self, Error> {
        let (prefix_mime, encoded) = split_data_uri(data);
        let encoded: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();

        if encoded.is_empty() {
            return Err(MediaError::Empty.into());
        }

        let approx_bytes = approx_decoded_len(encoded.len());
        if approx_bytes > MAX_INLINE_UPLOAD_BYTES {
            return Err(MediaError::TooLarge {
                transport: "inline base64",
                approx_bytes,
                limit_bytes: MAX_INLINE_UPLOAD_BYTES,
            }
            .into());
        }

        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| MediaError::Encoding {
                reason: e.to_string(),
            })?;

        let file_name = file_name.into();
        let mime_type = mime_type
            .or(prefix_mime)
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime_type(&file_name).to_string());

        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// Wrap bytes read from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::TooLarge`] above [`MAX_PATH_UPLOAD_BYTES`] or
    /// [`MediaError::Empty`] for an empty file.
    pub fn from_file_bytes(
        bytes: Vec<u8>,
        file_name: impl Into<String>,
        mime_type: Option<&str>,
    ) -> Result<Self, Error> {
        check_path_size(bytes.len() as u64)?;
        if bytes.is_empty() {
            return Err(MediaError::Empty.into());
        }
        let file_name = file_name.into();
        let mime_type = mime_type
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime_type(&file_name).to_string());
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Payload bytes stay out of Debug output.
impl fmt::Debug for MediaUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaUpload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Check a file size against the path-upload ceiling.
pub fn check_path_size(len: u64) -> Result<(), Error> {
    if len > MAX_PATH_UPLOAD_BYTES {
        return Err(MediaError::TooLarge {
            transport: "file path",
            approx_bytes: len,
            limit_bytes: MAX_PATH_UPLOAD_BYTES,
        }
        .into());
    }
    Ok(())
}

/// Approximate decoded size of a base64 string of `encoded_len` characters.
pub fn approx_decoded_len(encoded_len: usize) -> u64 {
    (encoded_len as u64 / 4) * 3
}

/// Guess a MIME type from a file extension.
pub fn guess_mime_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("md") => "text/markdown",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

fn split_data_uri(data: &str) -> (Option<&str>, &str) {
    let data = data.trim();
    if let Some(rest) = data.strip_prefix("data:")
        && let Some((header, payload)) = rest.split_once(',')
        && let Some(mime) = header.strip_suffix(";base64")
    {
        let mime = (!mime.is_empty()).then_some(mime);
        return (mime, payload);
    }
    (None, data)
}
