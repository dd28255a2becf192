//! Response filtering for binary-looking strings.
//!
//! Listings sometimes carry inline-encoded files (base64 blobs or `data:`
//! URIs). Those are replaced with a placeholder that keeps the length.

use serde_json::Value;

/// Strings shorter than this are never redacted.
pub const REDACTION_THRESHOLD: usize = 1000;

/// Replace every large binary-looking string in `value`, in place.
///
/// Returns the number of strings replaced.
///
/// # Example
///
/// ```
/// use strapi_core::redact::redact_binary;
/// use serde_json::json;
///
/// let blob = "QUJD".repeat(500);
/// let mut value = json!({ "title": "Cover", "raw": blob });
/// assert_eq!(redact_binary(&mut value), 1);
/// assert_eq!(value["title"], "Cover");
/// assert_eq!(value["raw"], "[binary data redacted: 2000 chars]");
/// ```
pub fn redact_binary(value: &mut Value) -> usize {
    match value {
        Value::String(s) if looks_binary(s) => {
            *value = Value::String(placeholder(s.len()));
            1
        }
        Value::Array(items) => items.iter_mut().map(redact_binary).sum(),
        Value::Object(map) => map.values_mut().map(redact_binary).sum(),
        _ => 0,
    }
}

/// Placeholder text for a redacted string of `len` characters.
pub fn placeholder(len: usize) -> String {
    format!("[binary data redacted: {} chars]", len)
}

fn looks_binary(s: &str) -> bool {
    if s.len() < REDACTION_THRESHOLD {
        return false;
    }

    if let Some(rest) = s.strip_prefix("data:") {
        return rest
            .split_once(',')
            .is_some_and(|(header, _)| header.ends_with(";base64"));
    }

    // Prose has spaces and punctuation; base64 has neither.
    s.bytes().all(|b| {
        b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=' | b'-' | b'_' | b'\n' | b'\r')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_strings_are_untouched() {
        let mut value = json!({ "hash": "QUJDREVGR0g=" });
        assert_eq!(redact_binary(&mut value), 0);
        assert_eq!(value["hash"], "QUJDREVGR0g=");
    }

    #[test]
    fn long_prose_is_untouched() {
        let prose = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let mut value = json!({ "body": prose.clone() });
        assert_eq!(redact_binary(&mut value), 0);
        assert_eq!(value["body"], prose);
    }

    #[test]
    fn data_uris_are_redacted_in_nested_arrays() {
        let uri = format!("data:image/png;base64,{}", "iVBORw0KGgo".repeat(100));
        let len = uri.len();
        let mut value = json!({ "results": [{ "cover": { "preview": uri } }] });

        assert_eq!(redact_binary(&mut value), 1);
        assert_eq!(value["results"][0]["cover"]["preview"], placeholder(len));
    }
}
