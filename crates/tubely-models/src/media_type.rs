//! Media type parsing for uploaded parts.

use thiserror::Error;

/// The only media type accepted by the video upload path.
pub const SUPPORTED_VIDEO_TYPE: &str = "video/mp4";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaTypeError {
    #[error("Missing Content-Type")]
    Missing,

    #[error("Malformed media type: {0}")]
    Malformed(String),
}

/// Parse a `Content-Type` header value down to its lowercase `type/subtype`.
///
/// Parameters such as `; codecs=...` are dropped.
pub fn parse_media_type(value: &str) -> Result<String, MediaTypeError> {
    let essence = value.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        return Err(MediaTypeError::Missing);
    }

    let (kind, subtype) = essence
        .split_once('/')
        .ok_or_else(|| MediaTypeError::Malformed(value.to_string()))?;

    if !is_token(kind) || !is_token(subtype) {
        return Err(MediaTypeError::Malformed(value.to_string()));
    }

    Ok(essence.to_ascii_lowercase())
}

/// RFC 7230 token characters.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^'
                        | b'_' | b'`' | b'|' | b'~'
                )
        })
}
