//! Object storage keys and persisted storage references.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aspect::AspectClass;

/// Random bytes behind each asset token.
const TOKEN_BYTES: usize = 32;

/// Separator between bucket and key in the persisted reference.
const REFERENCE_SEPARATOR: char = ',';

/// Object key of the form `{class}/{token}.{ext}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Derive a fresh key for an upload.
    ///
    /// Every call yields a new random token, even for identical inputs: an
    /// object is tied to its upload event, not to its content.
    pub fn derive(media_type: &str, aspect: AspectClass) -> Self {
        let token = URL_SAFE_NO_PAD.encode(rand::random::<[u8; TOKEN_BYTES]>());
        Self(format!(
            "{}/{}.{}",
            aspect.as_str(),
            token,
            extension_for(media_type)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// File extension for a media type: the subtype, or `bin` when there is none.
fn extension_for(media_type: &str) -> &str {
    match media_type.split_once('/') {
        Some((_, subtype)) if !subtype.is_empty() => subtype,
        _ => "bin",
    }
}

/// Location of a stored object, persisted instead of a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct StorageReference {
    pub bucket: String,
    pub key: String,
}

impl StorageReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Decode a persisted `bucket,key` value.
    ///
    /// Returns `None` unless the value splits into exactly two non-empty parts.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(REFERENCE_SEPARATOR);
        let bucket = parts.next()?;
        let key = parts.next()?;
        if parts.next().is_some() || bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self::new(bucket, key))
    }
}

impl fmt::Display for StorageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.bucket, REFERENCE_SEPARATOR, self.key)
    }
}
