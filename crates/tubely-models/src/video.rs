//! Video record models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::storage_key::StorageReference;

/// Unique identifier for a video record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub Uuid);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VideoId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| IdParseError(s.to_string()))
    }
}

/// Identity of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| IdParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Invalid identifier: {0}")]
pub struct IdParseError(String);

/// Video record as held by the metadata store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    /// Unique video ID
    pub id: VideoId,

    /// Owner of the video
    pub user_id: UserId,

    /// Video title
    pub title: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Thumbnail URL (managed by the thumbnail upload path)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Persisted storage reference, encoded as `bucket,key`.
    ///
    /// This is never a URL. Signed URLs are minted from it on every read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Create a new video record with no media attached.
    pub fn new(user_id: UserId, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: VideoId::new(),
            user_id,
            title: title.into(),
            description: description.into(),
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given user owns this video.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }

    /// Attach an uploaded object to this video.
    pub fn with_storage_reference(mut self, reference: &StorageReference) -> Self {
        self.video_url = Some(reference.to_string());
        self.updated_at = Utc::now();
        self
    }

    /// Decode the persisted storage reference, if present and well-formed.
    pub fn storage_reference(&self) -> Option<StorageReference> {
        self.video_url.as_deref().and_then(StorageReference::parse)
    }
}

/// Fields accepted when creating a video record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NewVideo {
    pub title: String,
    #[serde(default)]
    pub description: String,
}
