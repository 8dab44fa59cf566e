//! Shared data models for the Tubely backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video records and their identifiers
//! - Aspect classification of uploaded media
//! - Object storage keys and persisted storage references
//! - Media type parsing for uploads

pub mod aspect;
pub mod media_type;
pub mod storage_key;
pub mod video;

// Re-export common types
pub use aspect::AspectClass;
pub use media_type::{parse_media_type, MediaTypeError, SUPPORTED_VIDEO_TYPE};
pub use storage_key::{StorageKey, StorageReference};
pub use video::{IdParseError, NewVideo, UserId, Video, VideoId};
