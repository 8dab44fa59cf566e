//! Client-facing video views.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tubely_models::{UserId, Video, VideoId};
use tubely_storage::resolve_reference;

use crate::state::AppState;

/// A video as returned to clients.
///
/// `video_url` is a freshly signed playback URL, never the stored reference.
#[derive(Debug, Clone, Serialize)]
pub struct VideoResponse {
    pub id: VideoId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Build the client view of `video`, signing its storage reference.
pub async fn to_response(state: &AppState, video: Video) -> VideoResponse {
    let video_url = resolve_reference(
        state.storage.as_ref(),
        video.video_url.as_deref(),
        state.config.presign_ttl,
    )
    .await;

    VideoResponse {
        id: video.id,
        user_id: video.user_id,
        title: video.title,
        description: video.description,
        thumbnail_url: video.thumbnail_url,
        video_url,
        created_at: video.created_at,
        updated_at: video.updated_at,
    }
}

/// Resolve a batch of videos, preserving order.
pub async fn to_responses(state: &AppState, videos: Vec<Video>) -> Vec<VideoResponse> {
    let mut responses = Vec::with_capacity(videos.len());
    for video in videos {
        responses.push(to_response(state, video).await);
    }
    responses
}
