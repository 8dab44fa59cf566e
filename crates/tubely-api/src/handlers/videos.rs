//! Video record handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use tubely_models::{NewVideo, Video, VideoId};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::videos::{to_response, to_responses, VideoResponse};
use crate::state::AppState;

/// Parse a path segment into a video ID.
pub(crate) fn parse_video_id(raw: &str) -> ApiResult<VideoId> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid video ID"))
}

/// Load a video the caller owns.
async fn load_owned(state: &AppState, user: &AuthUser, video_id: &VideoId) -> ApiResult<Video> {
    let video = state
        .videos
        .get(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Couldn't find video"))?;

    if !video.is_owned_by(&user.user_id) {
        return Err(ApiError::unauthorized("You don't have access to this video"));
    }

    Ok(video)
}

/// Create a draft video record.
pub async fn create_video(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<NewVideo>,
) -> ApiResult<(StatusCode, Json<VideoResponse>)> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }

    let video = state
        .videos
        .create(Video::new(user.user_id, title, request.description))
        .await?;

    info!(video_id = %video.id, user_id = %user.user_id, "Created video");

    Ok((StatusCode::CREATED, Json(to_response(&state, video).await)))
}

/// List the caller's videos, newest first.
pub async fn list_videos(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<VideoResponse>>> {
    let videos = state.videos.list_for_user(&user.user_id).await?;
    Ok(Json(to_responses(&state, videos).await))
}

/// Fetch a single video.
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<VideoResponse>> {
    let video_id = parse_video_id(&video_id)?;
    let video = load_owned(&state, &user, &video_id).await?;
    Ok(Json(to_response(&state, video).await))
}

/// Delete a video record.
///
/// The stored object is left in place.
pub async fn delete_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
) -> ApiResult<StatusCode> {
    let video_id = parse_video_id(&video_id)?;
    load_owned(&state, &user, &video_id).await?;
    state.videos.delete(&video_id).await?;

    info!(video_id = %video_id, user_id = %user.user_id, "Deleted video");

    Ok(StatusCode::NO_CONTENT)
}
