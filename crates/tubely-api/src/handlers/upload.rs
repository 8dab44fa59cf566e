//! Video upload handler.

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_LENGTH;
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::handlers::videos::parse_video_id;
use crate::services::staging::cap_body;
use crate::services::upload::{UploadError, UploadPipeline};
use crate::services::videos::{to_response, VideoResponse};
use crate::state::AppState;

/// Upload the media for an existing video.
///
/// Expects a multipart body with a `video` part of type `video/mp4`.
pub async fn upload_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
    request: Request,
) -> ApiResult<Json<VideoResponse>> {
    let video_id = parse_video_id(&video_id)?;
    let pipeline = UploadPipeline::new(&state);

    // Ownership is settled before a single body byte is read.
    let video = pipeline.authorize(&video_id, &user.user_id).await?;

    let limit = state.config.max_upload_bytes;
    if declared_length(request.headers()).is_some_and(|len| len > limit as u64) {
        return Err(UploadError::PayloadTooLarge { limit }.into());
    }

    info!(video_id = %video_id, user_id = %user.user_id, "Uploading video");

    let (parts, body) = request.into_parts();
    let request = Request::from_parts(parts, cap_body(body, limit));
    let mut multipart = Multipart::from_request(request, &state)
        .await
        .map_err(|e| UploadError::InvalidForm(e.body_text()))?;

    let video = pipeline.run(video, &mut multipart).await?;

    Ok(Json(to_response(&state, video).await))
}

/// The request's declared `Content-Length`, if any.
fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
