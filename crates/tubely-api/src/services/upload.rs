//! Video upload pipeline.
//!
//! A request moves through [`UploadStage`]s in order. Each failure is an
//! [`UploadError`] that knows the last stage reached, so outcomes are
//! exhaustively matchable and every path is labelled in metrics.
//!
//! Temp files are owned by [`StagedFile`] and [`TempPath`] guards held in
//! local bindings; they are gone once [`UploadPipeline::process`] returns.

use std::fmt;
use std::time::Instant;

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use tempfile::TempPath;
use thiserror::Error;
use tracing::{debug, info, warn};

use tubely_media::MediaError;
use tubely_models::{
    parse_media_type, MediaTypeError, StorageKey, StorageReference, UserId, Video, VideoId,
    SUPPORTED_VIDEO_TYPE,
};
use tubely_storage::StorageError;

use crate::metrics;
use crate::services::staging::{is_payload_too_large, stage_field, StageFieldError, StagedFile};
use crate::services::video_repo::RepositoryError;
use crate::state::AppState;

/// Name of the multipart field carrying the video.
pub const VIDEO_FIELD: &str = "video";

/// Suffix given to staged uploads.
const STAGED_SUFFIX: &str = ".mp4";

/// Progress of a single upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UploadStage {
    Received,
    Validated,
    Staged,
    Probed,
    Classified,
    Transcoded,
    KeyDerived,
    Uploaded,
    Persisted,
    Complete,
}

impl UploadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStage::Received => "received",
            UploadStage::Validated => "validated",
            UploadStage::Staged => "staged",
            UploadStage::Probed => "probed",
            UploadStage::Classified => "classified",
            UploadStage::Transcoded => "transcoded",
            UploadStage::KeyDerived => "key_derived",
            UploadStage::Uploaded => "uploaded",
            UploadStage::Persisted => "persisted",
            UploadStage::Complete => "complete",
        }
    }
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that end an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Couldn't find video")]
    VideoNotFound,

    #[error("Not authorized to update this video")]
    Unauthorized,

    #[error("Failed to load video: {0}")]
    Lookup(#[source] RepositoryError),

    #[error("Missing form field: video")]
    MissingField,

    #[error("Invalid multipart form: {0}")]
    InvalidForm(String),

    #[error("Invalid Content-Type: {0}")]
    InvalidContentType(#[from] MediaTypeError),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Failed to stage upload: {0}")]
    Staging(#[source] std::io::Error),

    #[error("Failed to probe video: {0}")]
    Probe(#[source] MediaError),

    #[error("Failed to process video for fast start: {0}")]
    Transcode(#[source] MediaError),

    #[error("Failed to upload video to object storage: {0}")]
    Store(#[source] StorageError),

    #[error("Failed to record uploaded video: {0}")]
    Persist(#[source] RepositoryError),
}

impl UploadError {
    /// The last stage the upload reached before failing.
    pub fn stage(&self) -> UploadStage {
        match self {
            UploadError::VideoNotFound | UploadError::Unauthorized | UploadError::Lookup(_) => {
                UploadStage::Received
            }
            UploadError::MissingField
            | UploadError::InvalidForm(_)
            | UploadError::InvalidContentType(_)
            | UploadError::UnsupportedMediaType(_)
            | UploadError::PayloadTooLarge { .. }
            | UploadError::Staging(_) => UploadStage::Validated,
            UploadError::Probe(_) => UploadStage::Staged,
            UploadError::Transcode(_) => UploadStage::Classified,
            UploadError::Store(_) => UploadStage::KeyDerived,
            UploadError::Persist(_) => UploadStage::Uploaded,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::VideoNotFound => StatusCode::NOT_FOUND,
            UploadError::Unauthorized => StatusCode::UNAUTHORIZED,
            UploadError::MissingField
            | UploadError::InvalidForm(_)
            | UploadError::InvalidContentType(_)
            | UploadError::UnsupportedMediaType(_) => StatusCode::BAD_REQUEST,
            UploadError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Lookup(_)
            | UploadError::Staging(_)
            | UploadError::Probe(_)
            | UploadError::Transcode(_)
            | UploadError::Store(_)
            | UploadError::Persist(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            UploadError::VideoNotFound => "video_not_found",
            UploadError::Unauthorized => "not_owner",
            UploadError::Lookup(_) => "lookup_failed",
            UploadError::MissingField => "missing_field",
            UploadError::InvalidForm(_) => "invalid_form",
            UploadError::InvalidContentType(_) => "invalid_content_type",
            UploadError::UnsupportedMediaType(_) => "unsupported_media_type",
            UploadError::PayloadTooLarge { .. } => "payload_too_large",
            UploadError::Staging(_) => "staging_failed",
            UploadError::Probe(_) => "probe_failed",
            UploadError::Transcode(_) => "transcode_failed",
            UploadError::Store(_) => "store_failed",
            UploadError::Persist(_) => "persist_failed",
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Server-side causes carry paths and tool output, so they are collapsed
    /// to a category message.
    pub fn public_message(&self) -> String {
        match self {
            UploadError::Lookup(_) => "Couldn't load video".to_string(),
            UploadError::Staging(_) => "Couldn't save uploaded file".to_string(),
            UploadError::Probe(_) => "Error reading video dimensions".to_string(),
            UploadError::Transcode(_) => "Error processing video".to_string(),
            UploadError::Store(_) => "Error uploading video".to_string(),
            UploadError::Persist(_) => "Couldn't update video".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Map a multipart failure, telling the body ceiling apart from bad framing.
fn classify_multipart_error(err: MultipartError, limit: usize) -> UploadError {
    if is_payload_too_large(&err) {
        UploadError::PayloadTooLarge { limit }
    } else {
        UploadError::InvalidForm(err.body_text())
    }
}

/// The `video` part staged to disk with its validated media type.
pub struct StagedUpload {
    file: StagedFile,
    media_type: String,
}

/// Runs the upload stages against the components in [`AppState`].
pub struct UploadPipeline<'a> {
    state: &'a AppState,
}

impl<'a> UploadPipeline<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Load the target record and check the caller owns it.
    ///
    /// Runs before the body is read, so rejected callers cause no file I/O.
    pub async fn authorize(&self, video_id: &VideoId, caller: &UserId) -> Result<Video, UploadError> {
        let video = self
            .state
            .videos
            .get(video_id)
            .await
            .map_err(UploadError::Lookup)?
            .ok_or(UploadError::VideoNotFound)?;

        if !video.is_owned_by(caller) {
            warn!(video_id = %video_id, user_id = %caller, "Upload rejected: caller does not own video");
            return Err(UploadError::Unauthorized);
        }

        Ok(video)
    }

    /// Find the `video` part, check its media type and copy it to disk.
    ///
    /// Other parts are skipped. The multipart body is expected to be capped
    /// at `max_upload_bytes`.
    pub async fn stage(&self, multipart: &mut Multipart) -> Result<StagedUpload, UploadError> {
        let limit = self.state.config.max_upload_bytes;
        let dir = self.state.config.staging_dir();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| classify_multipart_error(e, limit))?
        {
            if field.name() != Some(VIDEO_FIELD) {
                debug!(field = ?field.name(), "Skipping multipart field");
                continue;
            }

            let media_type = parse_media_type(field.content_type().unwrap_or_default())?;
            if media_type != SUPPORTED_VIDEO_TYPE {
                return Err(UploadError::UnsupportedMediaType(media_type));
            }

            let file = stage_field(&mut field, &dir, STAGED_SUFFIX)
                .await
                .map_err(|e| match e {
                    StageFieldError::Multipart(e) => classify_multipart_error(e, limit),
                    StageFieldError::Io(e) => UploadError::Staging(e),
                })?;

            return Ok(StagedUpload { file, media_type });
        }

        Err(UploadError::MissingField)
    }

    /// Probe, remux, store and record a staged upload.
    pub async fn process(&self, video: Video, staged: StagedUpload) -> Result<Video, UploadError> {
        let input = staged.file.path();

        let started = Instant::now();
        let geometry = self
            .state
            .media
            .probe(input)
            .await
            .map_err(UploadError::Probe)?;
        metrics::record_probe_duration(started.elapsed().as_secs_f64());

        // Classified from the original upload, not the remuxed output.
        let aspect = geometry.aspect_class();
        debug!(
            video_id = %video.id,
            width = geometry.width,
            height = geometry.height,
            aspect = %aspect,
            "Classified upload"
        );

        let started = Instant::now();
        let processed = self
            .state
            .media
            .faststart(input)
            .await
            .map(TempPath::from_path)
            .map_err(UploadError::Transcode)?;
        metrics::record_faststart_duration(started.elapsed().as_secs_f64());

        let key = StorageKey::derive(&staged.media_type, aspect);
        let bucket = &self.state.config.s3_bucket;

        let size = tokio::fs::metadata(&processed)
            .await
            .map(|m| m.len())
            .unwrap_or(0);

        let started = Instant::now();
        self.state
            .storage
            .put_file(bucket, key.as_str(), &processed, &staged.media_type)
            .await
            .map_err(UploadError::Store)?;
        metrics::record_store_duration(started.elapsed().as_secs_f64());
        metrics::record_uploaded_bytes(aspect.as_str(), size);

        let reference = StorageReference::new(bucket.as_str(), key.as_str());
        let video = video.with_storage_reference(&reference);

        if let Err(e) = self.state.videos.update(&video).await {
            warn!(
                video_id = %video.id,
                bucket = %reference.bucket,
                key = %reference.key,
                "Uploaded object is orphaned: metadata update failed"
            );
            return Err(UploadError::Persist(e));
        }

        info!(
            video_id = %video.id,
            key = %key,
            aspect = %aspect,
            bytes = size,
            "Video uploaded"
        );

        Ok(video)
    }

    /// Stage and process an upload for an already authorized video.
    pub async fn run(&self, video: Video, multipart: &mut Multipart) -> Result<Video, UploadError> {
        let started = Instant::now();

        let result = match self.stage(multipart).await {
            Ok(staged) => self.process(video, staged).await,
            Err(e) => Err(e),
        };

        let elapsed = started.elapsed().as_secs_f64();
        match &result {
            Ok(_) => metrics::record_upload(UploadStage::Complete.as_str(), "ok", elapsed),
            Err(e) => metrics::record_upload(e.stage().as_str(), e.code(), elapsed),
        }

        result
    }
}
