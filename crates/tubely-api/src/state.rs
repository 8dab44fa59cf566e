//! Application state.

use std::sync::Arc;

use tubely_media::{FfmpegToolkit, MediaToolkit};
use tubely_storage::{ObjectStore, S3Client};

use crate::auth::TokenKeys;
use crate::config::ApiConfig;
use crate::services::video_repo::{InMemoryVideoRepository, VideoRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<dyn ObjectStore>,
    pub media: Arc<dyn MediaToolkit>,
    pub videos: Arc<dyn VideoRepository>,
    pub tokens: TokenKeys,
}

impl AppState {
    /// Create application state backed by S3 and the local FFmpeg install.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let storage = S3Client::from_env().await?;
        let media = FfmpegToolkit::locate()?.with_timeout(config.media_tool_timeout_secs);

        Ok(Self::with_components(
            config,
            Arc::new(storage),
            Arc::new(media),
            Arc::new(InMemoryVideoRepository::new()),
        ))
    }

    /// Assemble state from already-built components.
    pub fn with_components(
        config: ApiConfig,
        storage: Arc<dyn ObjectStore>,
        media: Arc<dyn MediaToolkit>,
        videos: Arc<dyn VideoRepository>,
    ) -> Self {
        let tokens = TokenKeys::new(&config.jwt_secret);
        Self {
            config,
            storage,
            media,
            videos,
            tokens,
        }
    }
}
