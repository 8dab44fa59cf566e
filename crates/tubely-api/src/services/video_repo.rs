//! Video metadata repository.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use tubely_models::{UserId, Video, VideoId};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Video not found: {0}")]
    NotFound(VideoId),

    #[error("Metadata backend error: {0}")]
    Backend(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence for video records.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create(&self, video: Video) -> RepositoryResult<Video>;

    async fn get(&self, id: &VideoId) -> RepositoryResult<Option<Video>>;

    /// Replace an existing record.
    async fn update(&self, video: &Video) -> RepositoryResult<()>;

    /// Videos owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> RepositoryResult<Vec<Video>>;

    async fn delete(&self, id: &VideoId) -> RepositoryResult<()>;
}

/// Process-local repository.
#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: RwLock<HashMap<VideoId, Video>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create(&self, video: Video) -> RepositoryResult<Video> {
        self.videos.write().await.insert(video.id, video.clone());
        Ok(video)
    }

    async fn get(&self, id: &VideoId) -> RepositoryResult<Option<Video>> {
        Ok(self.videos.read().await.get(id).cloned())
    }

    async fn update(&self, video: &Video) -> RepositoryResult<()> {
        let mut videos = self.videos.write().await;
        match videos.get_mut(&video.id) {
            Some(existing) => {
                *existing = video.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(video.id)),
        }
    }

    async fn list_for_user(&self, user_id: &UserId) -> RepositoryResult<Vec<Video>> {
        let mut videos: Vec<Video> = self
            .videos
            .read()
            .await
            .values()
            .filter(|v| v.is_owned_by(user_id))
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn delete(&self, id: &VideoId) -> RepositoryResult<()> {
        self.videos
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(*id))
    }
}
