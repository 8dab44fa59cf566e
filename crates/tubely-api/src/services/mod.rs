//! Business logic services.

pub mod staging;
pub mod upload;
pub mod video_repo;
pub mod videos;

pub use upload::{UploadError, UploadPipeline, UploadStage};
pub use video_repo::{InMemoryVideoRepository, RepositoryError, RepositoryResult, VideoRepository};
pub use videos::VideoResponse;
