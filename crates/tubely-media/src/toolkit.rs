//! Capability seam over the external media tools.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::command::{check_ffmpeg, check_ffprobe, FfmpegRunner};
use crate::error::MediaResult;
use crate::faststart::faststart;
use crate::probe::{probe_video, VideoGeometry};

/// Media operations the upload pipeline needs.
///
/// Implemented by [`FfmpegToolkit`] in production; tests substitute fakes.
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Read the geometry of the first video stream in `path`.
    async fn probe(&self, path: &Path) -> MediaResult<VideoGeometry>;

    /// Remux `path` for fast start, returning the new file's path.
    async fn faststart(&self, path: &Path) -> MediaResult<PathBuf>;
}

/// `MediaToolkit` backed by the `ffprobe` and `ffmpeg` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    ffprobe: PathBuf,
    runner: FfmpegRunner,
    timeout_secs: Option<u64>,
}

impl FfmpegToolkit {
    /// Locate both binaries on `PATH`.
    pub fn locate() -> MediaResult<Self> {
        let ffmpeg = check_ffmpeg()?;
        let ffprobe = check_ffprobe()?;
        info!(
            ffmpeg = %ffmpeg.display(),
            ffprobe = %ffprobe.display(),
            "Located media tools"
        );
        Ok(Self::with_binaries(ffmpeg, ffprobe))
    }

    /// Use explicit binary paths.
    pub fn with_binaries(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            runner: FfmpegRunner::new().with_program(ffmpeg),
            timeout_secs: None,
        }
    }

    /// Bound each tool invocation. Off by default.
    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self.runner = self.runner.with_timeout(secs);
        self
    }
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    async fn probe(&self, path: &Path) -> MediaResult<VideoGeometry> {
        probe_video(&self.ffprobe, path, self.timeout_secs).await
    }

    async fn faststart(&self, path: &Path) -> MediaResult<PathBuf> {
        faststart(&self.runner, path).await
    }
}
