//! FFprobe stream geometry.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use tubely_models::AspectClass;

use crate::command::{run_tool, stderr_tail};
use crate::error::{MediaError, MediaResult};

/// Frame size of the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoGeometry {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl VideoGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_class(&self) -> AspectClass {
        AspectClass::classify(self.width, self.height)
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Probe a video file for its stream geometry.
pub async fn probe_video(
    ffprobe: impl AsRef<Path>,
    path: impl AsRef<Path>,
    timeout_secs: Option<u64>,
) -> MediaResult<VideoGeometry> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let mut command = Command::new(ffprobe.as_ref());
    command
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(path);

    let output = run_tool(command, timeout_secs).await.map_err(|e| match e {
        MediaError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            MediaError::FfprobeNotFound
        }
        other => other,
    })?;

    if !output.status.success() {
        return Err(MediaError::ffprobe_failed(
            "FFprobe exited with non-zero status",
            stderr_tail(&output.stderr),
            output.status.code(),
        ));
    }

    let geometry = parse_geometry(&output.stdout)?;
    debug!(
        path = %path.display(),
        width = geometry.width,
        height = geometry.height,
        "Probed video geometry"
    );
    Ok(geometry)
}

/// Extract the first video stream's geometry from `-show_streams` JSON.
pub(crate) fn parse_geometry(stdout: &[u8]) -> MediaResult<VideoGeometry> {
    let probe: FfprobeOutput =
        serde_json::from_slice(stdout).map_err(MediaError::MalformedProbeOutput)?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or(MediaError::NoVideoStream)?;

    // Missing dimensions read as zero, and 0x0 classifies as landscape.
    Ok(VideoGeometry {
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
    })
}
