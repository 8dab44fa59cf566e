//! Fast-start remuxing.
//!
//! Rewrites an MP4 so the `moov` atom sits before the media samples, letting
//! players start before the whole file has downloaded. Streams are copied, not
//! re-encoded.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Suffix appended to the input path for the remuxed output.
pub const PROCESSING_SUFFIX: &str = ".processing";

/// Output path for a fast-start remux of `input`.
pub fn faststart_output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(PROCESSING_SUFFIX);
    PathBuf::from(name)
}

/// Remux `input` for fast start, returning the path of the new file.
///
/// The output is removed if the remux fails or the returned future is
/// dropped before it completes; on success it belongs to the caller.
pub async fn faststart(runner: &FfmpegRunner, input: impl AsRef<Path>) -> MediaResult<PathBuf> {
    let input = input.as_ref();
    let output = TempPath::from_path(faststart_output_path(input));

    let cmd = FfmpegCommand::new(input, &output)
        .copy_streams()
        .movflags("faststart")
        .format("mp4")
        .log_level("error");

    if let Err(e) = runner.run(&cmd).await {
        let path = output.to_path_buf();
        if let Err(cleanup) = output.close() {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Failed to remove partial fast-start output {}: {}",
                    path.display(),
                    cleanup
                );
            }
        }
        return Err(e);
    }

    info!("Remuxed {} for fast start", input.display());
    output.keep().map_err(|e| MediaError::Io(e.error))
}
