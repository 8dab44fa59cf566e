//! Upload staging: body capping and temp-file lifetimes.

use std::error::Error as StdError;
use std::io::SeekFrom;
use std::path::Path;

use axum::body::Body;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use http_body_util::{LengthLimitError, Limited};
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::debug;

/// Prefix of staged upload files.
const STAGED_PREFIX: &str = "tubely-upload";

/// Wrap a request body so reading past `limit` bytes fails.
///
/// Nothing is buffered; the error surfaces on the read that crosses the limit.
pub fn cap_body(body: Body, limit: usize) -> Body {
    Body::new(Limited::new(body, limit))
}

/// Whether a multipart failure was caused by the body ceiling.
pub fn is_payload_too_large(err: &MultipartError) -> bool {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return true;
    }

    let mut source: Option<&(dyn StdError + 'static)> = err.source();
    while let Some(e) = source {
        if e.downcast_ref::<LengthLimitError>().is_some() {
            return true;
        }
        source = e.source();
    }
    false
}

/// An uploaded part copied to local disk.
///
/// The file is removed when this value is dropped.
pub struct StagedFile {
    file: File,
    path: TempPath,
    size: u64,
}

impl StagedFile {
    /// Create an empty staged file in `dir`.
    pub async fn create(dir: &Path, suffix: &str) -> std::io::Result<Self> {
        let named = tempfile::Builder::new()
            .prefix(STAGED_PREFIX)
            .suffix(suffix)
            .tempfile_in(dir)?;
        let (file, path) = named.into_parts();

        Ok(Self {
            file: File::from_std(file),
            path,
            size: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.file.write_all(chunk).await?;
        self.size += chunk.len() as u64;
        Ok(())
    }

    /// Flush buffered writes and rewind to the start of the file.
    pub async fn finish(&mut self) -> std::io::Result<()> {
        self.file.flush().await?;
        self.file.sync_data().await?;
        self.file.seek(SeekFrom::Start(0)).await?;
        debug!(path = %self.path.display(), size = self.size, "Staged upload");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Failure while copying a multipart field to disk.
#[derive(Debug)]
pub enum StageFieldError {
    Multipart(MultipartError),
    Io(std::io::Error),
}

/// Copy a multipart field into a fresh staged file under `dir`.
pub async fn stage_field(
    field: &mut Field<'_>,
    dir: &Path,
    suffix: &str,
) -> Result<StagedFile, StageFieldError> {
    let mut staged = StagedFile::create(dir, suffix)
        .await
        .map_err(StageFieldError::Io)?;

    while let Some(chunk) = field.chunk().await.map_err(StageFieldError::Multipart)? {
        staged
            .write_chunk(&chunk)
            .await
            .map_err(StageFieldError::Io)?;
    }

    staged.finish().await.map_err(StageFieldError::Io)?;
    Ok(staged)
}
