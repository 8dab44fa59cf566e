#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for upload processing.
//!
//! This crate provides:
//! - FFprobe stream geometry inspection
//! - Fast-start remuxing (moov atom relocated to the front, streams copied)
//! - Type-safe FFmpeg command building
//! - The `MediaToolkit` seam the upload pipeline depends on

pub mod command;
pub mod error;
pub mod faststart;
pub mod probe;
pub mod toolkit;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use faststart::{faststart, faststart_output_path, PROCESSING_SUFFIX};
pub use probe::{probe_video, VideoGeometry};
pub use toolkit::{FfmpegToolkit, MediaToolkit};
