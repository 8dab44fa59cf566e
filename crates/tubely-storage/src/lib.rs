//! S3-compatible storage client.
//!
//! This crate provides:
//! - File upload to a bucket/key
//! - Presigned GET URL generation
//! - The `ObjectStore` seam the upload pipeline depends on
//! - Resolution of persisted storage references into signed URLs

pub mod client;
pub mod error;
pub mod resolve;
pub mod store;

pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
pub use resolve::{resolve_reference, DEFAULT_PRESIGN_TTL, MAX_PRESIGN_TTL};
pub use store::ObjectStore;
