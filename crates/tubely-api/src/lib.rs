//! Axum HTTP API server for video ingestion.
//!
//! This crate provides:
//! - Streaming multipart uploads capped at a fixed ceiling
//! - Probe, fast-start remux and object storage of uploaded videos
//! - Signed playback URLs minted on every read
//! - Bearer token authentication and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{InMemoryVideoRepository, UploadError, UploadPipeline, UploadStage, VideoRepository};
pub use state::AppState;
