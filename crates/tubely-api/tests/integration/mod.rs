//! Router-level tests for the ingestion API.

pub mod api_tests;
pub mod upload_tests;
pub mod videos_tests;
