//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tubely_storage::{DEFAULT_PRESIGN_TTL, MAX_PRESIGN_TTL};

/// Hard ceiling on an upload request body (1 GiB).
pub const MAX_UPLOAD_BYTES: usize = 1 << 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max upload request body size
    pub max_upload_bytes: usize,
    /// Directory for staged uploads (OS temp dir when unset)
    pub upload_temp_dir: Option<PathBuf>,
    /// Lifetime of signed playback URLs
    pub presign_ttl: Duration,
    /// Optional bound on each ffprobe/ffmpeg invocation
    pub media_tool_timeout_secs: Option<u64>,
    /// Secret used to validate bearer tokens
    pub jwt_secret: String,
    /// Bucket receiving uploaded videos
    pub s3_bucket: String,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8091,
            cors_origins: vec!["*".to_string()],
            max_upload_bytes: MAX_UPLOAD_BYTES,
            upload_temp_dir: None,
            presign_ttl: DEFAULT_PRESIGN_TTL,
            media_tool_timeout_secs: None,
            jwt_secret: String::new(),
            s3_bucket: String::new(),
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let presign_ttl = match std::env::var("PRESIGN_TTL_SECS") {
            Ok(raw) => parse_presign_ttl(&raw)?,
            Err(_) => defaults.presign_ttl,
        };

        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            upload_temp_dir: std::env::var("UPLOAD_TEMP_DIR").ok().map(PathBuf::from),
            presign_ttl,
            media_tool_timeout_secs: std::env::var("MEDIA_TOOL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
            jwt_secret: std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?,
            s3_bucket: std::env::var("S3_BUCKET").map_err(|_| ConfigError::Missing("S3_BUCKET"))?,
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Directory where uploads are staged.
    pub fn staging_dir(&self) -> PathBuf {
        self.upload_temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Parse a presign TTL in seconds, keeping it to minutes rather than hours.
fn parse_presign_ttl(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::Invalid {
        name: "PRESIGN_TTL_SECS",
        value: raw.to_string(),
    };
    let secs: u64 = raw.trim().parse().map_err(|_| invalid())?;
    let ttl = Duration::from_secs(secs);
    if ttl.is_zero() || ttl > MAX_PRESIGN_TTL {
        return Err(invalid());
    }
    Ok(ttl)
}
