//! Resolution of persisted storage references into signed URLs.

use std::time::Duration;
use tracing::warn;

use tubely_models::StorageReference;

use crate::store::ObjectStore;

/// Lifetime of URLs handed to clients.
pub const DEFAULT_PRESIGN_TTL: Duration = Duration::from_secs(5 * 60);

/// Upper bound accepted from configuration.
pub const MAX_PRESIGN_TTL: Duration = Duration::from_secs(60 * 60);

/// Mint a fresh signed URL for a persisted `bucket,key` reference.
///
/// Absent or malformed references, and signing failures, yield `None`: a read
/// must never fail because its playback URL could not be produced.
pub async fn resolve_reference(
    store: &dyn ObjectStore,
    raw: Option<&str>,
    ttl: Duration,
) -> Option<String> {
    let raw = raw?;
    let Some(reference) = StorageReference::parse(raw) else {
        warn!(reference = %raw, "Ignoring malformed storage reference");
        return None;
    };

    match store
        .presign_get(&reference.bucket, &reference.key, ttl)
        .await
    {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(
                bucket = %reference.bucket,
                key = %reference.key,
                "Failed to presign storage reference: {}",
                e
            );
            None
        }
    }
}
