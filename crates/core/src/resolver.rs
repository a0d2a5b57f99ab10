use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::domain::{Resolution, RosterEntry};
use crate::storage::ObjectStorage;

/// Short TTL for list probing; the URL only has to survive until the row is
/// painted.
pub const LIST_SIGN_TTL: Duration = Duration::from_secs(60);
/// Long TTL for a detail view the user may keep open.
pub const DETAIL_SIGN_TTL: Duration = Duration::from_secs(3600);

/// One tier of the fallback chain. Kept as data so adding or removing a tier
/// is a one-line change and each tier is testable on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Construct the deterministic public URL and byte-range probe it.
    PublicProbe,
    /// Ask the storage service for a time-limited signed URL.
    SignedUrl,
}

/// Resolves a stored image reference into a displayable URL, or degrades to
/// `none` so the caller renders a placeholder. Never fails: every internal
/// error falls through to the next strategy.
pub struct PhotoResolver {
    storage: Arc<dyn ObjectStorage>,
    sign_ttl: Duration,
    chain: Vec<Strategy>,
}

#[derive(Debug, thiserror::Error)]
enum StrategyFailure {
    #[error("probe transport error: {0}")]
    ProbeTransport(String),

    #[error("probe did not look like an image (ok={ok}, content-type={content_type:?})")]
    ProbeRejected {
        ok: bool,
        content_type: Option<String>,
    },

    #[error("signing failed: {0}")]
    Sign(String),
}

impl PhotoResolver {
    pub fn for_list(storage: Arc<dyn ObjectStorage>) -> Self {
        Self::with_sign_ttl(storage, LIST_SIGN_TTL)
    }

    pub fn for_detail(storage: Arc<dyn ObjectStorage>) -> Self {
        Self::with_sign_ttl(storage, DETAIL_SIGN_TTL)
    }

    pub fn with_sign_ttl(storage: Arc<dyn ObjectStorage>, sign_ttl: Duration) -> Self {
        Self {
            storage,
            sign_ttl,
            chain: vec![Strategy::PublicProbe, Strategy::SignedUrl],
        }
    }

    /// Resolve one stored image reference. Total: terminates in exactly one
    /// of public/signed/none for every input, including empty paths.
    pub async fn resolve(&self, image_path: Option<&str>) -> Resolution {
        let Some(path) = image_path.filter(|p| !p.trim().is_empty()) else {
            return Resolution::none();
        };

        for strategy in &self.chain {
            match self.attempt(*strategy, path).await {
                Ok(resolution) => return resolution,
                Err(reason) => {
                    tracing::debug!(path, ?strategy, %reason, "photo strategy failed, falling through");
                }
            }
        }
        Resolution::none()
    }

    async fn attempt(
        &self,
        strategy: Strategy,
        path: &str,
    ) -> std::result::Result<Resolution, StrategyFailure> {
        match strategy {
            Strategy::PublicProbe => {
                let url = self.storage.public_url(path);
                let report = self
                    .storage
                    .probe(&url)
                    .await
                    .map_err(|err| StrategyFailure::ProbeTransport(err.to_string()))?;
                if !report.looks_like_image() {
                    return Err(StrategyFailure::ProbeRejected {
                        ok: report.ok,
                        content_type: report.content_type,
                    });
                }
                Ok(Resolution::public(url))
            }
            Strategy::SignedUrl => {
                let url = self
                    .storage
                    .sign_url(path, self.sign_ttl)
                    .await
                    .map_err(|err| StrategyFailure::Sign(err.to_string()))?;
                Ok(Resolution::signed(url))
            }
        }
    }

    /// Resolve a freshly fetched page, one task per entry. No entry waits on
    /// another, and the page is only ready once every resolution has
    /// settled; one entry degrading to `none` never drops the rest.
    pub async fn resolve_page(&self, entries: &mut [RosterEntry]) {
        let resolutions = join_all(
            entries
                .iter()
                .map(|entry| self.resolve(entry.image_path.as_deref())),
        )
        .await;

        for (entry, resolution) in entries.iter_mut().zip(resolutions) {
            entry.photo = resolution;
        }
    }
}
