pub mod http;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::EntryRow;
use crate::error::Result;

/// What a byte-range probe learned about a candidate URL.
/// A transport-level failure (DNS, CORS, refused connection) surfaces as an
/// `Err` from [`ObjectStorage::probe`] instead; both are treated the same by
/// the resolver.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Response had a success status.
    pub ok: bool,
    pub content_type: Option<String>,
}

impl ProbeReport {
    /// The probe rule: success status AND an image content-type.
    /// A missing content-type header does not count as an image.
    pub fn looks_like_image(&self) -> bool {
        self.ok
            && self
                .content_type
                .as_deref()
                .is_some_and(|ct| ct.starts_with("image/"))
    }
}

/// Object-storage capabilities of the backend.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Deterministic public URL for a storage key. Pure string derivation,
    /// no network call.
    fn public_url(&self, path: &str) -> String;

    /// Issue a time-limited signed URL for an otherwise-private object.
    async fn sign_url(&self, path: &str, ttl: Duration) -> Result<String>;

    /// Fetch only the first byte of `url` to check reachability and type.
    async fn probe(&self, url: &str) -> Result<ProbeReport>;
}

/// Paginated roster rows plus the secondary cohort lookup.
#[async_trait]
pub trait EntrySource: Send + Sync {
    /// Range query over the stable creation-time-descending ordering.
    /// `from` and `to` are inclusive row offsets.
    async fn fetch_range(&self, from: usize, to: usize) -> Result<Vec<EntryRow>>;

    /// Batch lookup of cohort names by id.
    async fn fetch_cohorts(&self, ids: &[i64]) -> Result<HashMap<i64, String>>;
}
