use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a displayable photo URL was obtained, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    /// The deterministic public URL passed the byte-range probe.
    Public,
    /// A time-limited signed URL was issued by the storage service.
    Signed,
    /// Every strategy failed (or there was no image path); render a placeholder.
    None,
}

/// Outcome of resolving one stored image reference.
/// Total by construction: `url` is `Some` exactly when `method` is not `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub url: Option<String>,
    pub method: ResolutionMethod,
}

impl Resolution {
    pub fn public(url: String) -> Self {
        Self {
            url: Some(url),
            method: ResolutionMethod::Public,
        }
    }

    pub fn signed(url: String) -> Self {
        Self {
            url: Some(url),
            method: ResolutionMethod::Signed,
        }
    }

    pub fn none() -> Self {
        Self {
            url: None,
            method: ResolutionMethod::None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.url.is_some()
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::none()
    }
}

/// One raw roster row as returned by the data source, before photo
/// resolution and cohort enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRow {
    pub id: i64,
    pub full_name: String,
    /// Opaque storage key of the entry's photo, e.g. `"p/123.jpg"`.
    pub image_path: Option<String>,
    pub cohort_id: Option<i64>,
    /// Stable pagination sort key (descending).
    pub created_at: DateTime<Utc>,
}

/// A fully assembled roster entry as held by the feed.
/// Immutable once merged, except `photo` which a later re-resolution
/// (e.g. the edit flow) may replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: i64,
    pub full_name: String,
    /// Denormalized cohort name from the secondary lookup; `None` when the
    /// row has no cohort or the enrichment batch failed.
    pub cohort: Option<String>,
    pub image_path: Option<String>,
    pub photo: Resolution,
    pub created_at: DateTime<Utc>,
}

impl RosterEntry {
    pub fn from_row(row: EntryRow, cohort: Option<String>) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            cohort,
            image_path: row.image_path,
            photo: Resolution::none(),
            created_at: row.created_at,
        }
    }
}
