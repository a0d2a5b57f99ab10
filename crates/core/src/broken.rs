use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Render-time broken-image ledger, keyed by entry id.
///
/// Entries are added only by an actual failed image load reported by the UI
/// (never by the resolver's probing) and removed when the same id later
/// loads successfully. The set survives across pages; it is owned by the
/// feed and reset together with it, not process-global.
#[derive(Debug, Default)]
pub struct BrokenImages {
    ids: Mutex<HashSet<i64>>,
}

impl BrokenImages {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<i64>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The UI reported a load error for this entry's image.
    pub fn mark_broken(&self, id: i64) {
        if self.lock().insert(id) {
            tracing::debug!(id, "image reported broken at render time");
        }
    }

    /// The UI reported a successful load; clears a previous broken flag.
    pub fn mark_ok(&self, id: i64) {
        self.lock().remove(&id);
    }

    /// Broken wins over any cached resolved URL when rendering.
    pub fn is_broken(&self, id: i64) -> bool {
        self.lock().contains(&id)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
