pub mod broken;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod merge;
pub mod placeholder;
pub mod resolver;
pub mod storage;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use broken::BrokenImages;
use domain::{Resolution, RosterEntry};
use error::{Error, Result};
use fetcher::PageFetcher;
use resolver::PhotoResolver;
use storage::{EntrySource, ObjectStorage};

pub use fetcher::DEFAULT_PAGE_SIZE;

/// Outcome of a load trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and merged; carries the number of newly appended
    /// entries (may be lower than the row count when ids were already
    /// present).
    Loaded(usize),
    /// Another fetch is in flight; the trigger was ignored.
    InFlight,
    /// The feed is exhausted; no request was made.
    Exhausted,
    /// The fetch completed after a reset advanced the generation and its
    /// result was discarded.
    Stale,
}

/// Incrementally loaded, deduplicated, order-preserving roster list with
/// resilient photo resolution.
///
/// The main entry point for the rosterfeed library. Cheap to clone; clones
/// share state, so the in-flight guard also collapses triggers coming from
/// different handles.
#[derive(Clone)]
pub struct Feed {
    inner: Arc<FeedInner>,
}

struct FeedInner {
    fetcher: PageFetcher,
    resolver: PhotoResolver,
    detail_resolver: PhotoResolver,
    broken: BrokenImages,
    state: Mutex<FeedState>,
    /// Single in-flight guard shared by the explicit and sentinel triggers.
    in_flight: tokio::sync::Mutex<()>,
    /// Bumped by `reset`; a fetch started under an older value is discarded
    /// when it lands.
    generation: AtomicU64,
}

#[derive(Debug)]
struct FeedState {
    /// 0-based index of the next page to fetch.
    next_page: usize,
    has_more: bool,
    entries: Vec<RosterEntry>,
}

impl Feed {
    pub fn new(
        source: Arc<dyn EntrySource>,
        storage: Arc<dyn ObjectStorage>,
        page_size: usize,
    ) -> Self {
        Self {
            inner: Arc::new(FeedInner {
                fetcher: PageFetcher::new(source, page_size),
                resolver: PhotoResolver::for_list(storage.clone()),
                detail_resolver: PhotoResolver::for_detail(storage),
                broken: BrokenImages::new(),
                state: Mutex::new(FeedState {
                    next_page: 0,
                    has_more: true,
                    entries: Vec::new(),
                }),
                in_flight: tokio::sync::Mutex::new(()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ── Read surface ─────────────────────────────────────────────────

    /// Snapshot of the merged list, in arrival order.
    pub fn items(&self) -> Vec<RosterEntry> {
        self.state().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.state().has_more
    }

    pub fn is_loading(&self) -> bool {
        self.inner.in_flight.try_lock().is_err()
    }

    /// URL to render for an entry: the cached resolution, unless the UI has
    /// since reported the image broken — broken wins.
    pub fn photo_url(&self, id: i64) -> Option<String> {
        if self.inner.broken.is_broken(id) {
            return None;
        }
        self.state()
            .entries
            .iter()
            .find(|entry| entry.id == id)
            .and_then(|entry| entry.photo.url.clone())
    }

    // ── Load triggers ────────────────────────────────────────────────

    /// Explicit "load more" trigger. A no-op while a fetch is in flight or
    /// once the feed is exhausted; on failure the pagination state is left
    /// untouched so a retry re-attempts the same page.
    pub async fn load_more(&self) -> Result<LoadOutcome> {
        let Ok(_permit) = self.inner.in_flight.try_lock() else {
            return Ok(LoadOutcome::InFlight);
        };
        self.fetch_next(false).await
    }

    /// Automatic trigger for a viewport sentinel scrolling into view.
    /// Funnelled through the same guard as `load_more`, so a sentinel firing
    /// during a fetch costs nothing.
    pub async fn sentinel_visible(&self) -> Result<LoadOutcome> {
        self.load_more().await
    }

    /// Drop the current list and refetch page 0, e.g. after creating a
    /// record. The new generation replaces the item set; a fetch still in
    /// flight from before the reset is discarded when it lands.
    pub async fn reset(&self) -> Result<LoadOutcome> {
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        let _permit = self.inner.in_flight.lock().await;
        {
            let mut state = self.state();
            state.next_page = 0;
            state.has_more = true;
        }
        self.fetch_next(true).await
    }

    async fn fetch_next(&self, replace: bool) -> Result<LoadOutcome> {
        let (page, has_more) = {
            let state = self.state();
            (state.next_page, state.has_more)
        };
        if !has_more {
            return Ok(LoadOutcome::Exhausted);
        }

        let generation = self.inner.generation.load(Ordering::Acquire);
        let mut fetched = self.inner.fetcher.fetch_page(page).await?;
        self.inner.resolver.resolve_page(&mut fetched).await;
        let row_count = fetched.len();

        let mut state = self.state();
        if self.inner.generation.load(Ordering::Acquire) != generation {
            tracing::debug!(page, "discarding stale page from a superseded generation");
            return Ok(LoadOutcome::Stale);
        }

        let appended = if replace {
            state.entries = fetched;
            state.entries.len()
        } else {
            let prev = std::mem::take(&mut state.entries);
            let before = prev.len();
            state.entries = merge::merge(prev, fetched);
            state.entries.len() - before
        };
        state.next_page = page + 1;
        state.has_more = row_count == self.inner.fetcher.page_size();
        tracing::debug!(page, appended, has_more = state.has_more, "page merged");
        Ok(LoadOutcome::Loaded(appended))
    }

    // ── Render-time image events ─────────────────────────────────────

    /// Wire to the image element's native error event.
    pub fn on_image_error(&self, id: i64) {
        self.inner.broken.mark_broken(id);
    }

    /// Wire to the image element's native load event.
    pub fn on_image_load(&self, id: i64) {
        self.inner.broken.mark_ok(id);
    }

    pub fn is_broken(&self, id: i64) -> bool {
        self.inner.broken.is_broken(id)
    }

    // ── Re-resolution (edit flow) ────────────────────────────────────

    /// Re-resolve one entry's photo with the long detail-view TTL and
    /// replace the cached resolution. A fresh URL also clears a stale
    /// broken flag so the photo renders again.
    pub async fn refresh_photo(&self, id: i64) -> Result<Resolution> {
        let image_path = self
            .state()
            .entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.image_path.clone())
            .ok_or(Error::EntryNotFound(id))?;

        let resolution = self.inner.detail_resolver.resolve(image_path.as_deref()).await;

        let mut state = self.state();
        if let Some(entry) = state.entries.iter_mut().find(|entry| entry.id == id) {
            entry.photo = resolution.clone();
        }
        drop(state);
        if resolution.is_resolved() {
            self.inner.broken.mark_ok(id);
        }
        Ok(resolution)
    }
}
