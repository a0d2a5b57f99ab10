use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{EntryRow, RosterEntry};
use crate::error::Result;
use crate::storage::EntrySource;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Fetches one page of roster rows as a plain range query and joins cohort
/// names in a secondary batch lookup. A failed lookup never aborts the
/// page; the rows are returned unenriched.
pub struct PageFetcher {
    source: Arc<dyn EntrySource>,
    page_size: usize,
}

impl PageFetcher {
    pub fn new(source: Arc<dyn EntrySource>, page_size: usize) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Inclusive row range covered by a 0-based page index.
    pub fn page_range(&self, page: usize) -> (usize, usize) {
        let from = page * self.page_size;
        (from, from + self.page_size - 1)
    }

    pub async fn fetch_page(&self, page: usize) -> Result<Vec<RosterEntry>> {
        let (from, to) = self.page_range(page);
        let rows = self.source.fetch_range(from, to).await?;
        let cohorts = self.cohort_names(page, &rows).await;

        Ok(rows
            .into_iter()
            .map(|row| {
                let cohort = row.cohort_id.and_then(|id| cohorts.get(&id).cloned());
                RosterEntry::from_row(row, cohort)
            })
            .collect())
    }

    async fn cohort_names(&self, page: usize, rows: &[EntryRow]) -> HashMap<i64, String> {
        let mut ids: Vec<i64> = rows.iter().filter_map(|row| row.cohort_id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return HashMap::new();
        }

        match self.source.fetch_cohorts(&ids).await {
            Ok(names) => names,
            Err(err) => {
                tracing::warn!(page, %err, "cohort lookup failed, returning unenriched rows");
                HashMap::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::error::Error;

    struct StubSource {
        rows: Vec<EntryRow>,
        fail_range: bool,
        fail_cohorts: AtomicBool,
        cohort_calls: AtomicUsize,
    }

    impl StubSource {
        fn new(rows: Vec<EntryRow>) -> Self {
            Self {
                rows,
                fail_range: false,
                fail_cohorts: AtomicBool::new(false),
                cohort_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EntrySource for StubSource {
        async fn fetch_range(&self, from: usize, to: usize) -> Result<Vec<EntryRow>> {
            if self.fail_range {
                return Err(Error::RangeRejected {
                    from,
                    to,
                    status: 500,
                });
            }
            let end = (to + 1).min(self.rows.len());
            Ok(self.rows.get(from..end).unwrap_or_default().to_vec())
        }

        async fn fetch_cohorts(&self, ids: &[i64]) -> Result<HashMap<i64, String>> {
            self.cohort_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_cohorts.load(Ordering::SeqCst) {
                return Err(Error::LookupRejected { status: 500 });
            }
            Ok(ids.iter().map(|&id| (id, format!("Cohort {id}"))).collect())
        }
    }

    fn row(id: i64, cohort_id: Option<i64>) -> EntryRow {
        EntryRow {
            id,
            full_name: format!("Entry {id}"),
            image_path: None,
            cohort_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_page_range_math() {
        let fetcher = PageFetcher::new(Arc::new(StubSource::new(vec![])), 10);
        assert_eq!(fetcher.page_range(0), (0, 9));
        assert_eq!(fetcher.page_range(1), (10, 19));
        assert_eq!(fetcher.page_range(3), (30, 39));
    }

    #[test]
    fn test_page_size_floor_is_one() {
        let fetcher = PageFetcher::new(Arc::new(StubSource::new(vec![])), 0);
        assert_eq!(fetcher.page_size(), 1);
    }

    #[tokio::test]
    async fn test_fetch_page_joins_cohort_names() {
        let source = StubSource::new(vec![row(1, Some(3)), row(2, None), row(3, Some(3))]);
        let fetcher = PageFetcher::new(Arc::new(source), 10);

        let entries = fetcher.fetch_page(0).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].cohort.as_deref(), Some("Cohort 3"));
        assert_eq!(entries[1].cohort, None);
        assert_eq!(entries[2].cohort.as_deref(), Some("Cohort 3"));
    }

    #[tokio::test]
    async fn test_no_cohort_ids_skips_lookup() {
        let source = Arc::new(StubSource::new(vec![row(1, None), row(2, None)]));
        let fetcher = PageFetcher::new(source.clone(), 10);

        fetcher.fetch_page(0).await.unwrap();
        assert_eq!(source.cohort_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cohort_failure_keeps_the_page() {
        let source = StubSource::new(vec![row(1, Some(5)), row(2, Some(5))]);
        source.fail_cohorts.store(true, Ordering::SeqCst);
        let fetcher = PageFetcher::new(Arc::new(source), 10);

        let entries = fetcher.fetch_page(0).await.unwrap();
        assert_eq!(entries.len(), 2, "enrichment failure must not abort the page");
        assert!(entries.iter().all(|e| e.cohort.is_none()));
    }

    #[tokio::test]
    async fn test_range_failure_propagates() {
        let mut source = StubSource::new(vec![row(1, None)]);
        source.fail_range = true;
        let fetcher = PageFetcher::new(Arc::new(source), 10);

        assert!(fetcher.fetch_page(0).await.is_err());
    }
}
