//! Offset pagination with stop conditions.
//!
//! The deals and bots endpoints page by `offset`/`limit` with no cursor,
//! and the remote may serve overlapping pages under concurrent writes.
//! Fetching therefore accepts at-least-once delivery per record and relies
//! on downstream idempotent upserts; the fetcher itself only guarantees
//! termination: a short page, a satisfied stop predicate, or the hard
//! offset ceiling (a fatal error, not a retry).

use crate::error::{Result, ThreeCommasError};
use std::future::Future;

/// One page request handed to the fetch callback.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u64,
}

/// Offset-paging driver.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: u32,
    offset_ceiling: u64,
}

impl Paginator {
    /// Creates a paginator. A zero page size is clamped to one so the
    /// offset always advances.
    #[must_use]
    pub fn new(page_size: u32, offset_ceiling: u64) -> Self {
        Self {
            page_size: page_size.max(1),
            offset_ceiling,
        }
    }

    /// Fetches pages at increasing offsets until exhaustion or stop.
    ///
    /// Pages are requested strictly in order; each page is appended to the
    /// result before the next request, so callers relying on first-page
    /// ordering (watermark capture) see records exactly as fetched.
    /// Stops when a page comes back shorter than the page size (remote
    /// exhausted) or when `stop` returns true for a page (records from
    /// that page are still included).
    ///
    /// # Errors
    ///
    /// Propagates fetch errors unchanged, and returns
    /// [`ThreeCommasError::PaginationRunaway`] if the offset reaches the
    /// ceiling with neither stop condition satisfied.
    pub async fn fetch_all<T, F, Fut, P>(&self, mut fetch_page: F, mut stop: P) -> Result<Vec<T>>
    where
        F: FnMut(PageRequest) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
        P: FnMut(&[T]) -> bool,
    {
        let mut records = Vec::new();
        let mut offset = 0u64;

        loop {
            let page = fetch_page(PageRequest {
                limit: self.page_size,
                offset,
            })
            .await?;

            let page_len = page.len();
            let stop_hit = stop(&page);
            records.extend(page);

            if page_len < self.page_size as usize || stop_hit {
                return Ok(records);
            }

            offset += u64::from(self.page_size);
            if offset >= self.offset_ceiling {
                return Err(ThreeCommasError::pagination_runaway(
                    offset,
                    self.offset_ceiling,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn page_of(len: usize, offset: u64) -> Vec<u64> {
        (offset..offset + len as u64).collect()
    }

    #[tokio::test]
    async fn stops_after_short_page_without_extra_request() {
        let calls = AtomicUsize::new(0);
        let paginator = Paginator::new(100, 1_000_000);

        let records = paginator
            .fetch_all(
                |req| {
                    let call = calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        // Two full pages, then a short page of 37.
                        let len = if call < 2 { 100 } else { 37 };
                        Ok(page_of(len, req.offset))
                    }
                },
                |_page: &[u64]| false,
            )
            .await
            .expect("fetch");

        assert_eq!(records.len(), 237);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stop_predicate_halts_but_keeps_the_page() {
        let paginator = Paginator::new(10, 1_000_000);

        let records = paginator
            .fetch_all(
                |req| async move { Ok(page_of(10, req.offset)) },
                // Stop once the page contains a record past the watermark.
                |page: &[u64]| page.iter().any(|&r| r >= 25),
            )
            .await
            .expect("fetch");

        // Pages 0..10, 10..20, 20..30: third page triggers the stop and is
        // still included.
        assert_eq!(records.len(), 30);
    }

    #[tokio::test]
    async fn offset_ceiling_is_a_distinct_fatal_error() {
        let paginator = Paginator::new(10, 30);

        let err = paginator
            .fetch_all(
                |req| async move { Ok(page_of(10, req.offset)) },
                |_page: &[u64]| false,
            )
            .await
            .expect_err("runaway");

        assert!(matches!(
            err,
            ThreeCommasError::PaginationRunaway {
                offset: 30,
                ceiling: 30
            }
        ));
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let paginator = Paginator::new(10, 100);

        let err = paginator
            .fetch_all(
                |_req| async move { Err::<Vec<u64>, _>(ThreeCommasError::api(502, "bad gateway")) },
                |_page: &[u64]| false,
            )
            .await
            .expect_err("fetch error");

        assert!(matches!(err, ThreeCommasError::Api { .. }));
    }

    #[tokio::test]
    async fn empty_first_page_yields_no_records() {
        let paginator = Paginator::new(10, 100);
        let records = paginator
            .fetch_all(
                |_req| async move { Ok(Vec::<u64>::new()) },
                |_page: &[u64]| false,
            )
            .await
            .expect("fetch");
        assert!(records.is_empty());
    }
}
