//! Paginated Scanner
//!
//! Turns an offset-based page fetch (`startAt` / `maxResults`) into a lazy
//! stream of items. Pages are fetched strictly one at a time and only once
//! every item of the previous page has been handed to the consumer.

use crate::error::Result;
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use std::future::Future;

/// Largest page Jira will hand out for the endpoints we list
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Position of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanCursor {
    /// `startAt` of the next page request
    pub offset: usize,
    /// `maxResults` sent with every page request
    pub page_size: usize,
    /// Items emitted to the consumer so far
    pub total_consumed: u64,
}

/// One decoded page
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total reported by the API, when the endpoint reports one
    pub total: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, total: None }
    }

    pub fn with_total(items: Vec<T>, total: u64) -> Self {
        Self {
            items,
            total: Some(total),
        }
    }
}

/// Page size actually requested: the configured size, reduced to the row
/// limit when the limit is smaller.
pub fn effective_page_size(page_size: usize, limit: Option<u64>) -> usize {
    let page_size = page_size.max(1);
    match limit {
        Some(limit) if limit < page_size as u64 => limit as usize,
        _ => page_size,
    }
}

struct ScanState<T, F> {
    fetch: F,
    cursor: ScanCursor,
    limit: Option<u64>,
    buffer: VecDeque<T>,
    exhausted: bool,
}

impl<T, F> ScanState<T, F> {
    fn limit_reached(&self) -> bool {
        self.limit
            .is_some_and(|limit| self.cursor.total_consumed >= limit)
    }

    fn absorb(&mut self, page: Page<T>) {
        let returned = page.items.len();
        self.cursor.offset += returned;

        // Endpoints that report a total may cap maxResults below what we ask
        // for, so the total decides there. Otherwise a short page is the last.
        self.exhausted = returned == 0
            || match page.total {
                Some(total) => self.cursor.offset as u64 >= total,
                None => returned < self.cursor.page_size,
            };

        self.buffer.extend(page.items);
    }
}

/// Scan an offset-paginated endpoint.
///
/// `fetch` is called with the cursor of each page to request. The returned
/// stream yields items in API order, stops after `limit` items, and ends
/// after the first error (items already yielded stay yielded).
pub fn paginate<T, F, Fut>(
    page_size: usize,
    limit: Option<u64>,
    fetch: F,
) -> impl Stream<Item = Result<T>>
where
    F: FnMut(ScanCursor) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let state = ScanState {
        fetch,
        cursor: ScanCursor {
            offset: 0,
            page_size: effective_page_size(page_size, limit),
            total_consumed: 0,
        },
        limit,
        buffer: VecDeque::new(),
        exhausted: false,
    };

    stream::try_unfold(state, |mut state| async move {
        loop {
            if state.limit_reached() {
                tracing::debug!(
                    "Row limit reached after {} items",
                    state.cursor.total_consumed
                );
                return Ok(None);
            }

            if let Some(item) = state.buffer.pop_front() {
                state.cursor.total_consumed += 1;
                return Ok(Some((item, state)));
            }

            if state.exhausted {
                return Ok(None);
            }

            let cursor = state.cursor;
            let page = (state.fetch)(cursor).await.map_err(|e| {
                tracing::warn!(
                    "Page request at offset {} (size {}) failed: {}",
                    cursor.offset,
                    cursor.page_size,
                    e
                );
                e
            })?;
            tracing::debug!(
                "Fetched {} items at offset {} (total: {:?})",
                page.items.len(),
                cursor.offset,
                page.total
            );
            state.absorb(page);
        }
    })
}
