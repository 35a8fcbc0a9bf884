//! List state for the product table: current page, page size, displayed rows.
//!
//! `refresh` is the only path that talks to the server. Every other
//! operation adjusts the requested page or size and then delegates to it.
//! Refreshes may overlap; each one takes a request token and only the
//! response for the most recently issued token is applied.

use std::sync::Arc;

use shared::domain::{total_pages, Page, Product};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{CatalogEvent, ClientError, ClientResult, Notice, ProductApi, RetryPolicy};

pub const DEFAULT_PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    pub page_index: u32,
    pub page_size: u32,
    pub items: Vec<Product>,
    pub total_elements: u64,
    pub is_loading: bool,
}

impl ListState {
    fn new(page_size: u32) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
            items: Vec::new(),
            total_elements: 0,
            is_loading: false,
        }
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_elements, self.page_size)
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.page_index.saturating_add(1) < self.total_pages()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetched page replaced the displayed one.
    Applied,
    /// The fetch failed; rows were cleared and a notice was emitted.
    Failed,
    /// A newer refresh was issued while this one was in flight.
    Stale,
    /// Nothing to do: the requested page is already the current one.
    Unchanged,
}

struct ControllerState {
    list: ListState,
    latest_token: u64,
}

pub struct PageController {
    api: Arc<dyn ProductApi>,
    retry: RetryPolicy,
    events: broadcast::Sender<CatalogEvent>,
    inner: Mutex<ControllerState>,
}

impl PageController {
    pub fn new(
        api: Arc<dyn ProductApi>,
        page_size: u32,
        retry: RetryPolicy,
        events: broadcast::Sender<CatalogEvent>,
    ) -> Self {
        Self {
            api,
            retry,
            events,
            inner: Mutex::new(ControllerState {
                list: ListState::new(page_size),
                latest_token: 0,
            }),
        }
    }

    pub async fn snapshot(&self) -> ListState {
        self.inner.lock().await.list.clone()
    }

    pub async fn total_pages(&self) -> u32 {
        self.inner.lock().await.list.total_pages()
    }

    pub async fn has_next(&self) -> bool {
        self.inner.lock().await.list.has_next()
    }

    pub async fn has_previous(&self) -> bool {
        self.inner.lock().await.list.has_previous()
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        let (token, page_index, page_size) = {
            let mut guard = self.inner.lock().await;
            guard.latest_token += 1;
            guard.list.is_loading = true;
            (
                guard.latest_token,
                guard.list.page_index,
                guard.list.page_size,
            )
        };

        let result = self.fetch_with_retry(page_index, page_size).await;

        let mut guard = self.inner.lock().await;
        if token != guard.latest_token {
            debug!(
                token,
                latest = guard.latest_token,
                page_index,
                "discarding stale page response"
            );
            return RefreshOutcome::Stale;
        }
        guard.list.is_loading = false;

        match result {
            Ok(page) => {
                let total_pages = page.total_pages();
                info!(
                    page_index,
                    page_size,
                    rows = page.content.len(),
                    total_elements = page.total_elements,
                    "product page loaded"
                );
                guard.list.items = page.content;
                guard.list.total_elements = page.total_elements;
                drop(guard);
                let _ = self.events.send(CatalogEvent::PageLoaded {
                    page_index,
                    total_pages,
                    total_elements: page.total_elements,
                });
                RefreshOutcome::Applied
            }
            Err(err) => {
                warn!(page_index, page_size, error = %err, "failed to fetch products");
                guard.list.items.clear();
                guard.list.total_elements = 0;
                drop(guard);
                let _ = self
                    .events
                    .send(CatalogEvent::Notice(Notice::failure("Failed to fetch products", &err)));
                RefreshOutcome::Failed
            }
        }
    }

    /// Moves to page `n`, clamped to the known page range.
    pub async fn set_page(&self, n: i64) -> RefreshOutcome {
        {
            let mut guard = self.inner.lock().await;
            let last = i64::from(guard.list.total_pages()) - 1;
            let target = u32::try_from(n.clamp(0, last)).unwrap_or(0);
            if target == guard.list.page_index {
                return RefreshOutcome::Unchanged;
            }
            guard.list.page_index = target;
        }
        self.refresh().await
    }

    /// Loads page `n` before the page range is known.
    ///
    /// Fetches `n` directly; only when the response shows it lies past the
    /// last page is a second fetch issued for the last page.
    pub async fn open_page(&self, n: i64) -> RefreshOutcome {
        let target = u32::try_from(n.max(0)).unwrap_or(u32::MAX);
        self.inner.lock().await.list.page_index = target;
        let outcome = self.refresh().await;
        if outcome != RefreshOutcome::Applied {
            return outcome;
        }
        let last = {
            let mut guard = self.inner.lock().await;
            let last = guard.list.total_pages() - 1;
            if guard.list.page_index <= last {
                return outcome;
            }
            guard.list.page_index = last;
            last
        };
        debug!(requested = target, last, "requested page past the end; loading last page");
        self.refresh().await
    }

    pub async fn next_page(&self) -> RefreshOutcome {
        let current = self.inner.lock().await.list.page_index;
        self.set_page(i64::from(current) + 1).await
    }

    pub async fn previous_page(&self) -> RefreshOutcome {
        let current = self.inner.lock().await.list.page_index;
        self.set_page(i64::from(current) - 1).await
    }

    /// Changes the page size and returns to the first page.
    pub async fn set_page_size(&self, n: u32) -> RefreshOutcome {
        {
            let mut guard = self.inner.lock().await;
            guard.list.page_size = n.max(1);
            guard.list.page_index = 0;
        }
        self.refresh().await
    }

    /// Called after a row on the displayed page was deleted.
    ///
    /// If that row was the only one and this is not the first page, steps
    /// back one page so the table never lands on an empty page.
    pub async fn notify_item_removed(&self) -> RefreshOutcome {
        {
            let mut guard = self.inner.lock().await;
            if guard.list.items.len() <= 1 && guard.list.page_index > 0 {
                guard.list.page_index -= 1;
                debug!(
                    page_index = guard.list.page_index,
                    "page emptied by delete; stepping back"
                );
            }
        }
        self.refresh().await
    }

    async fn fetch_with_retry(&self, page_index: u32, page_size: u32) -> ClientResult<Page> {
        let mut failed_attempts = 0;
        loop {
            match self.api.list_paged(page_index, page_size).await {
                Ok(page) => return Ok(page),
                Err(err) => {
                    failed_attempts += 1;
                    if !should_retry(&err, &self.retry, failed_attempts) {
                        return Err(err);
                    }
                    let delay = self.retry.backoff(failed_attempts);
                    warn!(
                        attempt = failed_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure fetching product page; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn should_retry(err: &ClientError, policy: &RetryPolicy, failed_attempts: u32) -> bool {
    err.is_transient() && policy.allows_another(failed_attempts)
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
