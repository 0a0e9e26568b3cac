//! Sequential page tracking for infinite scroll.
//!
//! Pages load one at a time in order. The feed is exhausted when the
//! server's pagination metadata says so, or, when no metadata came back,
//! when a page arrives shorter than the configured page size.
use crate::models::PageMeta;

#[derive(Debug)]
pub struct FeedPager {
    per_page: i64,
    loaded_page: i64,
    has_more: bool,
    in_flight: bool,
}

impl FeedPager {
    pub fn new(per_page: i64) -> Self {
        Self {
            per_page,
            loaded_page: 0,
            has_more: true,
            in_flight: false,
        }
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Claim the next page to fetch. Returns `None` while a fetch is in
    /// flight or once the feed is exhausted.
    pub fn next_page(&mut self) -> Option<i64> {
        if self.in_flight || !self.has_more {
            return None;
        }
        self.in_flight = true;
        Some(self.loaded_page + 1)
    }

    /// Record a fetched page and decide whether more remain.
    pub fn record_page(&mut self, page: i64, item_count: usize, meta: Option<&PageMeta>) {
        self.in_flight = false;
        self.loaded_page = page;
        self.has_more = match meta {
            Some(meta) => meta.current_page < meta.last_page,
            // No metadata: a full page suggests there is more behind it.
            None => item_count as i64 >= self.per_page,
        };
    }

    /// A failed fetch stops further paging until reset.
    pub fn record_failure(&mut self) {
        self.in_flight = false;
        self.has_more = false;
    }

    pub fn reset(&mut self) {
        self.loaded_page = 0;
        self.has_more = true;
        self.in_flight = false;
    }
}
