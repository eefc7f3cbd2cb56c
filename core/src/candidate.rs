//! Candidate types for phonetic lookup.
//!
//! This module provides:
//! - `Candidate`: A committable string with its table usage count
//! - `CandidateList`: Paginated list with page-relative selection
//! - `CandidateRanker`: Memoized, usage-ordered lookups over a phonetic table

use std::cell::{Cell, RefCell};
use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tables::PhoneticTable;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A single text candidate with the usage count recorded in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub usage_count: u32,
}

impl Candidate {
    pub fn new<T: Into<String>>(text: T, usage_count: u32) -> Self {
        Candidate {
            text: text.into(),
            usage_count,
        }
    }
}

/// A paginated list of candidates.
#[derive(Debug, Clone)]
pub struct CandidateList {
    candidates: Vec<Candidate>,
    page_size: usize,
    /// Current page index (0-based)
    current_page: usize,
}

impl CandidateList {
    /// Create a new empty candidate list.
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create a candidate list with specified page size (at least 1).
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            candidates: Vec::new(),
            page_size: page_size.max(1),
            current_page: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace the candidates. Always returns to the first page.
    pub fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
        self.current_page = 0;
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Get the total number of pages.
    pub fn num_pages(&self) -> usize {
        self.candidates.len().div_ceil(self.page_size)
    }

    /// Get the current page index (0-based).
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    fn current_page_range(&self) -> Range<usize> {
        let start = (self.current_page * self.page_size).min(self.candidates.len());
        let end = (start + self.page_size).min(self.candidates.len());
        start..end
    }

    /// Get the candidates for the current page.
    pub fn current_page_candidates(&self) -> &[Candidate] {
        &self.candidates[self.current_page_range()]
    }

    /// Move to the previous page.
    /// Returns true if the page changed.
    pub fn page_up(&mut self) -> bool {
        if self.current_page > 0 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Move to the next page.
    /// Returns true if the page changed.
    pub fn page_down(&mut self) -> bool {
        if self.current_page + 1 < self.num_pages() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Select a candidate by index within the current page.
    /// Returns the selected candidate if the index is valid.
    pub fn select_by_index(&self, page_index: usize) -> Option<&Candidate> {
        self.current_page_candidates().get(page_index)
    }

    /// Drop all candidates and return to the first page.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.current_page = 0;
    }
}

impl Default for CandidateList {
    fn default() -> Self {
        Self::new()
    }
}

/// Usage-ordered lookups over an optional phonetic table, memoized per key.
///
/// The table is shared read-only; each ranker owns its own cache.
pub struct CandidateRanker {
    table: Option<Arc<PhoneticTable>>,
    cache: RefCell<lru::LruCache<u32, Vec<Candidate>>>,
    cache_hits: Cell<usize>,
    cache_misses: Cell<usize>,
}

impl CandidateRanker {
    /// Create a ranker. A capacity of 0 is treated as 1.
    pub fn new(table: Option<Arc<PhoneticTable>>, cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            table,
            cache: RefCell::new(lru::LruCache::new(capacity)),
            cache_hits: Cell::new(0),
            cache_misses: Cell::new(0),
        }
    }

    pub fn table(&self) -> Option<&Arc<PhoneticTable>> {
        self.table.as_ref()
    }

    /// Candidates for a packed phonetic key, most used first.
    ///
    /// Without a table every key yields nothing.
    pub fn rank(&self, key: u32) -> Vec<Candidate> {
        let Some(table) = &self.table else {
            return Vec::new();
        };

        if let Some(cached) = self.cache.borrow_mut().get(&key) {
            self.cache_hits.set(self.cache_hits.get() + 1);
            debug!(key, hits = cached.len(), "ranker cache hit");
            return cached.clone();
        }
        self.cache_misses.set(self.cache_misses.get() + 1);

        let ranked = table.lookup(key);
        debug!(key, candidates = ranked.len(), "ranked phonetic lookup");
        self.cache.borrow_mut().put(key, ranked.clone());
        ranked
    }

    /// Returns (hits, misses).
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.cache_hits.get(), self.cache_misses.get())
    }

    pub fn cache_size(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.borrow().cap().get()
    }

    /// Drop cached results and reset statistics.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
        self.cache_hits.set(0);
        self.cache_misses.set(0);
    }
}

impl std::fmt::Debug for CandidateRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateRanker")
            .field("has_table", &self.table.is_some())
            .field("cache_size", &self.cache_size())
            .field("cache_stats", &self.cache_stats())
            .finish()
    }
}
