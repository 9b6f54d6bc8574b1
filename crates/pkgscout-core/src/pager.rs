// Paginated search state with infinite-scroll triggering
//
// The pager never talks to the network itself. It hands out PageRequests,
// the caller runs them (see search::fetch_page), and feeds the outcome back
// through `complete`. That keeps it synchronous and easy to test.
use crate::{models::Package, notice::Notice, search::SearchPage, Result};
use tracing::{debug, info, warn};

/// Packages per registry request
pub const PAGE_SIZE: u32 = 12;

/// Highest page index whose offset still fits the registry's `from` parameter
pub const MAX_PAGE: u32 = u32::MAX / PAGE_SIZE;

/// Shown when a search comes back with nothing
pub const NO_RESULTS_MESSAGE: &str = "No packages found for your search.";

/// Whether a request replaces the result set or extends it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Explicit search: replaces results, page index resets
    Initial,
    /// Scroll-driven: appends to results
    More,
}

/// A page fetch the caller should perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Sequence number; only the latest issued request is applied
    pub seq: u64,
    pub query: String,
    /// Zero-based page index
    pub page: u32,
    pub kind: PageKind,
}

impl PageRequest {
    pub fn size(&self) -> u32 {
        PAGE_SIZE
    }

    /// Zero-based result offset. Pages past `MAX_PAGE` pin to the last
    /// representable offset.
    pub fn offset(&self) -> u32 {
        self.page.saturating_mul(PAGE_SIZE)
    }
}

/// Watches the last rendered result for visibility
///
/// Must be re-pointed at the new last item every time the result set
/// changes, the same way an intersection observer is re-attached to the
/// new last DOM node after each render.
#[derive(Debug, Clone, Default)]
pub struct LastItemObserver {
    target: Option<usize>,
}

impl LastItemObserver {
    /// Observe the last item of a list with `len` entries
    pub fn observe(&mut self, len: usize) {
        self.target = len.checked_sub(1);
    }

    pub fn disconnect(&mut self) {
        self.target = None;
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    /// Is the observed item inside the viewport `[first_visible, first_visible + visible_rows)`?
    pub fn is_intersecting(&self, first_visible: usize, visible_rows: usize) -> bool {
        match self.target {
            Some(idx) => idx >= first_visible && idx < first_visible.saturating_add(visible_rows),
            None => false,
        }
    }
}

/// Search results plus everything needed to fetch the next page
#[derive(Debug, Default)]
pub struct SearchPager {
    /// Query the current results belong to
    query: String,
    results: Vec<Package>,
    /// Index of the page the next scroll fetch will request
    next_page: u32,
    in_flight: bool,
    latest_seq: u64,
    total: Option<u64>,
    exhausted: bool,
    observer: LastItemObserver,
}

impl SearchPager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Package] {
        &self.results
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn observer(&self) -> &LastItemObserver {
        &self.observer
    }

    /// Is this the most recently issued request?
    pub fn is_current(&self, request: &PageRequest) -> bool {
        request.seq == self.latest_seq
    }

    /// Start a fresh search for `input`.
    ///
    /// A blank query never fetches; the caller gets the notice to show instead.
    /// A search issued while another fetch is pending supersedes it.
    pub fn begin_search(&mut self, input: &str) -> std::result::Result<PageRequest, Notice> {
        let query = input.trim();
        if query.is_empty() {
            return Err(Notice::error("Please enter a package name to search."));
        }

        info!("Searching for: {}", query);
        Ok(self.issue(query.to_string(), 0, PageKind::Initial))
    }

    /// Request the next page of the current query, if allowed.
    ///
    /// Returns None while a fetch is in flight, when there is no query yet,
    /// or once the registry has nothing more to give.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.in_flight || self.query.trim().is_empty() || self.exhausted {
            return None;
        }
        if self.next_page > MAX_PAGE {
            self.exhausted = true;
            return None;
        }

        debug!("Loading page {} of '{}'", self.next_page, self.query);
        Some(self.issue(self.query.clone(), self.next_page, PageKind::More))
    }

    /// Report the visible window of the result list after a draw.
    ///
    /// Level-triggered: whenever the observed last item is on screen and the
    /// guard allows it, the next page is requested.
    pub fn on_viewport(&mut self, first_visible: usize, visible_rows: usize) -> Option<PageRequest> {
        if self.observer.is_intersecting(first_visible, visible_rows) {
            self.load_more()
        } else {
            None
        }
    }

    /// The user moved through the list; re-attach the observer if a failed
    /// fetch detached it.
    pub fn on_user_scroll(&mut self) {
        if !self.exhausted && self.observer.target().is_none() {
            self.observer.observe(self.results.len());
        }
    }

    /// Apply the outcome of a request previously handed out by the pager.
    ///
    /// Returns a notice when the user should hear about it.
    pub fn complete(&mut self, request: &PageRequest, outcome: Result<SearchPage>) -> Option<Notice> {
        if !self.is_current(request) {
            debug!(
                "Discarding stale response #{} (latest is #{})",
                request.seq, self.latest_seq
            );
            return None;
        }

        self.in_flight = false;

        match (request.kind, outcome) {
            (PageKind::Initial, Ok(page)) => {
                info!("Got {} packages for '{}'", page.packages.len(), request.query);
                let empty = page.is_empty();

                self.query = request.query.clone();
                self.results = page.packages;
                self.next_page = 1;
                self.total = page.total;
                self.exhausted = empty || self.reached_total();
                self.observer.observe(self.results.len());

                if empty {
                    Some(Notice::warning(NO_RESULTS_MESSAGE))
                } else {
                    None
                }
            }
            (PageKind::More, Ok(page)) => {
                debug!(
                    "Appending {} packages (page {})",
                    page.packages.len(),
                    request.page
                );
                if page.total.is_some() {
                    self.total = page.total;
                }

                if page.is_empty() {
                    self.exhausted = true;
                } else {
                    self.results.extend(page.packages);
                    self.exhausted = self.reached_total();
                }
                self.next_page += 1;
                self.observer.observe(self.results.len());
                None
            }
            (PageKind::Initial, Err(e)) => {
                warn!("Search for '{}' failed: {}", request.query, e);
                Some(Notice::error("An error occurred while fetching packages."))
            }
            (PageKind::More, Err(e)) => {
                warn!("Fetching page {} failed: {}", request.page, e);
                // No automatic retry: stay detached until the user scrolls
                self.observer.disconnect();
                Some(Notice::error(
                    "An error occurred while fetching more packages.",
                ))
            }
        }
    }

    fn issue(&mut self, query: String, page: u32, kind: PageKind) -> PageRequest {
        self.latest_seq += 1;
        self.in_flight = true;

        PageRequest {
            seq: self.latest_seq,
            query,
            page,
            kind,
        }
    }

    fn reached_total(&self) -> bool {
        match self.total {
            Some(total) => self.results.len() as u64 >= total,
            None => false,
        }
    }
}
