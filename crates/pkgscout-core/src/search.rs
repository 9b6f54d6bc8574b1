use crate::{models::Package, pager::PageRequest, Result};

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub packages: Vec<Package>,
    /// Total matches the registry knows about, if it said
    pub total: Option<u64>,
}

impl SearchPage {
    pub fn new(packages: Vec<Package>, total: Option<u64>) -> Self {
        Self { packages, total }
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Trait for registry search backends
///
/// The npm client implements this; tests swap in a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Fetch up to `size` packages starting at offset `from`
    async fn search_page(&self, query: &str, size: u32, from: u32) -> Result<SearchPage>;
}

/// Run a pager request against a provider
pub async fn fetch_page(provider: &dyn SearchProvider, request: &PageRequest) -> Result<SearchPage> {
    provider
        .search_page(&request.query, request.size(), request.offset())
        .await
}
