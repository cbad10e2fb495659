use catalog_models::{CatalogItem, FetchStatus, ItemId};
use catalog_sources::{CatalogError, CatalogResponse};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Signals for the view layer that are not part of the state itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewEvent {
    /// The listing was replaced from its first page
    ScrollToTop,
}

/// Items fetched so far for the active query plus paging bookkeeping.
///
/// Transitions mirror a fetch lifecycle: `pending` when a request starts,
/// then exactly one of `fulfilled` or `rejected`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogPageState {
    items: Vec<CatalogItem>,
    current_page: u32,
    next_page: Option<u32>,
    status: FetchStatus,
}

impl Default for CatalogPageState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            next_page: None,
            status: FetchStatus::Idle,
        }
    }
}

impl CatalogPageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn next_page(&self) -> Option<u32> {
        self.next_page
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn last_item_id(&self) -> Option<ItemId> {
        self.items.last().map(|item| item.id)
    }

    pub fn pending(&mut self) {
        self.status = FetchStatus::Loading;
    }

    pub fn fulfilled(&mut self, response: CatalogResponse) -> Option<ViewEvent> {
        match response {
            CatalogResponse::FlatList(items) => {
                info!("Replaced listing with {} unpaged items", items.len());
                self.items = items;
                self.current_page = 1;
                self.next_page = None;
                self.status = FetchStatus::Success;
                Some(ViewEvent::ScrollToTop)
            }
            CatalogResponse::PagedResult(paged) => {
                let next_page = paged.next_page();
                let first_page = paged.page == 1;
                if first_page {
                    self.items = paged.results;
                } else {
                    self.items.extend(paged.results);
                }
                self.current_page = paged.page;
                self.next_page = next_page;
                self.status = FetchStatus::Success;
                info!(
                    "Merged page {}/{} ({} items total, next page {:?})",
                    paged.page,
                    paged.total_pages,
                    self.items.len(),
                    next_page
                );
                first_page.then_some(ViewEvent::ScrollToTop)
            }
            CatalogResponse::Malformed(reason) => {
                warn!("Keeping {} items after malformed response: {}", self.items.len(), reason);
                self.status = FetchStatus::Error;
                None
            }
        }
    }

    /// The request was dropped before it settled; go back to `previous`.
    pub fn cancelled(&mut self, previous: FetchStatus) {
        debug!("Fetch cancelled, status back to {:?}", previous);
        self.status = previous;
    }

    pub fn rejected(&mut self, error: &CatalogError) {
        warn!("Catalog fetch failed ({:?}): {}", error.kind(), error);
        debug!("Keeping {} items after failed fetch", self.items.len());
        self.status = FetchStatus::Error;
    }
}
