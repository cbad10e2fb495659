use std::sync::Arc;
use catalog_models::{CatalogItem, FetchStatus, ItemId, ListEntry};
use catalog_sources::{resolve_trailer, CatalogApi, CatalogError, TrailerResolution};
use tracing::{debug, info};
use crate::fetch::{FetchController, FetchOutcome};
use crate::lists::{AddOutcome, ListStore};

/// Application state: the catalog listing, the two curated lists and the
/// currently selected trailer.
///
/// Owned by the caller and passed by reference; nothing here is global.
#[derive(Debug)]
pub struct AppStore {
    catalog: Arc<FetchController>,
    starred: ListStore,
    watch_later: ListStore,
    trailer: Option<TrailerResolution>,
}

impl AppStore {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            catalog: Arc::new(FetchController::new(api)),
            starred: ListStore::new(),
            watch_later: ListStore::new(),
            trailer: None,
        }
    }

    pub fn catalog(&self) -> &Arc<FetchController> {
        &self.catalog
    }

    pub fn starred(&self) -> &ListStore {
        &self.starred
    }

    pub fn watch_later(&self) -> &ListStore {
        &self.watch_later
    }

    pub fn page(&self) -> u32 {
        self.catalog.cursor().current_page
    }

    pub fn fetch_status(&self) -> FetchStatus {
        self.catalog.cursor().status
    }

    pub async fn movies(&self) -> Vec<CatalogItem> {
        self.catalog.items().await
    }

    /// New search (or discover, for a blank term) from the first page.
    pub async fn search(&self, term: Option<&str>) -> FetchOutcome {
        self.catalog.search(term).await
    }

    pub fn star(&mut self, item: &CatalogItem) -> AddOutcome {
        self.starred.add(ListEntry::from(item))
    }

    pub fn unstar(&mut self, id: ItemId) -> Option<ListEntry> {
        self.starred.remove(id)
    }

    /// Stars `item` if it is not starred yet, otherwise unstars it.
    /// Returns whether the item is starred afterwards.
    pub fn toggle_star(&mut self, item: &CatalogItem) -> bool {
        toggle(&mut self.starred, item, "starred")
    }

    pub fn clear_starred(&mut self) -> usize {
        self.starred.clear()
    }

    pub fn add_to_watch_later(&mut self, item: &CatalogItem) -> AddOutcome {
        self.watch_later.add(ListEntry::from(item))
    }

    pub fn remove_from_watch_later(&mut self, id: ItemId) -> Option<ListEntry> {
        self.watch_later.remove(id)
    }

    pub fn toggle_watch_later(&mut self, item: &CatalogItem) -> bool {
        toggle(&mut self.watch_later, item, "watch later")
    }

    pub fn clear_watch_later(&mut self) -> usize {
        self.watch_later.clear()
    }

    pub fn trailer(&self) -> Option<&TrailerResolution> {
        self.trailer.as_ref()
    }

    /// Resolves the trailer for `id`. The previous trailer is cleared first,
    /// so a failed lookup leaves no trailer selected.
    pub async fn view_trailer(&mut self, id: ItemId) -> Result<&TrailerResolution, CatalogError> {
        self.trailer = None;
        let resolution = resolve_trailer(self.catalog.api().as_ref(), id).await?;
        Ok(self.trailer.insert(resolution))
    }

    pub fn close_trailer(&mut self) {
        self.trailer = None;
    }
}

fn toggle(list: &mut ListStore, item: &CatalogItem, name: &str) -> bool {
    if list.remove(item.id).is_some() {
        info!("Removed {} ({}) from {}", item.title, item.id, name);
        false
    } else {
        list.add(ListEntry::from(item));
        info!("Added {} ({}) to {}", item.title, item.id, name);
        debug!("{} now holds {} entries", name, list.len());
        true
    }
}
