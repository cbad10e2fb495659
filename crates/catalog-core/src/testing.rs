//! Test doubles shared by the unit test modules.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use catalog_models::{CatalogItem, ItemId, VideoList};
use catalog_sources::{CatalogApi, CatalogError, CatalogQuery, CatalogResponse, PagedResult};
use tokio::sync::oneshot;

type Reply = Result<CatalogResponse, CatalogError>;

/// Catalog whose responses are released by the test, one query at a time.
#[derive(Default)]
pub(crate) struct GatedCatalog {
    gates: Mutex<HashMap<CatalogQuery, oneshot::Receiver<Reply>>>,
    calls: Mutex<Vec<CatalogQuery>>,
    videos: Mutex<HashMap<ItemId, VideoList>>,
}

impl GatedCatalog {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers `query`; its response is whatever gets sent on the returned sender.
    pub(crate) fn gate(&self, query: CatalogQuery) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(query, rx);
        tx
    }

    /// Registers `query` with a response that is available immediately.
    pub(crate) fn respond(&self, query: CatalogQuery, reply: Reply) {
        let _ = self.gate(query).send(reply);
    }

    pub(crate) fn set_videos(&self, id: ItemId, videos: VideoList) {
        self.videos.lock().unwrap().insert(id, videos);
    }

    pub(crate) fn calls(&self) -> Vec<CatalogQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogApi for GatedCatalog {
    fn catalog_name(&self) -> &str {
        "gated"
    }

    async fn fetch_page(&self, query: &CatalogQuery) -> Reply {
        self.calls.lock().unwrap().push(query.clone());
        let gate = self.gates.lock().unwrap().remove(query);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(CatalogError::UnexpectedShape("gate dropped".to_string()))),
            None => Err(CatalogError::UnexpectedShape(format!("no response scripted for {:?}", query))),
        }
    }

    async fn fetch_videos(&self, id: ItemId) -> Result<VideoList, CatalogError> {
        Ok(self.videos.lock().unwrap().get(&id).cloned().unwrap_or_default())
    }
}

pub(crate) fn movie(id: ItemId) -> CatalogItem {
    CatalogItem {
        id,
        title: format!("Movie {}", id),
        overview: format!("Overview {}", id),
        release_date: Some("2004-05-06".to_string()),
        poster_path: Some(format!("/{}.jpg", id)),
    }
}

pub(crate) fn paged(page: u32, ids: &[ItemId], total_pages: u32) -> Reply {
    Ok(CatalogResponse::PagedResult(PagedResult {
        page,
        results: ids.iter().copied().map(movie).collect(),
        total_pages,
    }))
}

pub(crate) fn discover(page: u32) -> CatalogQuery {
    CatalogQuery::Discover { page }
}

pub(crate) fn search(term: &str, page: u32) -> CatalogQuery {
    CatalogQuery::Search { term: term.to_string(), page }
}
