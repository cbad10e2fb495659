use async_trait::async_trait;
use catalog_models::{ItemId, VideoList};
use crate::error::CatalogError;
use crate::query::CatalogQuery;
use crate::response::CatalogResponse;

/// Remote movie catalog.
///
/// A body that parses as JSON but fits no known listing shape comes back as
/// `Ok(CatalogResponse::Malformed)`; transport, HTTP status and JSON errors
/// come back as `Err`.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    fn catalog_name(&self) -> &str;

    async fn fetch_page(&self, query: &CatalogQuery) -> Result<CatalogResponse, CatalogError>;

    /// Videos attached to a single item (trailers, teasers, clips).
    async fn fetch_videos(&self, id: ItemId) -> Result<VideoList, CatalogError>;
}
