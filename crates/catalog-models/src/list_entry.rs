use serde::{Deserialize, Serialize};
use crate::catalog_item::{join_poster_url, CatalogItem, ItemId};

/// Projection of a `CatalogItem` kept in the starred and watch-later lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListEntry {
    pub id: ItemId,
    pub title: String,
    pub overview: String,
    pub release_year: Option<u16>,
    pub poster_path: Option<String>,
}

impl ListEntry {
    pub fn poster_url(&self, poster_base: &str) -> Option<String> {
        join_poster_url(poster_base, self.poster_path.as_deref()?)
    }
}

impl From<&CatalogItem> for ListEntry {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            overview: item.overview.clone(),
            release_year: item.release_year(),
            poster_path: item.poster_path.clone(),
        }
    }
}
