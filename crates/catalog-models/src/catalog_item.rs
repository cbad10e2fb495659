use serde::{Deserialize, Serialize};

pub type ItemId = u64;

/// A single movie as returned by the catalog.
///
/// Field names follow the catalog's wire format so the same struct
/// deserializes straight out of a `results` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>, // "YYYY-MM-DD", sometimes empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
}

impl CatalogItem {
    /// Year taken from the first four characters of `release_date`.
    pub fn release_year(&self) -> Option<u16> {
        release_year_from_date(self.release_date.as_deref()?)
    }

    pub fn poster_url(&self, poster_base: &str) -> Option<String> {
        join_poster_url(poster_base, self.poster_path.as_deref()?)
    }
}

pub(crate) fn release_year_from_date(date: &str) -> Option<u16> {
    date.get(..4)?.parse().ok()
}

pub(crate) fn join_poster_url(poster_base: &str, poster_path: &str) -> Option<String> {
    if poster_path.is_empty() {
        return None;
    }
    Some(format!(
        "{}/{}",
        poster_base.trim_end_matches('/'),
        poster_path.trim_start_matches('/')
    ))
}
