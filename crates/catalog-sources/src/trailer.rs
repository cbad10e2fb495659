use catalog_models::{ItemId, Video};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::CatalogError;
use crate::traits::CatalogApi;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "key", rename_all = "snake_case")]
pub enum TrailerResolution {
    Found(String),
    NoTrailer,
}

impl TrailerResolution {
    pub fn key(&self) -> Option<&str> {
        match self {
            TrailerResolution::Found(key) => Some(key),
            TrailerResolution::NoTrailer => None,
        }
    }
}

/// First video typed "Trailer", else the first video of any type.
pub fn select_trailer(videos: &[Video]) -> TrailerResolution {
    videos
        .iter()
        .find(|video| video.is_trailer())
        .or_else(|| videos.first())
        .map(|video| TrailerResolution::Found(video.key.clone()))
        .unwrap_or(TrailerResolution::NoTrailer)
}

pub async fn resolve_trailer<A>(api: &A, id: ItemId) -> Result<TrailerResolution, CatalogError>
where
    A: CatalogApi + ?Sized,
{
    let videos = api.fetch_videos(id).await?;
    let resolution = select_trailer(&videos.results);
    debug!("Trailer for {} from {}: {:?}", id, api.catalog_name(), resolution);
    Ok(resolution)
}
