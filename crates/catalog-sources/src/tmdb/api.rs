use catalog_models::{ItemId, VideoList};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use crate::error::CatalogError;
use crate::query::CatalogQuery;
use crate::response::CatalogResponse;

/// Query parameters sent with every TMDB request.
#[derive(Debug, Clone)]
pub struct RequestDefaults {
    pub api_key: String,
    pub discover_sort: String,
    pub language: Option<String>,
}

impl RequestDefaults {
    fn base_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("api_key", self.api_key.clone())];
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }
        params
    }
}

#[derive(Debug, Deserialize)]
struct MovieDetails {
    #[serde(default)]
    videos: Option<VideoList>,
}

/// Path and query parameters for a listing request.
pub fn listing_request(defaults: &RequestDefaults, query: &CatalogQuery) -> (&'static str, Vec<(&'static str, String)>) {
    let mut params = defaults.base_params();
    let path = match query {
        CatalogQuery::Discover { page } => {
            params.push(("sort_by", defaults.discover_sort.clone()));
            params.push(("page", page.to_string()));
            "/discover/movie"
        }
        CatalogQuery::Search { term, page } => {
            params.push(("query", term.clone()));
            params.push(("page", page.to_string()));
            "/search/movie"
        }
    };
    (path, params)
}

/// Fetch one page of discover or search results
pub async fn get_page(
    client: &Client,
    base_url: &str,
    defaults: &RequestDefaults,
    query: &CatalogQuery,
) -> Result<CatalogResponse, CatalogError> {
    let (path, params) = listing_request(defaults, query);
    debug!("TMDB GET {} page={} term={:?}", path, query.page(), query.term());

    let body = get_json(client, &join(base_url, path), &params).await?;
    Ok(CatalogResponse::classify(body))
}

/// Fetch a movie's detail record with its videos appended
pub async fn get_movie_videos(
    client: &Client,
    base_url: &str,
    defaults: &RequestDefaults,
    id: ItemId,
) -> Result<VideoList, CatalogError> {
    let path = format!("/movie/{}", id);
    let mut params = defaults.base_params();
    params.push(("append_to_response", "videos".to_string()));
    debug!("TMDB GET {} (videos)", path);

    let body = get_json(client, &join(base_url, &path), &params).await?;
    let details: MovieDetails = serde_json::from_value(body)?;
    Ok(details.videos.unwrap_or_default())
}

async fn get_json(client: &Client, url: &str, params: &[(&'static str, String)]) -> Result<Value, CatalogError> {
    let response = client
        .get(url)
        .query(params)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(CatalogError::Status { status, body });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn join(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
