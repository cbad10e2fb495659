use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use catalog_config::CatalogConfig;
use catalog_models::{ItemId, VideoList};
use reqwest::Client;
use tracing::info;
use crate::error::CatalogError;
use crate::query::CatalogQuery;
use crate::response::CatalogResponse;
use crate::tmdb::api::{self, RequestDefaults};
use crate::traits::CatalogApi;

#[derive(Clone)]
pub struct TmdbClient {
    client: Arc<Client>,
    base_url: String,
    defaults: RequestDefaults,
}

impl TmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), &CatalogConfig {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..CatalogConfig::default()
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.api_key.trim().is_empty() {
            return Err(CatalogError::NotConfigured("api_key is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("moviescout/", env!("CARGO_PKG_VERSION")))
            .build()?;
        info!("Using TMDB catalog at {}", config.base_url);
        Ok(Self::with_client(client, config))
    }

    fn with_client(client: Client, config: &CatalogConfig) -> Self {
        Self {
            client: Arc::new(client),
            base_url: config.base_url.clone(),
            defaults: RequestDefaults {
                api_key: config.api_key.clone(),
                discover_sort: config.discover_sort.clone(),
                language: config.language.clone(),
            },
        }
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    fn catalog_name(&self) -> &str {
        "tmdb"
    }

    async fn fetch_page(&self, query: &CatalogQuery) -> Result<CatalogResponse, CatalogError> {
        api::get_page(&self.client, &self.base_url, &self.defaults, query).await
    }

    async fn fetch_videos(&self, id: ItemId) -> Result<VideoList, CatalogError> {
        api::get_movie_videos(&self.client, &self.base_url, &self.defaults, id).await
    }
}
