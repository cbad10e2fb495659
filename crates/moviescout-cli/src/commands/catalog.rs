use super::fetch_ui::FetchUI;
use crate::output::{self, Output};
use catalog_config::Config;
use catalog_core::{AppStore, CatalogPageState, ListStore};
use catalog_models::{CatalogItem, FetchStatus, ItemId};
use catalog_sources::{CatalogApi, TmdbClient, TrailerResolution};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Validates the catalog settings and builds the HTTP client.
pub fn connect(config: &Config) -> Result<Arc<dyn CatalogApi>> {
    config
        .validate()
        .map_err(|e| eyre!("{}. Run 'moviescout config init' to set it up.", e))?;
    let client = TmdbClient::from_config(&config.catalog)
        .map_err(|e| eyre!("Failed to create catalog client: {}", e))?;
    Ok(Arc::new(client))
}

pub fn youtube_url(key: &str) -> String {
    format!("{}{}", YOUTUBE_WATCH_URL, key)
}

pub fn item_json(item: &CatalogItem, poster_base: &str) -> Value {
    json!({
        "id": item.id,
        "title": item.title,
        "overview": item.overview,
        "release_year": item.release_year(),
        "poster_url": item.poster_url(poster_base),
    })
}

pub fn trailer_json(id: ItemId, resolution: &TrailerResolution) -> Value {
    json!({
        "id": id,
        "trailer": resolution,
        "url": resolution.key().map(youtube_url),
    })
}

fn listing_json(term: Option<&str>, state: &CatalogPageState, poster_base: &str) -> Value {
    json!({
        "term": term,
        "page": state.current_page(),
        "next_page": state.next_page(),
        "status": state.status(),
        "results": state.items().iter().map(|item| item_json(item, poster_base)).collect::<Vec<_>>(),
    })
}

/// One-shot `discover` / `search`: fetch a single page and print it.
pub async fn run_listing(config: &Config, term: Option<&str>, page: u32, output: &Output) -> Result<()> {
    let store = AppStore::new(connect(config)?);

    let ui = FetchUI::new();
    let label = match term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => format!("Searching for \"{}\" (page {})...", term, page),
        None => format!("Discovering movies (page {})...", page),
    };
    ui.start(label);
    store.catalog().query(term, page).await;
    ui.finish();

    let state = store.catalog().snapshot().await;
    if state.status() == FetchStatus::Error {
        return Err(eyre!("Could not load page {} from the catalog (run with -v for details)", page));
    }
    info!(items = state.items().len(), page = state.current_page(), "Listing loaded");

    if !output.is_human() {
        let term = store.catalog().cursor().term;
        output.json(&listing_json(term.as_deref(), &state, &config.catalog.poster_base_url));
        return Ok(());
    }

    if state.items().is_empty() {
        output.warn("No movies found");
        return Ok(());
    }

    output.table(&output::movie_table(state.items(), 0, &ListStore::new(), &ListStore::new()));
    match state.next_page() {
        Some(next) => output.info(format!("Page {}. Use --page {} for more.", state.current_page(), next)),
        None => output.info(format!("Page {} (last page)", state.current_page())),
    }
    Ok(())
}

pub async fn run_trailer(config: &Config, id: ItemId, output: &Output) -> Result<()> {
    let mut store = AppStore::new(connect(config)?);

    let ui = FetchUI::new();
    ui.start(format!("Looking up trailer for {}...", id));
    let resolution = store.view_trailer(id).await;
    ui.finish();

    let resolution = resolution
        .map_err(|e| eyre!("Failed to look up trailer for {}: {}", id, e))?
        .clone();
    store.close_trailer();

    if !output.is_human() {
        output.json(&trailer_json(id, &resolution));
        return Ok(());
    }

    match resolution.key() {
        Some(key) => output.success(format!("Trailer: {}", youtube_url(key))),
        None => output.warn(format!("No trailer available for {}", id)),
    }
    Ok(())
}
