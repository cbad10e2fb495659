//! Interactive listing driven by the infinite scroll coordinator.
//!
//! The terminal viewport stands in for a scrolling document: one row per
//! movie, `rows` visible at a time. Every move reports the new scroll
//! position and, when the last loaded movie is on screen, an intersection
//! for it. The coordinator decides whether that loads the next page.

use super::catalog::{connect, youtube_url};
use super::fetch_ui::{is_interactive, FetchUI};
use super::prompts;
use crate::output::{self, Output};
use catalog_config::Config;
use catalog_core::{AppStore, FetchController, InfiniteScroll, IntersectionEntry, PageCursor, ScrollMetrics, ScrollThresholds, ViewEvent};
use catalog_models::{CatalogItem, FetchStatus, ItemId, ListEntry};
use catalog_sources::TrailerResolution;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::ops::Range;
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

type Scroll = InfiniteScroll<Arc<FetchController>>;

/// Window of rows currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Viewport {
    top: usize,
    rows: usize,
}

impl Viewport {
    fn new(rows: usize) -> Self {
        Self { top: 0, rows: rows.max(1) }
    }

    fn visible(&self, total: usize) -> Range<usize> {
        let start = self.top.min(total);
        start..(start + self.rows).min(total)
    }

    /// The last row may scroll up to the top of the screen.
    fn scroll_down(&mut self, total: usize) {
        self.top = (self.top + self.rows).min(total.saturating_sub(1));
    }

    fn scroll_up(&mut self) {
        self.top = self.top.saturating_sub(self.rows);
    }

    fn scroll_to_top(&mut self) {
        self.top = 0;
    }

    fn metrics(&self, total: usize) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: self.top as f64,
            scroll_height: total as f64,
            client_height: self.rows as f64,
        }
    }

    /// Visibility of `target` if it is one of `items`.
    fn intersection(&self, items: &[CatalogItem], target: ItemId) -> Option<IntersectionEntry> {
        let index = items.iter().position(|item| item.id == target)?;
        let is_intersecting = self.visible(items.len()).contains(&index);
        Some(IntersectionEntry {
            target,
            is_intersecting,
            ratio: if is_intersecting { 1.0 } else { 0.0 },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Down,
    Up,
    Top,
    Search,
    Star,
    WatchLater,
    Trailer,
    ShowStarred,
    ShowWatchLater,
    ClearStarred,
    ClearWatchLater,
    Quit,
}

const ACTIONS: &[(Action, &str)] = &[
    (Action::Down, "Scroll down"),
    (Action::Up, "Scroll up"),
    (Action::Top, "Back to top"),
    (Action::Search, "New search"),
    (Action::Star, "Star / unstar a movie"),
    (Action::WatchLater, "Add to / remove from watch later"),
    (Action::Trailer, "Watch a trailer"),
    (Action::ShowStarred, "Show starred"),
    (Action::ShowWatchLater, "Show watch later"),
    (Action::ClearStarred, "Clear starred"),
    (Action::ClearWatchLater, "Clear watch later"),
    (Action::Quit, "Quit"),
];

struct Session<'a> {
    store: AppStore,
    scroll: Scroll,
    cursor_rx: watch::Receiver<PageCursor>,
    events: broadcast::Receiver<ViewEvent>,
    viewport: Viewport,
    ui: FetchUI,
    poster_base: String,
    output: &'a Output,
}

pub async fn run_browse(config: &Config, search: Option<String>, rows: usize, output: &Output) -> Result<()> {
    if !output.is_human() {
        return Err(eyre!("browse only supports human output"));
    }
    if !is_interactive() {
        return Err(eyre!("browse needs an interactive terminal; use 'discover' or 'search' instead"));
    }

    let store = AppStore::new(connect(config)?);
    let scroll = InfiniteScroll::new(store.catalog().clone(), ScrollThresholds::from(&config.scroll));
    let cursor_rx = store.catalog().subscribe();
    let events = store.catalog().events();

    let mut session = Session {
        store,
        scroll,
        cursor_rx,
        events,
        viewport: Viewport::new(rows),
        ui: FetchUI::new(),
        poster_base: config.catalog.poster_base_url.clone(),
        output,
    };

    session.new_search(search.as_deref()).await;
    let result = session.run().await;
    session.scroll.disconnect();
    result
}

impl Session<'_> {
    async fn run(&mut self) -> Result<()> {
        loop {
            self.drain_events();
            let items = self.store.movies().await;
            self.render(&items);

            let labels: Vec<&str> = ACTIONS.iter().map(|(_, label)| *label).collect();
            let action = ACTIONS[prompts::select("What next?", &labels, 0)?].0;
            debug!(?action, "Browse action");

            match action {
                Action::Down => {
                    self.viewport.scroll_down(items.len());
                    self.report_position(&items).await;
                }
                Action::Up => self.viewport.scroll_up(),
                Action::Top => self.viewport.scroll_to_top(),
                Action::Search => {
                    let term = prompts::prompt_string("Search (leave blank to discover)", None)?;
                    self.new_search(Some(&term)).await;
                }
                Action::Star => {
                    if let Some(item) = self.pick(&items, "Star which movie?")? {
                        let starred = self.store.toggle_star(&item);
                        let verb = if starred { "Starred" } else { "Unstarred" };
                        self.output.success(format!("{} {}", verb, item.title));
                    }
                }
                Action::WatchLater => {
                    if let Some(item) = self.pick(&items, "Watch which movie later?")? {
                        let queued = self.store.toggle_watch_later(&item);
                        let verb = if queued { "Added to" } else { "Removed from" };
                        self.output.success(format!("{} watch later: {}", verb, item.title));
                    }
                }
                Action::Trailer => {
                    if let Some(item) = self.pick(&items, "Trailer for which movie?")? {
                        self.show_trailer(&item).await?;
                    }
                }
                Action::ShowStarred => {
                    self.show_list("Starred", self.store.starred().entries());
                }
                Action::ShowWatchLater => {
                    self.show_list("Watch later", self.store.watch_later().entries());
                }
                Action::ClearStarred => {
                    if prompts::prompt_yes_no("Remove all starred movies?", false)? {
                        let removed = self.store.clear_starred();
                        self.output.success(format!("Cleared {} starred movies", removed));
                    }
                }
                Action::ClearWatchLater => {
                    if prompts::prompt_yes_no("Empty the watch later list?", false)? {
                        let removed = self.store.clear_watch_later();
                        self.output.success(format!("Cleared {} movies from watch later", removed));
                    }
                }
                Action::Quit => return Ok(()),
            }
        }
    }

    async fn new_search(&mut self, term: Option<&str>) {
        let label = match term.map(str::trim).filter(|t| !t.is_empty()) {
            Some(term) => format!("Searching for \"{}\"...", term),
            None => "Discovering movies...".to_string(),
        };
        self.ui.start(label);
        self.store.search(term).await;
        self.ui.finish();

        let cursor = self.store.catalog().cursor();
        self.scroll.on_cursor(&cursor);
        self.report_failure(&cursor);
    }

    /// Feeds the current position to the coordinator and waits for any
    /// page it started.
    async fn report_position(&mut self, items: &[CatalogItem]) {
        let mut started = self.scroll.on_scroll(self.viewport.metrics(items.len()));
        if !started {
            let observed = self.scroll.observation().map(|o| o.target());
            if let Some(entry) = observed.and_then(|target| self.viewport.intersection(items, target)) {
                started = self.scroll.on_intersection(entry);
            }
        }
        if started {
            self.wait_for_page().await;
        }
    }

    async fn wait_for_page(&mut self) {
        let page = self.store.page() + 1;
        self.ui.start(format!("Loading page {}...", page));
        while self.scroll.is_fetching() {
            if self.cursor_rx.changed().await.is_err() {
                break;
            }
            let cursor = self.cursor_rx.borrow_and_update().clone();
            self.scroll.on_cursor(&cursor);
        }
        self.ui.finish();

        let cursor = self.store.catalog().cursor();
        info!(page = cursor.current_page, items = cursor.item_count, "Scroll fetch settled");
        self.report_failure(&cursor);
    }

    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(ViewEvent::ScrollToTop) => self.viewport.scroll_to_top(),
                Err(TryRecvError::Lagged(skipped)) => debug!(skipped, "View events lagged"),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    fn report_failure(&self, cursor: &PageCursor) {
        if cursor.status == FetchStatus::Error {
            self.output.error("Could not load movies from the catalog. Scroll again to retry.");
        }
    }

    fn render(&self, items: &[CatalogItem]) {
        let cursor = self.store.catalog().cursor();
        if items.is_empty() {
            self.output.warn("No movies to show");
            return;
        }

        let range = self.viewport.visible(items.len());
        let offset = range.start;
        let table = output::movie_table(&items[range.clone()], offset, self.store.starred(), self.store.watch_later());
        self.output.table(&table);

        let more = match cursor.next_page {
            Some(_) => "more below",
            None => "end of results",
        };
        let heading = match cursor.term.as_deref() {
            Some(term) => format!("Search \"{}\"", term),
            None => "Discover".to_string(),
        };
        self.output.info(format!(
            "{}: rows {}-{} of {} loaded (page {}, {}) | ★ {} | watch later {}",
            heading,
            range.start + 1,
            range.end,
            items.len(),
            cursor.current_page,
            more,
            self.store.starred().len(),
            self.store.watch_later().len(),
        ));
    }

    fn pick(&self, items: &[CatalogItem], prompt: &str) -> Result<Option<CatalogItem>> {
        let visible = &items[self.viewport.visible(items.len())];
        Ok(prompts::select_item(prompt, visible)?.cloned())
    }

    async fn show_trailer(&mut self, item: &CatalogItem) -> Result<()> {
        self.ui.start(format!("Looking up trailer for {}...", item.title));
        let resolution = self.store.view_trailer(item.id).await.map(TrailerResolution::clone);
        self.ui.finish();

        match resolution {
            Ok(TrailerResolution::Found(key)) => {
                self.output.success(format!("{}: {}", item.title, youtube_url(&key)));
                prompts::prompt_yes_no("Close trailer?", true)?;
            }
            Ok(TrailerResolution::NoTrailer) => {
                self.output.warn(format!("No trailer available for {}", item.title));
            }
            Err(e) => {
                self.output.error(format!("Failed to look up trailer for {}: {}", item.title, e));
            }
        }
        self.store.close_trailer();
        Ok(())
    }

    fn show_list(&self, name: &str, entries: &[ListEntry]) {
        if entries.is_empty() {
            self.output.info(format!("{} is empty", name));
            return;
        }
        self.output.info(format!("{} ({})", name, entries.len()));
        self.output.table(&output::entry_table(entries, &self.poster_base));
    }
}
