//! Infinite scroll: decides when the next catalog page should be loaded.
//!
//! The coordinator is a two-state machine (`Idle`, `Fetching`) fed by the
//! view layer with scroll positions and intersection reports for the last
//! rendered item. It asks its [`PageSource`] for one page at a time and only
//! goes back to `Idle` once a fetch that started after the request settles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use catalog_config::ScrollConfig;
use catalog_models::{FetchStatus, ItemId};
use tracing::{debug, trace};
use crate::fetch::{FetchController, PageCursor};

/// Where more pages come from.
pub trait PageSource {
    fn cursor(&self) -> PageCursor;

    /// Starts loading `page` for `term` without waiting for it.
    fn load_page(&self, term: Option<String>, page: u32);
}

impl PageSource for Arc<FetchController> {
    fn cursor(&self) -> PageCursor {
        FetchController::cursor(self)
    }

    fn load_page(&self, term: Option<String>, page: u32) {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            controller.query(term.as_deref(), page).await;
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollState {
    Idle,
    Fetching,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollThresholds {
    pub scroll_ratio: f64,
    pub intersection_ratio: f64,
}

impl Default for ScrollThresholds {
    fn default() -> Self {
        Self {
            scroll_ratio: 0.8,
            intersection_ratio: 0.8,
        }
    }
}

impl From<&ScrollConfig> for ScrollThresholds {
    fn from(config: &ScrollConfig) -> Self {
        Self {
            scroll_ratio: config.scroll_threshold_ratio,
            intersection_ratio: config.intersection_threshold,
        }
    }
}

/// Document scroll geometry, in any consistent unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn past_threshold(&self, ratio: f64) -> bool {
        self.scroll_top > self.scroll_height - self.client_height * ratio
    }
}

/// Visibility report for an observed item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: ItemId,
    pub is_intersecting: bool,
    /// Visible fraction of the target, 0.0..=1.0
    pub ratio: f64,
}

/// Handle on the coordinator's observation of one item.
///
/// Clones share the same connection flag; the coordinator disconnects it
/// when it rebinds to a new last item.
#[derive(Debug, Clone)]
pub struct Observation {
    target: ItemId,
    active: Arc<AtomicBool>,
}

impl Observation {
    fn new(target: ItemId) -> Self {
        Self {
            target,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn target(&self) -> ItemId {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn disconnect(&self) {
        self.active.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct InfiniteScroll<S> {
    source: S,
    thresholds: ScrollThresholds,
    state: ScrollState,
    // `settled` count seen when the current fetch was requested
    requested_after: u64,
    observation: Option<Observation>,
}

impl<S: PageSource> InfiniteScroll<S> {
    pub fn new(source: S, thresholds: ScrollThresholds) -> Self {
        Self {
            source,
            thresholds,
            state: ScrollState::Idle,
            requested_after: 0,
            observation: None,
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn is_fetching(&self) -> bool {
        self.state == ScrollState::Fetching
    }

    pub fn observation(&self) -> Option<&Observation> {
        self.observation.as_ref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns true if this scroll position started a fetch.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        if !metrics.past_threshold(self.thresholds.scroll_ratio) {
            return false;
        }
        trace!("Scroll threshold crossed at {:?}", metrics);
        self.trigger()
    }

    /// Returns true if this report started a fetch. Reports for anything
    /// other than the currently observed item are ignored.
    pub fn on_intersection(&mut self, entry: IntersectionEntry) -> bool {
        let observed = match &self.observation {
            Some(observation) if observation.is_active() => observation.target(),
            _ => return false,
        };
        if entry.target != observed {
            trace!("Ignoring intersection for unobserved item {}", entry.target);
            return false;
        }
        if !entry.is_intersecting || entry.ratio < self.thresholds.intersection_ratio {
            return false;
        }
        self.trigger()
    }

    /// Feeds a new catalog cursor in: releases the fetch lock once a fetch
    /// has settled, and re-observes the last item if it changed.
    pub fn on_cursor(&mut self, cursor: &PageCursor) {
        if self.is_fetching() && cursor.status.is_settled() && cursor.settled > self.requested_after {
            debug!("Page fetch settled with {:?}, scroll idle", cursor.status);
            self.state = ScrollState::Idle;
        }

        let observed = self.observation.as_ref().map(Observation::target);
        if observed != cursor.last_item {
            self.rebind(cursor.last_item);
        }
    }

    /// Drops the current observation and starts observing `last_item`.
    pub fn rebind(&mut self, last_item: Option<ItemId>) -> Option<Observation> {
        if let Some(previous) = self.observation.take() {
            previous.disconnect();
        }
        self.observation = last_item.map(Observation::new);
        self.observation.clone()
    }

    pub fn disconnect(&mut self) {
        if let Some(observation) = self.observation.take() {
            observation.disconnect();
        }
    }

    fn trigger(&mut self) -> bool {
        if self.is_fetching() {
            trace!("Already fetching, trigger ignored");
            return false;
        }

        let cursor = self.source.cursor();
        if cursor.status == FetchStatus::Loading {
            trace!("Catalog busy with another query, trigger ignored");
            return false;
        }
        if cursor.next_page.is_none() {
            debug!("At last page ({}), trigger ignored", cursor.current_page);
            return false;
        }

        let page = cursor.current_page + 1;
        debug!("Loading page {} for {:?}", page, cursor.term);
        self.state = ScrollState::Fetching;
        self.requested_after = cursor.settled;
        self.source.load_page(cursor.term, page);
        true
    }
}

impl<S> Drop for InfiniteScroll<S> {
    fn drop(&mut self) {
        if let Some(observation) = self.observation.take() {
            observation.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{discover, paged, search, GatedCatalog};
    use std::cell::RefCell;
    use tokio::sync::watch;
    use tokio::task::yield_now;

    /// Page source that records requests and lets the test move the cursor.
    struct RecordingSource {
        cursor: RefCell<PageCursor>,
        requests: RefCell<Vec<(Option<String>, u32)>>,
    }

    impl RecordingSource {
        fn new(current_page: u32, next_page: Option<u32>) -> Self {
            Self {
                cursor: RefCell::new(PageCursor {
                    term: Some("heat".to_string()),
                    current_page,
                    next_page,
                    status: FetchStatus::Success,
                    item_count: 20,
                    last_item: Some(20),
                    settled: 1,
                }),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageSource for &RecordingSource {
        fn cursor(&self) -> PageCursor {
            self.cursor.borrow().clone()
        }

        fn load_page(&self, term: Option<String>, page: u32) {
            self.requests.borrow_mut().push((term, page));
            self.cursor.borrow_mut().status = FetchStatus::Loading;
        }
    }

    fn bottom() -> ScrollMetrics {
        ScrollMetrics { scroll_top: 1000.0, scroll_height: 1000.0, client_height: 500.0 }
    }

    fn seen(target: ItemId) -> IntersectionEntry {
        IntersectionEntry { target, is_intersecting: true, ratio: 1.0 }
    }

    fn settle(source: &RecordingSource, status: FetchStatus, last_item: ItemId, next_page: Option<u32>) -> PageCursor {
        let mut cursor = source.cursor.borrow_mut();
        cursor.status = status;
        cursor.settled += 1;
        if status == FetchStatus::Success {
            cursor.current_page += 1;
            cursor.next_page = next_page;
            cursor.last_item = Some(last_item);
        }
        cursor.clone()
    }

    #[test]
    fn test_scroll_threshold() {
        let metrics = |top| ScrollMetrics { scroll_top: top, scroll_height: 1000.0, client_height: 500.0 };
        assert!(!metrics(600.0).past_threshold(0.8));
        assert!(!metrics(600.0 - 0.5).past_threshold(0.8));
        assert!(metrics(600.5).past_threshold(0.8));
    }

    #[test]
    fn test_starts_idle() {
        let source = RecordingSource::new(1, Some(2));
        let scroll = InfiniteScroll::new(&source, ScrollThresholds::default());
        assert_eq!(scroll.state(), ScrollState::Idle);
        assert!(!scroll.is_fetching());
        assert!(scroll.observation().is_none());
    }

    #[test]
    fn test_scroll_requests_next_page_for_current_term() {
        let source = RecordingSource::new(1, Some(2));
        let mut scroll = InfiniteScroll::new(&source, ScrollThresholds::default());

        assert!(scroll.on_scroll(bottom()));
        assert!(scroll.is_fetching());
        assert_eq!(*source.requests.borrow(), vec![(Some("heat".to_string()), 2)]);
    }

    #[test]
    fn test_scroll_above_threshold_does_nothing() {
        let source = RecordingSource::new(1, Some(2));
        let mut scroll = InfiniteScroll::new(&source, ScrollThresholds::default());

        let metrics = ScrollMetrics { scroll_top: 100.0, scroll_height: 1000.0, client_height: 500.0 };
        assert!(!scroll.on_scroll(metrics));
        assert!(source.requests.borrow().is_empty());
    }

    #[test]
    fn test_triggers_while_fetching_are_ignored() {
        let source = RecordingSource::new(1, Some(2));
        let mut scroll = InfiniteScroll::new(&source, ScrollThresholds::default());
        scroll.rebind(Some(20));

        assert!(scroll.on_scroll(bottom()));
        assert!(!scroll.on_scroll(bottom()));
        assert!(!scroll.on_intersection(seen(20)));
        assert!(!scroll.on_scroll(bottom()));

        assert_eq!(source.requests.borrow().len(), 1);
    }

    #[test]
    fn test_loading_cursor_does_not_release_lock() {
        let source = RecordingSource::new(1, Some(2));
        let mut scroll = InfiniteScroll::new(&source, ScrollThresholds::default());
        scroll.on_scroll(bottom());

        // Cursor taken before the requested fetch settled
        let cursor = (&source).cursor();
        scroll.on_cursor(&cursor);
        assert!(scroll.is_fetching());
    }

    #[test]
    fn test_success_releases_lock_and_rebinds() {
        let source = RecordingSource::new(1, Some(2));
        let mut scroll = InfiniteScroll::new(&source, ScrollThresholds::default());
        let first = scroll.rebind(Some(20)).unwrap();
        scroll.on_scroll(bottom());

        let cursor = settle(&source, FetchStatus::Success, 40, Some(3));
        scroll.on_cursor(&cursor);

        assert_eq!(scroll.state(), ScrollState::Idle);
        assert!(!first.is_active());
        let current = scroll.observation().unwrap();
        assert_eq!(current.target(), 40);
        assert!(current.is_active());

        // Old last item no longer counts, the new one does
        assert!(!scroll.on_intersection(seen(20)));
        assert!(scroll.on_intersection(seen(40)));
        assert_eq!(source.requests.borrow().last(), Some(&(Some("heat".to_string()), 3)));
    }

    #[test]
    fn test_error_releases_lock() {
        let source = RecordingSource::new(1, Some(2));
        let mut scroll = InfiniteScroll::new(&source, ScrollThresholds::default());
        scroll.on_scroll(bottom());

        let cursor = settle(&source, FetchStatus::Error, 0, None);
        scroll.on_cursor(&cursor);

        assert!(!scroll.is_fetching());
        // Retry is just another trigger
        assert!(scroll.on_scroll(bottom()));
        assert_eq!(source.requests.borrow().len(), 2);
    }

    #[test]
    fn test_last_page_triggers_nothing() {
        let source = RecordingSource::new(5, None);
        let mut scroll = InfiniteScroll::new(&source, ScrollThresholds::default());
        scroll.rebind(Some(20));

        assert!(!scroll.on_scroll(bottom()));
        assert!(!scroll.on_intersection(seen(20)));
        assert!(!scroll.is_fetching());
        assert!(source.requests.borrow().is_empty());
    }

    #[test]
    fn test_intersection_below_ratio_is_ignored() {
        let source = RecordingSource::new(1, Some(2));
        let mut scroll = InfiniteScroll::new(&source, ScrollThresholds::default());
        scroll.rebind(Some(20));

        let partly = IntersectionEntry { target: 20, is_intersecting: true, ratio: 0.5 };
        assert!(!scroll.on_intersection(partly));
        let gone = IntersectionEntry { target: 20, is_intersecting: false, ratio: 0.0 };
        assert!(!scroll.on_intersection(gone));
        assert!(source.requests.borrow().is_empty());
    }

    #[test]
    fn test_disconnected_observation_is_ignored() {
        let source = RecordingSource::new(1, Some(2));
        let mut scroll = InfiniteScroll::new(&source, ScrollThresholds::default());
        let handle = scroll.rebind(Some(20)).unwrap();

        scroll.disconnect();
        assert!(!handle.is_active());
        assert!(!scroll.on_intersection(seen(20)));
    }

    #[test]
    fn test_busy_catalog_blocks_trigger() {
        let source = RecordingSource::new(1, Some(2));
        source.cursor.borrow_mut().status = FetchStatus::Loading;
        let mut scroll = InfiniteScroll::new(&source, ScrollThresholds::default());

        assert!(!scroll.on_scroll(bottom()));
        assert!(!scroll.is_fetching());
    }

    #[test]
    fn test_thresholds_from_config() {
        let config = ScrollConfig { scroll_threshold_ratio: 0.5, intersection_threshold: 0.25 };
        let thresholds = ScrollThresholds::from(&config);
        assert_eq!(thresholds.scroll_ratio, 0.5);
        assert_eq!(thresholds.intersection_ratio, 0.25);
    }

    async fn wait_for_calls(api: &GatedCatalog, count: usize) {
        while api.calls().len() < count {
            yield_now().await;
        }
    }

    /// Feeds published cursors to `scroll` until its fetch settles.
    async fn follow(scroll: &mut InfiniteScroll<Arc<FetchController>>, cursors: &mut watch::Receiver<PageCursor>) {
        while scroll.is_fetching() {
            cursors.changed().await.unwrap();
            let cursor = cursors.borrow_and_update().clone();
            scroll.on_cursor(&cursor);
        }
    }

    #[tokio::test]
    async fn test_loads_next_page_through_controller() {
        let api = GatedCatalog::new();
        api.respond(discover(1), paged(1, &[1, 2], 2));
        let page2 = api.gate(discover(2));
        let controller = Arc::new(FetchController::new(api.clone()));
        let mut cursors = controller.subscribe();
        controller.search(None).await;

        let mut scroll = InfiniteScroll::new(controller.clone(), ScrollThresholds::default());
        scroll.on_cursor(&controller.cursor());
        assert_eq!(scroll.observation().map(Observation::target), Some(2));

        assert!(scroll.on_scroll(bottom()));
        assert!(!scroll.on_scroll(bottom()));
        assert!(!scroll.on_intersection(seen(2)));
        wait_for_calls(&api, 2).await;
        assert!(!scroll.on_scroll(bottom()));

        // Loading cursor does not release the lock
        scroll.on_cursor(&controller.cursor());
        assert!(scroll.is_fetching());
        assert_eq!(api.calls(), vec![discover(1), discover(2)]);

        page2.send(paged(2, &[3], 2)).unwrap();
        follow(&mut scroll, &mut cursors).await;

        assert_eq!(scroll.state(), ScrollState::Idle);
        assert_eq!(scroll.observation().map(Observation::target), Some(3));
        assert_eq!(controller.cursor().item_count, 3);

        // Last page: nothing more to ask for
        assert!(!scroll.on_intersection(seen(3)));
        assert!(!scroll.on_scroll(bottom()));
        yield_now().await;
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_new_search_releases_scroll_lock() {
        let api = GatedCatalog::new();
        api.respond(discover(1), paged(1, &[1, 2], 3));
        let _stale = api.gate(discover(2));
        api.respond(search("heat", 1), paged(1, &[7], 1));
        let controller = Arc::new(FetchController::new(api.clone()));
        let mut cursors = controller.subscribe();
        controller.search(None).await;

        let mut scroll = InfiniteScroll::new(controller.clone(), ScrollThresholds::default());
        scroll.on_cursor(&controller.cursor());
        assert!(scroll.on_scroll(bottom()));
        wait_for_calls(&api, 2).await;

        controller.search(Some("heat")).await;
        follow(&mut scroll, &mut cursors).await;

        assert!(!scroll.is_fetching());
        assert_eq!(scroll.observation().map(Observation::target), Some(7));
        let cursor = controller.cursor();
        assert_eq!(cursor.term.as_deref(), Some("heat"));
        assert_eq!(cursor.next_page, None);
    }
}
