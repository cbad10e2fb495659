use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use catalog_models::{CatalogItem, FetchStatus, ItemId};
use catalog_sources::{CatalogApi, CatalogError, CatalogQuery, CatalogResponse};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use crate::catalog_state::{CatalogPageState, ViewEvent};

/// Cheap summary of the catalog state, published after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageCursor {
    /// Term of the most recently issued query, `None` when browsing
    pub term: Option<String>,
    pub current_page: u32,
    pub next_page: Option<u32>,
    pub status: FetchStatus,
    pub item_count: usize,
    pub last_item: Option<ItemId>,
    /// Number of fetches that have settled (applied or failed) so far
    pub settled: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response (and any buffered successors) reached the state
    Applied,
    /// Waiting on an earlier request; applied once that one settles
    Buffered,
    /// The query was superseded by a different search term
    Discarded,
}

#[derive(Debug, Clone, Copy)]
struct Ticket {
    generation: u64,
    seq: u64,
}

enum Settlement {
    Response(CatalogResponse),
    Failed(CatalogError),
}

struct Inner {
    state: CatalogPageState,
    term: Option<String>,
    generation: u64,
    next_seq: u64,
    settled: u64,
    // Status after the last applied settlement, restored when requests are dropped
    resting: FetchStatus,
    // Requests of the current generation in issue order; `None` while in flight
    in_flight: BTreeMap<u64, Option<Settlement>>,
}

impl Inner {
    fn issue(&mut self, query: &CatalogQuery) -> Ticket {
        let term = query.term().map(str::to_string);
        // A new term or a first page starts the listing over
        if term != self.term || query.page() == 1 {
            if !self.in_flight.is_empty() {
                debug!(
                    "Listing reset ({:?} -> {:?}, page {}), abandoning {} in-flight requests",
                    self.term,
                    term,
                    query.page(),
                    self.in_flight.len()
                );
            }
            self.generation += 1;
            self.term = term;
            self.in_flight.clear();
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight.insert(seq, None);
        self.state.pending();
        Ticket { generation: self.generation, seq }
    }

    fn settle(&mut self, ticket: Ticket, settlement: Settlement) -> (FetchOutcome, Vec<ViewEvent>) {
        if ticket.generation != self.generation {
            return (FetchOutcome::Discarded, Vec::new());
        }
        match self.in_flight.get_mut(&ticket.seq) {
            Some(slot) => *slot = Some(settlement),
            None => return (FetchOutcome::Discarded, Vec::new()),
        }

        let events = self.drain();
        if self.in_flight.contains_key(&ticket.seq) {
            debug!("Response #{} buffered behind an earlier request", ticket.seq);
            (FetchOutcome::Buffered, events)
        } else {
            (FetchOutcome::Applied, events)
        }
    }

    /// Forgets a request that will never settle and applies whatever was
    /// buffered behind it. `None` if the request no longer counts.
    fn abandon(&mut self, ticket: Ticket) -> Option<Vec<ViewEvent>> {
        if ticket.generation != self.generation {
            return None;
        }
        match self.in_flight.get(&ticket.seq) {
            Some(None) => {
                self.in_flight.remove(&ticket.seq);
            }
            _ => return None,
        }
        debug!("Request #{} dropped before it settled", ticket.seq);
        self.settled += 1;

        let events = self.drain();
        if self.in_flight.is_empty() && self.state.status() == FetchStatus::Loading {
            self.state.cancelled(self.resting);
        }
        Some(events)
    }

    /// Applies settled requests from the front of the queue, stopping at
    /// the first one still in flight.
    fn drain(&mut self) -> Vec<ViewEvent> {
        let mut events = Vec::new();
        while let Some(mut entry) = self.in_flight.first_entry() {
            let Some(settlement) = entry.get_mut().take() else {
                break;
            };
            entry.remove();

            match settlement {
                Settlement::Response(response) => events.extend(self.state.fulfilled(response)),
                Settlement::Failed(error) => self.state.rejected(&error),
            }
            self.settled += 1;
            self.resting = self.state.status();
        }
        events
    }

    fn cursor(&self) -> PageCursor {
        PageCursor {
            term: self.term.clone(),
            current_page: self.state.current_page(),
            next_page: self.state.next_page(),
            status: self.state.status(),
            item_count: self.state.items().len(),
            last_item: self.state.last_item_id(),
            settled: self.settled,
        }
    }
}

/// Runs catalog queries and folds their results into `CatalogPageState`.
///
/// Overlapping queries are allowed. Results are applied in the order the
/// queries were issued. A query for a new term, or for a first page, starts
/// a new listing and responses to earlier queries are dropped.
pub struct FetchController {
    api: Arc<dyn CatalogApi>,
    inner: Mutex<Inner>,
    cursor_tx: watch::Sender<PageCursor>,
    events_tx: broadcast::Sender<ViewEvent>,
}

/// Releases a query's place in line if its future is dropped mid-flight.
struct PendingQuery<'a> {
    controller: &'a FetchController,
    ticket: Ticket,
    settled: bool,
}

impl Drop for PendingQuery<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.controller.lock();
        let Some(events) = inner.abandon(self.ticket) else {
            return;
        };
        self.controller.cursor_tx.send_replace(inner.cursor());
        drop(inner);
        self.controller.publish(events);
    }
}

impl FetchController {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        let inner = Inner {
            state: CatalogPageState::new(),
            term: None,
            generation: 0,
            next_seq: 0,
            settled: 0,
            resting: FetchStatus::Idle,
            in_flight: BTreeMap::new(),
        };
        let (cursor_tx, _) = watch::channel(inner.cursor());
        let (events_tx, _) = broadcast::channel(16);
        Self {
            api,
            inner: Mutex::new(inner),
            cursor_tx,
            events_tx,
        }
    }

    pub fn api(&self) -> &Arc<dyn CatalogApi> {
        &self.api
    }

    // Never held across an await
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, events: Vec<ViewEvent>) {
        for event in events {
            // No subscribers is fine
            let _ = self.events_tx.send(event);
        }
    }

    /// Fetches `page` of the search for `term`, or of discover when the
    /// term is blank. Failures are recorded in the state, not returned.
    pub async fn query(&self, term: Option<&str>, page: u32) -> FetchOutcome {
        let query = CatalogQuery::new(term, page);
        let ticket = {
            let mut inner = self.lock();
            let ticket = inner.issue(&query);
            self.cursor_tx.send_replace(inner.cursor());
            ticket
        };
        let mut pending = PendingQuery { controller: self, ticket, settled: false };

        let settlement = match self.api.fetch_page(&query).await {
            Ok(response) => Settlement::Response(response),
            Err(error) => Settlement::Failed(error),
        };
        pending.settled = true;

        let mut inner = self.lock();
        let (outcome, events) = inner.settle(ticket, settlement);
        match outcome {
            FetchOutcome::Discarded => {
                warn!("Dropping stale response for {:?}", query);
            }
            FetchOutcome::Applied | FetchOutcome::Buffered => {
                self.cursor_tx.send_replace(inner.cursor());
            }
        }
        drop(inner);

        self.publish(events);
        outcome
    }

    /// Starts a new listing for `term` from the first page.
    pub async fn search(&self, term: Option<&str>) -> FetchOutcome {
        self.query(term, 1).await
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PageCursor> {
        self.cursor_tx.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<ViewEvent> {
        self.events_tx.subscribe()
    }

    pub async fn snapshot(&self) -> CatalogPageState {
        self.lock().state.clone()
    }

    pub async fn items(&self) -> Vec<CatalogItem> {
        self.lock().state.items().to_vec()
    }

    pub async fn find_item(&self, id: ItemId) -> Option<CatalogItem> {
        let found = self.lock().state.items().iter().find(|item| item.id == id).cloned();
        if found.is_none() {
            info!("Item {} is not in the current listing", id);
        }
        found
    }
}

impl std::fmt::Debug for FetchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchController")
            .field("catalog", &self.api.catalog_name())
            .field("cursor", &*self.cursor_tx.borrow())
            .finish()
    }
}
