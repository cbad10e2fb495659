pub mod catalog_state;
pub mod fetch;
pub mod lists;
pub mod scroll;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog_state::{CatalogPageState, ViewEvent};
pub use fetch::{FetchController, FetchOutcome, PageCursor};
pub use lists::{AddOutcome, ListStore};
pub use scroll::{InfiniteScroll, IntersectionEntry, Observation, PageSource, ScrollMetrics, ScrollState, ScrollThresholds};
pub use store::AppStore;
