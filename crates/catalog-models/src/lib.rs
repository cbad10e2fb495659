pub mod catalog_item;
pub mod list_entry;
pub mod status;
pub mod video;

pub use catalog_item::{CatalogItem, ItemId};
pub use list_entry::ListEntry;
pub use status::FetchStatus;
pub use video::{Video, VideoList};
