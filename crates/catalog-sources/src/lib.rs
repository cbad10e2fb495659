pub mod error;
pub mod query;
pub mod response;
pub mod tmdb;
pub mod trailer;
pub mod traits;

pub use error::{CatalogError, ErrorKind};
pub use query::CatalogQuery;
pub use response::{CatalogResponse, PagedResult};
pub use tmdb::TmdbClient;
pub use trailer::{resolve_trailer, select_trailer, TrailerResolution};
pub use traits::CatalogApi;
