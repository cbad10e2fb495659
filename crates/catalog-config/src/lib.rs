pub mod config;
pub mod paths;

pub use config::{CatalogConfig, Config, LoggingConfig, ScrollConfig, API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_POSTER_BASE_URL};
pub use paths::{base_path_override, PathManager};
