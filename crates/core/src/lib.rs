pub mod catalog;
pub mod config;
pub mod metrics;
pub mod proxy;
pub mod schema;
pub mod search;
pub mod store;
pub mod testing;

pub use catalog::{
    enrich, sort_by_first_artist, CatalogError, ListingQuery, Manga, MangaCatalog, SortKey,
    ARTIST_SORT_KEY, LISTING_LIMIT,
};
pub use config::{
    load_config, load_config_from_str, validate_config, CatalogConfig, Config, ConfigError,
    CorsConfig, DatabaseConfig, ProxyConfig, ServerConfig,
};
pub use proxy::{ImageProxy, ProxyError, UpstreamImage};
pub use schema::ReferenceKind;
pub use search::{FilterKey, FilterSet, IdSet, ItemId, SearchEngine, SearchError};
pub use store::{
    DataSource, Filter, FilterOp, Record, SelectQuery, SortDirection, SqliteStore, StoreError,
};
