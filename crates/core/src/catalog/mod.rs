//! Catalog service: listing and search, both ending in enrichment.

mod enrich;
mod sort;
mod types;

pub use enrich::{enrich, load_names, NameIndex};
pub use sort::sort_by_first_artist;
pub use types::*;

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, warn};

use crate::metrics::{SEARCHES_TOTAL, SEARCH_DURATION};
use crate::schema::{ID_COLUMN, LANGUAGE_COLUMN, MANGA_TABLE};
use crate::search::{FilterSet, ItemId, SearchEngine, SearchError};
use crate::store::{select_in, DataSource, Filter, SelectQuery, StoreError};

/// Default cap on listing results.
pub const LISTING_LIMIT: u32 = 1000;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Read-only access to the catalog over a [`DataSource`].
#[derive(Clone)]
pub struct MangaCatalog {
    source: Arc<dyn DataSource>,
    engine: SearchEngine,
    page_size: u32,
}

impl MangaCatalog {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            engine: SearchEngine::new(Arc::clone(&source)),
            source,
            page_size: LISTING_LIMIT,
        }
    }

    /// Override the listing cap.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// List up to `page_size` items, optionally filtered by language and sorted.
    pub async fn list(&self, query: &ListingQuery) -> Result<Vec<Manga>, CatalogError> {
        let mut select = SelectQuery::from(MANGA_TABLE).limit(self.page_size);

        if !query.languages.is_empty() {
            select = select.filter(Filter::is_in(LANGUAGE_COLUMN, query.languages.clone()).ignore_case());
        }

        // The artist key is derived, so it can only be ordered after enrichment.
        if let Some(SortKey::Column(column)) = &query.sort_key {
            select = select.order_by(column.as_str(), query.order);
        }

        let records = self.source.select(&select).await?;
        debug!(count = records.len(), "Listing fetched");

        let mut manga = enrich(self.source.as_ref(), records).await?;
        if query.sort_key == Some(SortKey::Artist) {
            sort_by_first_artist(&mut manga, query.order);
        }
        Ok(manga)
    }

    /// Run a field-scoped search query and return the enriched matches.
    pub async fn search(&self, raw_query: &str) -> Result<Vec<Manga>, CatalogError> {
        let start = Instant::now();
        let result = self.run_search(raw_query).await;
        SEARCH_DURATION.observe(start.elapsed().as_secs_f64());

        let outcome = match &result {
            Ok(Some(manga)) if !manga.is_empty() => "matched",
            Ok(Some(_)) => "no_match",
            Ok(None) => "empty_query",
            Err(e) => {
                warn!(query = %raw_query, error = %e, "Search failed");
                "error"
            }
        };
        SEARCHES_TOTAL.with_label_values(&[outcome]).inc();

        result.map(Option::unwrap_or_default)
    }

    /// `Ok(None)` when the query carried no usable filter.
    async fn run_search(&self, raw_query: &str) -> Result<Option<Vec<Manga>>, CatalogError> {
        let filters = FilterSet::parse(raw_query);
        if filters.is_empty() {
            debug!(query = %raw_query, "Query has no usable filters");
            return Ok(None);
        }

        let ids = self.engine.search(&filters).await?;
        if ids.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let ids: Vec<String> = ids.into_iter().map(ItemId::into_string).collect();
        let records = select_in(
            self.source.as_ref(),
            &SelectQuery::from(MANGA_TABLE),
            ID_COLUMN,
            &ids,
        )
        .await?;

        Ok(Some(enrich(self.source.as_ref(), records).await?))
    }
}
