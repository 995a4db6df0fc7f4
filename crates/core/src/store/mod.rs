//! Relational data source abstraction.
//!
//! The search and listing paths only ever need "select columns from a table
//! with equality / membership / substring filters, optionally ordered and
//! limited". `DataSource` captures exactly that so the core can run against
//! SQLite in production and against wrappers in tests.

mod sqlite;
mod types;

pub use sqlite::SqliteStore;
pub use types::*;

use async_trait::async_trait;

/// Read-only, filter-and-fetch access to the catalog tables.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Run a select and return one record per matching row.
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Record>, StoreError>;
}

/// Upper bound on values bound into a single `IN (...)` list.
pub const MAX_IN_VALUES: usize = 500;

/// Run `query` with an added `column IN (values)` filter, splitting `values`
/// into chunks of [`MAX_IN_VALUES`]. Returns no rows for an empty list
/// without touching the source.
pub async fn select_in(
    source: &dyn DataSource,
    query: &SelectQuery,
    column: &str,
    values: &[String],
) -> Result<Vec<Record>, StoreError> {
    let mut records = Vec::new();
    for chunk in values.chunks(MAX_IN_VALUES) {
        let chunk_query = query
            .clone()
            .filter(Filter::is_in(column, chunk.iter().cloned()));
        records.extend(source.select(&chunk_query).await?);
    }
    Ok(records)
}
