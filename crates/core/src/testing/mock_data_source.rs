//! Mock data source for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::store::{DataSource, Record, SelectQuery, StoreError};

/// Wraps a real data source, recording every select and optionally failing
/// selects against one table.
///
/// # Example
///
/// ```rust,ignore
/// use mangashelf_core::testing::{fixtures, MockDataSource};
///
/// let mock = MockDataSource::new(Arc::new(fixtures::sample_store()))
///     .fail_on_table("manga_artists");
///
/// let result = FilterKey::Artist.resolve(&mock, &["hyji".into()]).await;
/// assert!(result.is_err());
/// assert_eq!(mock.queried_tables(), vec!["artists", "manga_artists"]);
/// ```
pub struct MockDataSource {
    inner: Arc<dyn DataSource>,
    /// Selects against this table fail with a database error.
    fail_table: Option<String>,
    /// Recorded selects, in call order.
    queries: Mutex<Vec<SelectQuery>>,
}

impl std::fmt::Debug for MockDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDataSource")
            .field("inner", &"<data source>")
            .field("fail_table", &self.fail_table)
            .finish()
    }
}

impl MockDataSource {
    pub fn new(inner: Arc<dyn DataSource>) -> Self {
        Self {
            inner,
            fail_table: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Make every select against `table` fail.
    pub fn fail_on_table(mut self, table: impl Into<String>) -> Self {
        self.fail_table = Some(table.into());
        self
    }

    /// All recorded selects.
    pub fn recorded_queries(&self) -> Vec<SelectQuery> {
        self.queries.lock().unwrap().clone()
    }

    /// Tables hit by recorded selects, in call order.
    pub fn queried_tables(&self) -> Vec<String> {
        self.recorded_queries()
            .into_iter()
            .map(|query| query.table)
            .collect()
    }

    /// Forget recorded selects.
    pub fn reset(&self) {
        self.queries.lock().unwrap().clear();
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Record>, StoreError> {
        self.queries.lock().unwrap().push(query.clone());

        if self.fail_table.as_deref() == Some(query.table.as_str()) {
            return Err(StoreError::Database(format!(
                "simulated failure on table {}",
                query.table
            )));
        }

        self.inner.select(query).await
    }
}
