//! Resolves a [`FilterSet`] to the final list of matching item ids.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use super::{intersect_all, FilterKey, FilterSet, IdSet, ItemId, SearchError};
use crate::store::DataSource;

/// Runs the per-key resolvers and combines their candidate sets.
#[derive(Clone)]
pub struct SearchEngine {
    source: Arc<dyn DataSource>,
}

impl SearchEngine {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    /// Ids matching every constrained key, or nothing when no key is
    /// constrained. Any lookup failure fails the whole search.
    pub async fn search(&self, filters: &FilterSet) -> Result<Vec<ItemId>, SearchError> {
        let source = self.source.as_ref();

        // Keys are independent of each other; values within a key are not.
        let candidates = try_join_all(
            FilterKey::ALL
                .iter()
                .map(|key| key.resolve(source, filters.values(*key))),
        )
        .await?;

        let ids = combine(candidates).map(IdSet::into_vec).unwrap_or_default();
        debug!(
            keys = ?filters.keys().collect::<Vec<_>>(),
            matches = ids.len(),
            "Search resolved"
        );
        Ok(ids)
    }
}

/// AND the candidate sets of all constrained keys. `None` when no key was
/// constrained.
pub fn combine<I>(candidates: I) -> Option<IdSet>
where
    I: IntoIterator<Item = Option<IdSet>>,
{
    intersect_all(candidates.into_iter().flatten())
}
