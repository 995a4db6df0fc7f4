//! Per-key candidate resolution.

use tracing::debug;

use super::{intersect_all, FilterKey, IdSet, ItemId, SearchError};
use crate::metrics::SEARCH_SHORT_CIRCUITS;
use crate::schema::{
    ReferenceKind, ID_COLUMN, JOIN_ITEM_COLUMN, MANGA_TABLE, NAME_COLUMN, TITLE_COLUMN,
};
use crate::store::{select_in, DataSource, Filter, SelectQuery};

impl FilterKey {
    /// Resolve this key's values to the items satisfying all of them.
    ///
    /// `Ok(None)` means the key is unconstrained (no values).
    pub async fn resolve(
        self,
        source: &dyn DataSource,
        values: &[String],
    ) -> Result<Option<IdSet>, SearchError> {
        if values.is_empty() {
            return Ok(None);
        }

        match self {
            FilterKey::Title => resolve_title(source, values).await.map(Some),
            FilterKey::Id => Ok(resolve_ids(values)),
            FilterKey::Tag => resolve_reference(source, self, ReferenceKind::Tag, values).await,
            FilterKey::Character => {
                resolve_reference(source, self, ReferenceKind::Character, values).await
            }
            FilterKey::Artist => {
                resolve_reference(source, self, ReferenceKind::Artist, values).await
            }
            FilterKey::Group => resolve_reference(source, self, ReferenceKind::Group, values).await,
            FilterKey::Parody => {
                resolve_reference(source, self, ReferenceKind::Parody, values).await
            }
        }
    }
}

/// Items linked to every value through `kind`'s join table.
async fn resolve_reference(
    source: &dyn DataSource,
    key: FilterKey,
    kind: ReferenceKind,
    values: &[String],
) -> Result<Option<IdSet>, SearchError> {
    let mut per_value = Vec::with_capacity(values.len());

    for value in values {
        let references = source
            .select(
                &SelectQuery::from(kind.reference_table())
                    .columns([ID_COLUMN])
                    .filter(Filter::eq(NAME_COLUMN, value.as_str()).ignore_case()),
            )
            .await?;

        let reference_ids: Vec<String> = references
            .iter()
            .filter_map(|row| row.get(ID_COLUMN).and_then(ItemId::from_value))
            .map(ItemId::into_string)
            .collect();

        // Any unmatched value empties the key; skip the remaining lookups.
        if reference_ids.is_empty() {
            debug!(key = %key, value = %value, "No reference row matched, short-circuiting");
            SEARCH_SHORT_CIRCUITS.with_label_values(&[key.as_str()]).inc();
            return Ok(Some(IdSet::new()));
        }

        let links = select_in(
            source,
            &SelectQuery::from(kind.join_table()).columns([JOIN_ITEM_COLUMN]),
            kind.foreign_key(),
            &reference_ids,
        )
        .await?;

        let items: IdSet = links
            .iter()
            .filter_map(|row| row.get(JOIN_ITEM_COLUMN).and_then(ItemId::from_value))
            .collect();

        debug!(key = %key, value = %value, matches = items.len(), "Resolved filter value");
        per_value.push(items);
    }

    Ok(intersect_all(per_value))
}

/// One case-insensitive substring lookup for the whole title phrase.
async fn resolve_title(source: &dyn DataSource, values: &[String]) -> Result<IdSet, SearchError> {
    let phrase = values.join(" ");
    let rows = source
        .select(
            &SelectQuery::from(MANGA_TABLE)
                .columns([ID_COLUMN])
                .filter(Filter::contains(TITLE_COLUMN, phrase.as_str())),
        )
        .await?;

    let items: IdSet = rows
        .iter()
        .filter_map(|row| row.get(ID_COLUMN).and_then(ItemId::from_value))
        .collect();

    debug!(phrase = %phrase, matches = items.len(), "Resolved title phrase");
    Ok(items)
}

/// Identifiers taken verbatim from the query; repeats are intersected.
fn resolve_ids(values: &[String]) -> Option<IdSet> {
    intersect_all(
        values
            .iter()
            .map(|value| IdSet::from_values([ItemId::parse(value)])),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockDataSource};
    use std::sync::Arc;

    fn ids(values: &[&str]) -> IdSet {
        values.iter().map(|v| ItemId::new(*v)).collect()
    }

    fn values(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_no_values_is_unconstrained() {
        let store = fixtures::sample_store();
        for key in FilterKey::ALL {
            assert_eq!(key.resolve(&store, &[]).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_single_tag() {
        let store = fixtures::sample_store();
        let result = FilterKey::Tag.resolve(&store, &values(&["dog"])).await.unwrap();
        assert_eq!(result, Some(ids(&["1", "2", "4"])));
    }

    #[tokio::test]
    async fn test_reference_name_is_case_insensitive() {
        let store = fixtures::sample_store();
        let result = FilterKey::Artist
            .resolve(&store, &values(&["HYJI"]))
            .await
            .unwrap();
        assert_eq!(result, Some(ids(&["1", "4"])));
    }

    #[tokio::test]
    async fn test_repeated_values_intersect() {
        let store = fixtures::sample_store();
        let result = FilterKey::Tag
            .resolve(&store, &values(&["dog", "cat"]))
            .await
            .unwrap();
        assert_eq!(result, Some(ids(&["1", "4"])));
    }

    #[tokio::test]
    async fn test_unmatched_value_short_circuits() {
        let store = Arc::new(fixtures::sample_store());
        let mock = MockDataSource::new(store);

        let result = FilterKey::Tag
            .resolve(&mock, &values(&["nonexistent", "dog", "cat"]))
            .await
            .unwrap();

        assert_eq!(result, Some(IdSet::new()));
        // Only the first reference lookup ran.
        assert_eq!(mock.queried_tables(), vec!["tags"]);
    }

    #[tokio::test]
    async fn test_group_and_parody_and_character_keys() {
        let store = fixtures::sample_store();
        assert_eq!(
            FilterKey::Group.resolve(&store, &values(&["circle-k"])).await.unwrap(),
            Some(ids(&["1", "2"]))
        );
        assert_eq!(
            FilterKey::Parody.resolve(&store, &values(&["original"])).await.unwrap(),
            Some(ids(&["5"]))
        );
        assert_eq!(
            FilterKey::Character.resolve(&store, &values(&["neko"])).await.unwrap(),
            Some(ids(&["1", "3"]))
        );
    }

    #[tokio::test]
    async fn test_title_is_phrase_substring_not_per_word() {
        let store = fixtures::sample_store();
        // "Cat And Dog" (4) has both words but not the phrase "cat dog".
        let result = FilterKey::Title
            .resolve(&store, &values(&["cat", "dog"]))
            .await
            .unwrap();
        assert_eq!(result, Some(ids(&["1"])));
    }

    #[tokio::test]
    async fn test_title_single_word_matches_many() {
        let store = fixtures::sample_store();
        let result = FilterKey::Title
            .resolve(&store, &values(&["cat"]))
            .await
            .unwrap();
        assert_eq!(result, Some(ids(&["1", "3", "4"])));
    }

    #[tokio::test]
    async fn test_ids_need_no_lookup() {
        let store = Arc::new(fixtures::sample_store());
        let mock = MockDataSource::new(store);

        let result = FilterKey::Id.resolve(&mock, &values(&["2"])).await.unwrap();
        assert_eq!(result, Some(ids(&["2"])));
        assert!(mock.queried_tables().is_empty());
    }

    #[test]
    fn test_repeated_ids_intersect() {
        assert_eq!(resolve_ids(&values(&["1", "1"])), Some(ids(&["1"])));
        assert_eq!(resolve_ids(&values(&["1", "2"])), Some(IdSet::new()));
    }

    #[test]
    fn test_id_spellings_name_the_same_item() {
        assert_eq!(resolve_ids(&values(&["01", "1"])), Some(ids(&["1"])));
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let store = Arc::new(fixtures::sample_store());
        let mock = MockDataSource::new(store).fail_on_table("manga_artists");

        let result = FilterKey::Artist.resolve(&mock, &values(&["hyji"])).await;
        assert!(matches!(result, Err(SearchError::Store(_))));
    }
}
