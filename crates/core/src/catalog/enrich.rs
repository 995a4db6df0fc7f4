//! Attaches tag and artist names to fetched item records.

use std::collections::{BTreeSet, HashMap};

use futures::try_join;

use super::Manga;
use crate::schema::{ReferenceKind, ID_COLUMN, JOIN_ITEM_COLUMN, NAME_COLUMN};
use crate::search::ItemId;
use crate::store::{select_in, DataSource, Record, SelectQuery, StoreError};

/// Reference names per item, in join-row order.
pub type NameIndex = HashMap<ItemId, Vec<String>>;

/// Enrich `records` with `tags` and `artist` arrays, keeping their order.
pub async fn enrich(
    source: &dyn DataSource,
    records: Vec<Record>,
) -> Result<Vec<Manga>, StoreError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = records
        .iter()
        .filter_map(|record| record.get(ID_COLUMN).and_then(ItemId::from_value))
        .map(ItemId::into_string)
        .collect();

    let (tags, artists) = try_join!(
        load_names(source, ReferenceKind::Tag, &ids),
        load_names(source, ReferenceKind::Artist, &ids),
    )?;

    Ok(records
        .into_iter()
        .map(|record| {
            let id = record.get(ID_COLUMN).and_then(ItemId::from_value);
            let names = |index: &NameIndex| {
                id.as_ref()
                    .and_then(|id| index.get(id))
                    .cloned()
                    .unwrap_or_default()
            };
            let item_tags = names(&tags);
            let item_artists = names(&artists);
            Manga::new(record, item_tags, item_artists)
        })
        .collect())
}

/// Build the item → names index for one reference kind.
///
/// Links to a missing reference row, or to one without a name, are skipped.
pub async fn load_names(
    source: &dyn DataSource,
    kind: ReferenceKind,
    item_ids: &[String],
) -> Result<NameIndex, StoreError> {
    let links = select_in(
        source,
        &SelectQuery::from(kind.join_table()).columns([JOIN_ITEM_COLUMN, kind.foreign_key()]),
        JOIN_ITEM_COLUMN,
        item_ids,
    )
    .await?;

    let reference_ids: Vec<String> = links
        .iter()
        .filter_map(|link| link.get(kind.foreign_key()).and_then(ItemId::from_value))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(ItemId::into_string)
        .collect();

    let references = select_in(
        source,
        &SelectQuery::from(kind.reference_table()).columns([ID_COLUMN, NAME_COLUMN]),
        ID_COLUMN,
        &reference_ids,
    )
    .await?;

    let names: HashMap<ItemId, String> = references
        .iter()
        .filter_map(|row| {
            let id = row.get(ID_COLUMN).and_then(ItemId::from_value)?;
            let name = row.get(NAME_COLUMN)?.as_str()?;
            Some((id, name.to_string()))
        })
        .collect();

    let mut index = NameIndex::new();
    for link in &links {
        let item = link.get(JOIN_ITEM_COLUMN).and_then(ItemId::from_value);
        let reference = link.get(kind.foreign_key()).and_then(ItemId::from_value);
        if let (Some(item), Some(name)) = (item, reference.and_then(|r| names.get(&r))) {
            index.entry(item).or_default().push(name.clone());
        }
    }

    Ok(index)
}
