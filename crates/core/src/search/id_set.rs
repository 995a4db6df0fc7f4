//! Item identifier sets and their algebra.

use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Canonical text form of an item identifier.
///
/// Stores may hand back integer or text keys; both normalize to the same
/// string so `id:42` and an INTEGER primary key 42 compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Read an identifier out of a column value. Null and structured values
    /// are not identifiers.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) => Some(Self(s.clone())),
            _ => None,
        }
    }

    /// Read an identifier typed by a user. Integer text is re-rendered so
    /// `01` and `+1` name the same item as the INTEGER key 1.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.parse::<i64>() {
            Ok(n) => Self(n.to_string()),
            Err(_) => Self(text.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of item identifiers satisfying one filter key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet(BTreeSet<ItemId>);

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = ItemId>,
    {
        Self(ids.into_iter().collect())
    }

    pub fn intersect(&self, other: &IdSet) -> IdSet {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.0.contains(id)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, ItemId> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<ItemId> {
        self.0.into_iter().collect()
    }
}

impl FromIterator<ItemId> for IdSet {
    fn from_iter<T: IntoIterator<Item = ItemId>>(iter: T) -> Self {
        Self::from_values(iter)
    }
}

impl IntoIterator for IdSet {
    type Item = ItemId;
    type IntoIter = btree_set::IntoIter<ItemId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Intersect every set. `None` when there were no sets at all; stops at the
/// first empty intermediate result.
pub fn intersect_all<I>(sets: I) -> Option<IdSet>
where
    I: IntoIterator<Item = IdSet>,
{
    let mut sets = sets.into_iter();
    let mut acc = sets.next()?;
    for set in sets {
        if acc.is_empty() {
            break;
        }
        acc = acc.intersect(&set);
    }
    Some(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(values: &[&str]) -> IdSet {
        values.iter().map(|v| ItemId::new(*v)).collect()
    }

    #[test]
    fn test_item_id_from_value() {
        assert_eq!(ItemId::from_value(&json!(42)), Some(ItemId::new("42")));
        assert_eq!(ItemId::from_value(&json!("42")), Some(ItemId::new("42")));
        assert_eq!(ItemId::from_value(&json!(null)), None);
        assert_eq!(ItemId::from_value(&json!([1])), None);
    }

    #[test]
    fn test_item_id_parse_canonicalizes_integers() {
        assert_eq!(ItemId::parse("01"), ItemId::new("1"));
        assert_eq!(ItemId::parse("+42"), ItemId::from_value(&json!(42)).unwrap());
        assert_eq!(ItemId::parse("-0"), ItemId::new("0"));
        assert_eq!(ItemId::parse("abc-1"), ItemId::new("abc-1"));
    }

    #[test]
    fn test_intersect() {
        let a = ids(&["1", "2", "3"]);
        let b = ids(&["2", "3", "4"]);
        assert_eq!(a.intersect(&b), ids(&["2", "3"]));
    }

    #[test]
    fn test_intersect_all_none_without_sets() {
        assert_eq!(intersect_all(Vec::new()), None);
    }

    #[test]
    fn test_intersect_all_single_set() {
        assert_eq!(intersect_all(vec![ids(&["1"])]), Some(ids(&["1"])));
    }

    #[test]
    fn test_intersect_all_is_intersection_not_union() {
        let result = intersect_all(vec![ids(&["1", "2"]), ids(&["2", "3"]), ids(&["2", "4"])]);
        assert_eq!(result, Some(ids(&["2"])));
    }

    #[test]
    fn test_intersect_all_empty_operand_empties_result() {
        let result = intersect_all(vec![ids(&["1"]), IdSet::new(), ids(&["1"])]);
        assert_eq!(result, Some(IdSet::new()));
    }

    #[test]
    fn test_into_vec_is_sorted_and_deduplicated() {
        let set = IdSet::from_values(vec![ItemId::new("b"), ItemId::new("a"), ItemId::new("b")]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.into_vec(), vec![ItemId::new("a"), ItemId::new("b")]);
    }
}
