//! Types for catalog listing and search results.

use serde::Serialize;

use crate::schema::ID_COLUMN;
use crate::search::ItemId;
use crate::store::{Record, SortDirection};

/// Derived sort key name accepted by the listing endpoint.
pub const ARTIST_SORT_KEY: &str = "Artist";

/// An item record with its tag and artist names attached.
#[derive(Debug, Clone, Serialize)]
pub struct Manga {
    /// Stored columns, passed through as-is.
    #[serde(flatten)]
    pub fields: Record,
    pub tags: Vec<String>,
    pub artist: Vec<String>,
}

impl Manga {
    pub fn new(mut fields: Record, tags: Vec<String>, artist: Vec<String>) -> Self {
        // Attached arrays win over any stored column of the same name.
        fields.remove("tags");
        fields.remove("artist");
        Self {
            fields,
            tags,
            artist,
        }
    }

    pub fn id(&self) -> Option<ItemId> {
        self.fields.get(ID_COLUMN).and_then(ItemId::from_value)
    }

    pub fn first_artist(&self) -> Option<&str> {
        self.artist.first().map(String::as_str)
    }
}

/// How the listing should be ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// A stored column, ordered by the data source.
    Column(String),
    /// First artist name, ordered in memory after enrichment.
    Artist,
}

impl SortKey {
    /// `None` for a missing or blank `sortBy`.
    pub fn from_param(value: Option<&str>) -> Option<Self> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        if value == ARTIST_SORT_KEY {
            Some(SortKey::Artist)
        } else {
            Some(SortKey::Column(value.to_string()))
        }
    }
}

/// Parameters of the listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub sort_key: Option<SortKey>,
    pub order: SortDirection,
    /// Lowercased language codes; empty means any language.
    pub languages: Vec<String>,
}

impl ListingQuery {
    /// Build from raw `sortBy`, `order` and comma-separated `language` params.
    pub fn from_params(sort_by: Option<&str>, order: Option<&str>, language: Option<&str>) -> Self {
        let languages = language
            .map(|codes| {
                codes
                    .split(',')
                    .map(|code| code.trim().to_lowercase())
                    .filter(|code| !code.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            sort_key: SortKey::from_param(sort_by),
            order: SortDirection::from_param(order),
            languages,
        }
    }
}
