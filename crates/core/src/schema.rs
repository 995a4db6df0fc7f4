//! Table and column names of the catalog schema.

/// Item table.
pub const MANGA_TABLE: &str = "manga";
/// Primary key column shared by items and reference tables.
pub const ID_COLUMN: &str = "id";
/// Display name column of every reference table.
pub const NAME_COLUMN: &str = "name";
pub const TITLE_COLUMN: &str = "title";
pub const LANGUAGE_COLUMN: &str = "language";
/// Item foreign key in every join table.
pub const JOIN_ITEM_COLUMN: &str = "manga_id";

/// A named entity linked to items many-to-many through a join table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceKind {
    Tag,
    Character,
    Artist,
    Group,
    Parody,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 5] = [
        ReferenceKind::Tag,
        ReferenceKind::Character,
        ReferenceKind::Artist,
        ReferenceKind::Group,
        ReferenceKind::Parody,
    ];

    pub fn reference_table(&self) -> &'static str {
        match self {
            ReferenceKind::Tag => "tags",
            ReferenceKind::Character => "characters",
            ReferenceKind::Artist => "artists",
            ReferenceKind::Group => "groups",
            ReferenceKind::Parody => "parodies",
        }
    }

    pub fn join_table(&self) -> &'static str {
        match self {
            ReferenceKind::Tag => "manga_tags",
            ReferenceKind::Character => "manga_characters",
            ReferenceKind::Artist => "manga_artists",
            ReferenceKind::Group => "manga_groups",
            ReferenceKind::Parody => "manga_parodies",
        }
    }

    /// Column in the join table pointing at the reference row.
    pub fn foreign_key(&self) -> &'static str {
        match self {
            ReferenceKind::Tag => "tag_id",
            ReferenceKind::Character => "character_id",
            ReferenceKind::Artist => "artist_id",
            ReferenceKind::Group => "group_id",
            ReferenceKind::Parody => "parody_id",
        }
    }
}
