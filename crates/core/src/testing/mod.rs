//! Testing utilities: catalog fixtures and a mock data source.
//!
//! # Example
//!
//! ```rust,ignore
//! use mangashelf_core::testing::{fixtures, MockDataSource};
//!
//! let store = Arc::new(fixtures::sample_store());
//! let catalog = MangaCatalog::new(store);
//! let results = catalog.search("artist:hyji").await?;
//! ```

mod mock_data_source;

pub use mock_data_source::MockDataSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::store::SqliteStore;

    /// Seed data for [`sample_store`].
    ///
    /// | id | title              | lang | pages | tags              | artist |
    /// |----|--------------------|------|-------|-------------------|--------|
    /// | 1  | Cat Dog Adventures | en   | 20    | dog, cat, comedy  | hyji   |
    /// | 2  | Dog Days           | jp   | 35    | dog               | aoi    |
    /// | 3  | The Cat Returns    | en   | 12    | cat               | zed    |
    /// | 4  | Cat And Dog        | EN   | 14    | cat, dog          | hyji   |
    /// | 5  | Lonely Robot       | fr   | 18    | robot             | -      |
    ///
    /// Characters: neko → 1, 3. Groups: circle-k → 1, 2. Parodies: original → 5.
    pub const SAMPLE_CATALOG_SQL: &str = r#"
        INSERT INTO manga (id, title, language, pages, favorites, cover_url) VALUES
            (1, 'Cat Dog Adventures', 'en', 20, 120, 'https://img.example.org/1.jpg'),
            (2, 'Dog Days', 'jp', 35, 80, 'https://img.example.org/2.jpg'),
            (3, 'The Cat Returns', 'en', 12, 45, 'https://img.example.org/3.jpg'),
            (4, 'Cat And Dog', 'EN', 14, 300, 'https://img.example.org/4.jpg'),
            (5, 'Lonely Robot', 'fr', 18, 5, NULL);

        INSERT INTO tags (id, name) VALUES (1, 'dog'), (2, 'cat'), (3, 'robot'), (4, 'comedy');
        INSERT INTO artists (id, name) VALUES (1, 'hyji'), (2, 'aoi'), (3, 'zed');
        INSERT INTO characters (id, name) VALUES (1, 'neko');
        INSERT INTO "groups" (id, name) VALUES (1, 'circle-k');
        INSERT INTO parodies (id, name) VALUES (1, 'original');

        INSERT INTO manga_tags (manga_id, tag_id) VALUES
            (1, 1), (1, 2), (2, 1), (3, 2), (4, 2), (4, 1), (5, 3), (1, 4);
        INSERT INTO manga_artists (manga_id, artist_id) VALUES (1, 1), (2, 2), (3, 3), (4, 1);
        INSERT INTO manga_characters (manga_id, character_id) VALUES (1, 1), (3, 1);
        INSERT INTO manga_groups (manga_id, group_id) VALUES (1, 1), (2, 1);
        INSERT INTO manga_parodies (manga_id, parody_id) VALUES (5, 1);
    "#;

    /// In-memory store seeded with [`SAMPLE_CATALOG_SQL`].
    pub fn sample_store() -> SqliteStore {
        let store = SqliteStore::in_memory().expect("Failed to create in-memory store");
        store
            .execute_batch(SAMPLE_CATALOG_SQL)
            .expect("Failed to seed sample catalog");
        store
    }
}
