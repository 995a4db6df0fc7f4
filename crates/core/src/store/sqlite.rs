//! SQLite-backed data source.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params_from_iter, types::ValueRef, Connection};
use serde_json::Value;
use tracing::debug;

use super::{
    validate_identifier, DataSource, Filter, FilterOp, Record, SelectQuery, StoreError,
};

const FOLD_CASE_FN: &str = "fold_case";

/// SQLite-backed catalog store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating missing tables.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::register_functions(&conn)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::register_functions(&conn)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run raw SQL statements against the store (seeding, maintenance).
    pub fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        self.lock()?
            .execute_batch(sql)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".to_string()))
    }

    /// `fold_case(x)`: Unicode lowercase of text, used by case-insensitive
    /// filters. SQLite's own `lower()` and `LIKE` only fold ASCII.
    fn register_functions(conn: &Connection) -> Result<(), StoreError> {
        conn.create_scalar_function(
            FOLD_CASE_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let folded = match ctx.get_raw(0) {
                    ValueRef::Text(text) => Some(String::from_utf8_lossy(text).to_lowercase()),
                    ValueRef::Integer(n) => Some(n.to_string()),
                    ValueRef::Real(f) => Some(f.to_string()),
                    ValueRef::Null | ValueRef::Blob(_) => None,
                };
                Ok(folded)
            },
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS manga (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                language TEXT,
                pages INTEGER,
                favorites INTEGER NOT NULL DEFAULT 0,
                uploaded_at TEXT,
                cover_url TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_manga_language ON manga(language);

            CREATE TABLE IF NOT EXISTS tags (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);
            CREATE TABLE IF NOT EXISTS artists (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);
            CREATE TABLE IF NOT EXISTS characters (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);
            CREATE TABLE IF NOT EXISTS "groups" (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);
            CREATE TABLE IF NOT EXISTS parodies (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);

            CREATE TABLE IF NOT EXISTS manga_tags (
                manga_id INTEGER NOT NULL REFERENCES manga(id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS manga_artists (
                manga_id INTEGER NOT NULL REFERENCES manga(id) ON DELETE CASCADE,
                artist_id INTEGER NOT NULL REFERENCES artists(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS manga_characters (
                manga_id INTEGER NOT NULL REFERENCES manga(id) ON DELETE CASCADE,
                character_id INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS manga_groups (
                manga_id INTEGER NOT NULL REFERENCES manga(id) ON DELETE CASCADE,
                group_id INTEGER NOT NULL REFERENCES "groups"(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS manga_parodies (
                manga_id INTEGER NOT NULL REFERENCES manga(id) ON DELETE CASCADE,
                parody_id INTEGER NOT NULL REFERENCES parodies(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_manga_tags_manga ON manga_tags(manga_id);
            CREATE INDEX IF NOT EXISTS idx_manga_tags_tag ON manga_tags(tag_id);
            CREATE INDEX IF NOT EXISTS idx_manga_artists_manga ON manga_artists(manga_id);
            CREATE INDEX IF NOT EXISTS idx_manga_artists_artist ON manga_artists(artist_id);
            CREATE INDEX IF NOT EXISTS idx_manga_characters_character ON manga_characters(character_id);
            CREATE INDEX IF NOT EXISTS idx_manga_groups_group ON manga_groups(group_id);
            CREATE INDEX IF NOT EXISTS idx_manga_parodies_parody ON manga_parodies(parody_id);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

/// Build the SQL text and bound parameters for a select.
fn build_select(query: &SelectQuery) -> Result<(String, Vec<String>), StoreError> {
    validate_identifier(&query.table)?;

    let columns = match &query.columns {
        Some(columns) if !columns.is_empty() => {
            for column in columns {
                validate_identifier(column)?;
            }
            columns
                .iter()
                .map(|c| quote(c))
                .collect::<Vec<_>>()
                .join(", ")
        }
        _ => "*".to_string(),
    };

    let mut sql = format!("SELECT {} FROM {}", columns, quote(&query.table));
    let mut params = Vec::new();
    let mut clauses = Vec::new();

    for filter in &query.filters {
        clauses.push(filter_clause(filter, &mut params)?);
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    if let Some(order) = &query.order {
        validate_identifier(&order.column)?;
        sql.push_str(&format!(
            " ORDER BY {} {}",
            quote(&order.column),
            order.direction.as_sql()
        ));
    }

    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    Ok((sql, params))
}

fn filter_clause(filter: &Filter, params: &mut Vec<String>) -> Result<String, StoreError> {
    validate_identifier(&filter.column)?;
    let column = quote(&filter.column);

    let clause = match &filter.op {
        FilterOp::Eq(value) => {
            params.push(value.clone());
            if filter.case_insensitive {
                format!("{0}({1}) = {0}(?)", FOLD_CASE_FN, column)
            } else {
                format!("{} = ?", column)
            }
        }
        FilterOp::In(values) if values.is_empty() => "0".to_string(),
        FilterOp::In(values) => {
            params.extend(values.iter().cloned());
            if filter.case_insensitive {
                let slot = format!("{}(?)", FOLD_CASE_FN);
                let slots = vec![slot.as_str(); values.len()].join(", ");
                format!("{}({}) IN ({})", FOLD_CASE_FN, column, slots)
            } else {
                let slots = vec!["?"; values.len()].join(", ");
                format!("{} IN ({})", column, slots)
            }
        }
        FilterOp::Contains(needle) => {
            params.push(format!("%{}%", escape_like(needle)));
            format!("{0}({1}) LIKE {0}(?) ESCAPE '\\'", FOLD_CASE_FN, column)
        }
    };

    Ok(clause)
}

// SQLite reads an unknown double-quoted name as a string literal; grave
// accents always name an identifier.
fn quote(identifier: &str) -> String {
    format!("`{}`", identifier)
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => Value::Null,
    }
}

#[async_trait]
impl DataSource for SqliteStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Record>, StoreError> {
        let (sql, params) = build_select(query)?;
        debug!(table = %query.table, sql = %sql, "Running select");

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let mut record = Record::new();
                for (i, name) in names.iter().enumerate() {
                    record.insert(name.clone(), value_to_json(row.get_ref(i)?));
                }
                Ok(record)
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }
        Ok(records)
    }
}
