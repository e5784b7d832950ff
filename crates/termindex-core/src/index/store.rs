//! SQLite store for term index rows.

use super::provider::TermIndexRow;
use crate::config::{DatabaseConfig, IndexConfig};
use crate::{Result, TermIndexError};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Replacement rows for one content item.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexUpdate {
    pub content_item_id: String,
    pub rows: Vec<TermIndexRow>,
}

impl IndexUpdate {
    pub fn new(content_item_id: impl Into<String>, rows: Vec<TermIndexRow>) -> Self {
        Self {
            content_item_id: content_item_id.into(),
            rows,
        }
    }

    /// An update that removes every row of the item.
    pub fn retract(content_item_id: impl Into<String>) -> Self {
        Self::new(content_item_id, Vec::new())
    }
}

/// Counts from applying a batch of updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub items: usize,
    pub rows_deleted: usize,
    pub rows_inserted: usize,
}

/// Filter on the published and latest flags. `None` matches either value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowFilter {
    pub published: Option<bool>,
    pub latest: Option<bool>,
}

impl RowFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn published() -> Self {
        Self {
            published: Some(true),
            latest: None,
        }
    }

    pub fn latest() -> Self {
        Self {
            published: None,
            latest: Some(true),
        }
    }
}

/// SQLite table of content item to term associations.
///
/// Rows are owned per content item: every write for an item deletes all of
/// its previous rows first, inside the same transaction.
pub struct TermIndexStore {
    db_path: Option<PathBuf>,
    conn: Arc<Mutex<Connection>>,
}

impl TermIndexStore {
    /// Open (or create) the database file at `db_path`.
    ///
    /// The index table itself is created by `create_table`.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| TermIndexError::Io {
                    message: format!("Failed to create directory {}", parent.display()),
                    path: Some(parent.to_path_buf()),
                    source: Some(e),
                })?;
            }
        }

        let conn = Connection::open(&db_path)?;
        Self::configure_connection(&conn)?;

        Ok(Self {
            db_path: Some(db_path),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            db_path: None,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode=WAL;\n\
             PRAGMA busy_timeout={};\n\
             PRAGMA synchronous=NORMAL;\n\
             PRAGMA temp_store=MEMORY;",
            DatabaseConfig::BUSY_TIMEOUT_MS,
        ))?;
        Ok(())
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| TermIndexError::lock_poisoned("term index connection"))
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Create the index table and its lookup indexes.
    pub fn create_table(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content_item_id TEXT NOT NULL,
                term_content_item_id TEXT NOT NULL,
                url TEXT,
                display_text TEXT NOT NULL DEFAULT '',
                published INTEGER NOT NULL DEFAULT {published},
                latest INTEGER NOT NULL DEFAULT {latest}
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_item
                ON {table}(content_item_id);

            CREATE INDEX IF NOT EXISTS idx_{table}_term
                ON {table}(term_content_item_id, published, latest);",
            table = IndexConfig::TABLE_NAME,
            published = IndexConfig::PUBLISHED_DEFAULT as i32,
            latest = IndexConfig::LATEST_DEFAULT as i32,
        ))?;
        debug!("Ensured table {}", IndexConfig::TABLE_NAME);
        Ok(())
    }

    pub fn table_exists(&self) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![IndexConfig::TABLE_NAME],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Replace all rows of one content item.
    pub fn replace_for_item(&self, content_item_id: &str, rows: &[TermIndexRow]) -> Result<ApplyStats> {
        self.apply(&[IndexUpdate::new(content_item_id, rows.to_vec())])
    }

    /// Remove all rows of one content item.
    pub fn retract(&self, content_item_id: &str) -> Result<usize> {
        Ok(self
            .apply(&[IndexUpdate::retract(content_item_id)])?
            .rows_deleted)
    }

    /// Apply a batch of per-item replacements in a single transaction.
    ///
    /// The whole batch is validated before anything is written.
    pub fn apply(&self, updates: &[IndexUpdate]) -> Result<ApplyStats> {
        for update in updates {
            validate_update(update)?;
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut stats = ApplyStats::default();

        {
            let delete_sql = format!(
                "DELETE FROM {} WHERE content_item_id = ?1",
                IndexConfig::TABLE_NAME
            );
            let insert_sql = format!(
                "INSERT INTO {} (content_item_id, term_content_item_id, url, display_text, published, latest)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                IndexConfig::TABLE_NAME
            );
            let mut delete = tx.prepare(&delete_sql)?;
            let mut insert = tx.prepare(&insert_sql)?;

            for update in updates {
                stats.items += 1;
                stats.rows_deleted += delete.execute(params![update.content_item_id])?;

                for row in &update.rows {
                    let url = row
                        .url
                        .as_deref()
                        .map(|url| bounded(url, IndexConfig::URL_MAX_LENGTH, "url", row));
                    let display_text = bounded(
                        &row.display_text,
                        IndexConfig::DISPLAY_TEXT_MAX_LENGTH,
                        "display_text",
                        row,
                    );
                    stats.rows_inserted += insert.execute(params![
                        row.content_item_id,
                        row.term_content_item_id,
                        url,
                        display_text,
                        row.published,
                        row.latest,
                    ])?;
                }
            }
        }

        tx.commit()?;
        debug!(
            "Applied {} term index updates ({} deleted, {} inserted)",
            stats.items, stats.rows_deleted, stats.rows_inserted
        );
        Ok(stats)
    }

    /// Rows of a content item, in insertion order.
    pub fn rows_for_item(&self, content_item_id: &str) -> Result<Vec<TermIndexRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT content_item_id, term_content_item_id, published, latest, url, display_text
             FROM {} WHERE content_item_id = ?1 ORDER BY id",
            IndexConfig::TABLE_NAME
        ))?;
        let rows = stmt.query_map(params![content_item_id], row_to_index_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Rows referencing a term, filtered on the version flags.
    pub fn items_for_term(
        &self,
        term_content_item_id: &str,
        filter: RowFilter,
    ) -> Result<Vec<TermIndexRow>> {
        let mut sql = format!(
            "SELECT content_item_id, term_content_item_id, published, latest, url, display_text
             FROM {} WHERE term_content_item_id = ?",
            IndexConfig::TABLE_NAME
        );
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> =
            vec![Box::new(term_content_item_id.to_string())];

        if let Some(published) = filter.published {
            sql.push_str(" AND published = ?");
            params_vec.push(Box::new(published));
        }
        if let Some(latest) = filter.latest {
            sql.push_str(" AND latest = ?");
            params_vec.push(Box::new(latest));
        }
        sql.push_str(" ORDER BY id");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(params_refs.as_slice(), row_to_index_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", IndexConfig::TABLE_NAME),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Remove every row.
    pub fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(&format!("DELETE FROM {}", IndexConfig::TABLE_NAME), [])?;
        debug!("Cleared term index");
        Ok(())
    }

    /// Checkpoint the WAL file.
    pub fn checkpoint_wal(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        debug!("Checkpointed WAL");
        Ok(())
    }
}

/// Whether `value` fits an identifier column.
pub(crate) fn is_valid_id(value: &str) -> bool {
    !value.is_empty() && value.chars().count() <= IndexConfig::CONTENT_ITEM_ID_LENGTH
}

fn validate_id(field: &str, value: &str) -> Result<()> {
    if !is_valid_id(value) {
        return Err(TermIndexError::Validation {
            field: field.to_string(),
            message: format!(
                "'{}' must be 1 to {} characters",
                value,
                IndexConfig::CONTENT_ITEM_ID_LENGTH
            ),
        });
    }
    Ok(())
}

fn validate_update(update: &IndexUpdate) -> Result<()> {
    validate_id("content_item_id", &update.content_item_id)?;
    for row in &update.rows {
        if row.content_item_id != update.content_item_id {
            return Err(TermIndexError::Validation {
                field: "content_item_id".to_string(),
                message: format!(
                    "row for {} in update of {}",
                    row.content_item_id, update.content_item_id
                ),
            });
        }
        validate_id("term_content_item_id", &row.term_content_item_id)?;
    }
    Ok(())
}

/// Cut `value` to at most `max` characters.
fn bounded<'a>(value: &'a str, max: usize, column: &str, row: &TermIndexRow) -> &'a str {
    match value.char_indices().nth(max) {
        Some((end, _)) => {
            warn!(
                "Truncating {} of content item {} to {} characters",
                column, row.content_item_id, max
            );
            &value[..end]
        }
        None => value,
    }
}

fn row_to_index_row(row: &Row) -> rusqlite::Result<TermIndexRow> {
    Ok(TermIndexRow {
        content_item_id: row.get(0)?,
        term_content_item_id: row.get(1)?,
        published: row.get(2)?,
        latest: row.get(3)?,
        url: row.get(4)?,
        display_text: row.get(5)?,
    })
}
