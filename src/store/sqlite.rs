// 🗃️ SQLite store
// One `pantry` table, rewritten wholesale on every save.

use super::{missing_columns, persistable_rows, CatalogStore};
use crate::catalog::{parse_amount, Catalog, CatalogEntry};
use crate::error::{PricingError, PricingResult};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection};
use std::path::PathBuf;

/// Opens a fresh connection per call: the catalog is read at the start of an
/// interaction and written back on explicit save, nothing in between.
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteStore { path: path.into() }
    }

    fn unavailable(&self, reason: impl ToString) -> PricingError {
        PricingError::unavailable(self.describe(), reason)
    }

    fn open(&self) -> PricingResult<Connection> {
        let conn = Connection::open(&self.path).map_err(|err| self.unavailable(err))?;
        setup_pantry_table(&conn).map_err(|err| self.unavailable(err))?;
        Ok(conn)
    }
}

pub fn setup_pantry_table(conn: &Connection) -> rusqlite::Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS pantry (
            position INTEGER NOT NULL,
            item TEXT NOT NULL,
            preco REAL,
            qtd_emb REAL,
            unidade TEXT NOT NULL DEFAULT ''
        )",
        [],
    )?;

    Ok(())
}

// Columns are loosely typed; a hand-edited table may hold text anywhere.
fn amount_from_cell(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Integer(n) => Some(n as f64),
        ValueRef::Real(v) => Some(v).filter(|v| v.is_finite()),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok().and_then(parse_amount),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}

fn text_from_cell(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Integer(n) => n.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Null | ValueRef::Blob(_) => String::new(),
    }
}

fn table_columns(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("PRAGMA table_info(pantry)")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

impl CatalogStore for SqliteStore {
    fn load(&self) -> PricingResult<Catalog> {
        let conn = self.open()?;

        let columns = table_columns(&conn).map_err(|err| self.unavailable(err))?;
        let missing = missing_columns(columns.iter().map(String::as_str));
        if !missing.is_empty() {
            return Err(self.unavailable(format!(
                "table pantry is missing column(s): {}",
                missing.join(", ")
            )));
        }

        let mut stmt = conn
            .prepare("SELECT item, preco, qtd_emb, unidade FROM pantry ORDER BY position, rowid")
            .map_err(|err| self.unavailable(err))?;

        let entries = stmt
            .query_map([], |row| {
                Ok(CatalogEntry {
                    name: text_from_cell(row.get_ref(0)?),
                    package_price: amount_from_cell(row.get_ref(1)?),
                    package_quantity: amount_from_cell(row.get_ref(2)?),
                    unit: text_from_cell(row.get_ref(3)?),
                })
            })
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|err| self.unavailable(err))?;

        tracing::debug!(store = %self.describe(), rows = entries.len(), "catalog loaded");
        Ok(Catalog::new(entries))
    }

    fn save(&self, catalog: &Catalog) -> PricingResult<usize> {
        let rows = persistable_rows(catalog, &self.describe());
        let mut conn = self.open()?;

        let tx = conn.transaction().map_err(|err| self.unavailable(err))?;
        tx.execute("DELETE FROM pantry", [])
            .map_err(|err| self.unavailable(err))?;

        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO pantry (position, item, preco, qtd_emb, unidade)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|err| self.unavailable(err))?;

            for (position, entry) in rows.iter().enumerate() {
                insert
                    .execute(params![
                        position as i64,
                        entry.name,
                        entry.package_price,
                        entry.package_quantity,
                        entry.unit,
                    ])
                    .map_err(|err| self.unavailable(err))?;
            }
        }

        tx.commit().map_err(|err| self.unavailable(err))?;

        tracing::info!(store = %self.describe(), rows = rows.len(), "catalog saved");
        Ok(rows.len())
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}
