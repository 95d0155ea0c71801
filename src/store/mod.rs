// 🗄️ Catalog Stores
// Where the pantry lives: local JSON file, spreadsheet CSV export, SQLite.
//
// The pricing core only depends on the load/save contract below; which
// medium backs it is a deployment choice.

pub mod csv_sheet;
pub mod json_file;
pub mod sqlite;

pub use csv_sheet::CsvSheetStore;
pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

use crate::catalog::Catalog;
use crate::error::{PricingError, PricingResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// STORE KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Json,
    Csv,
    Sqlite,
}

impl StoreKind {
    /// Guess the backend from a file extension.
    ///
    /// ```
    /// use bakery_pricing::StoreKind;
    /// use std::path::Path;
    ///
    /// assert_eq!(StoreKind::detect(Path::new("despensa.csv")), Some(StoreKind::Csv));
    /// assert_eq!(StoreKind::detect(Path::new("pantry.db")), Some(StoreKind::Sqlite));
    /// ```
    pub fn detect(path: &Path) -> Option<StoreKind> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "json" => Some(StoreKind::Json),
            "csv" => Some(StoreKind::Csv),
            "db" | "sqlite" | "sqlite3" => Some(StoreKind::Sqlite),
            _ => None,
        }
    }
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(StoreKind::Json),
            "csv" => Ok(StoreKind::Csv),
            "sqlite" | "db" => Ok(StoreKind::Sqlite),
            other => Err(format!("unknown store kind '{}' (json, csv, sqlite)", other)),
        }
    }
}

// ============================================================================
// STORE CONTRACT
// ============================================================================

/// CatalogStore - what the pricing flow needs from persistence
///
/// - `load` fails with `CatalogUnavailable` when the medium can't be read or
///   lacks a required column; non-numeric cells become missing values.
/// - `save` replaces everything stored, dropping blank-named rows first, and
///   returns how many rows were written.
pub trait CatalogStore: Send + Sync {
    fn load(&self) -> PricingResult<Catalog>;

    fn save(&self, catalog: &Catalog) -> PricingResult<usize>;

    /// Short label for messages and logs, e.g. `json:/home/me/pantry.json`
    fn describe(&self) -> String;
}

/// Factory: `Box<dyn CatalogStore>` for a backend + location.
pub fn open_store(kind: StoreKind, path: impl Into<PathBuf>) -> Box<dyn CatalogStore> {
    let path = path.into();
    match kind {
        StoreKind::Json => Box::new(JsonFileStore::new(path)),
        StoreKind::Csv => Box::new(CsvSheetStore::new(path)),
        StoreKind::Sqlite => Box::new(SqliteStore::new(path)),
    }
}

/// Open a store for a file, detecting the backend from its extension.
pub fn open_store_for(path: &Path) -> PricingResult<Box<dyn CatalogStore>> {
    let kind = StoreKind::detect(path).ok_or_else(|| {
        PricingError::unavailable(
            path.display().to_string(),
            "cannot tell the store kind from the file extension (.json, .csv, .db)",
        )
    })?;
    Ok(open_store(kind, path))
}

/// Copy everything from one store into another. Blank rows are dropped by
/// the destination's `save`.
pub fn import_catalog(from: &dyn CatalogStore, to: &dyn CatalogStore) -> PricingResult<usize> {
    let catalog = from.load()?;
    let written = to.save(&catalog)?;
    tracing::info!(
        from = %from.describe(),
        to = %to.describe(),
        read = catalog.len(),
        written,
        "catalog imported"
    );
    Ok(written)
}

/// Shared by every backend's `save`.
pub(crate) fn persistable_rows(catalog: &Catalog, store: &str) -> Catalog {
    let blanks = catalog.blank_rows();
    if blanks > 0 {
        tracing::info!(store, dropped = blanks, "dropping blank rows before save");
    }
    catalog.without_blank_rows()
}

/// Header check shared by tabular backends.
pub(crate) fn missing_columns<'a, I>(columns: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    crate::catalog::REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !columns.clone().into_iter().any(|c| c.trim() == *required))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;

    #[test]
    fn test_detect_store_kind() {
        assert_eq!(StoreKind::detect(Path::new("a/pantry.json")), Some(StoreKind::Json));
        assert_eq!(StoreKind::detect(Path::new("Despensa.CSV")), Some(StoreKind::Csv));
        assert_eq!(StoreKind::detect(Path::new("pantry.sqlite3")), Some(StoreKind::Sqlite));
        assert_eq!(StoreKind::detect(Path::new("pantry.xlsx")), None);
        assert_eq!(StoreKind::detect(Path::new("pantry")), None);
    }

    #[test]
    fn test_store_kind_from_str() {
        assert_eq!("CSV".parse::<StoreKind>(), Ok(StoreKind::Csv));
        assert!("sheets".parse::<StoreKind>().is_err());
    }

    #[test]
    fn test_missing_columns() {
        let header = vec!["item", "preco", "unidade", "notes"];
        assert_eq!(missing_columns(header.iter().copied()), vec!["qtd_emb"]);

        let header = vec!["unidade", " qtd_emb", "preco", "item"];
        assert!(missing_columns(header.iter().copied()).is_empty());
    }

    #[test]
    fn test_import_between_backends() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("sheet.csv");
        std::fs::write(
            &csv_path,
            "item,preco,qtd_emb,unidade\nFlour,5.49,1000,g\n,1,1,g\nEggs,18,30,un\n",
        )
        .unwrap();

        let source = open_store_for(&csv_path).unwrap();
        let target = open_store(StoreKind::Sqlite, dir.path().join("pantry.db"));

        let written = import_catalog(source.as_ref(), target.as_ref()).unwrap();
        assert_eq!(written, 2);

        let copied = target.load().unwrap();
        assert_eq!(
            copied.entries(),
            &[
                CatalogEntry::new("Flour", 5.49, 1000.0, "g"),
                CatalogEntry::new("Eggs", 18.0, 30.0, "un"),
            ]
        );
    }

    #[test]
    fn test_open_store_for_unknown_extension() {
        let err = open_store_for(Path::new("pantry.xlsx")).err().unwrap();
        assert!(matches!(err, PricingError::CatalogUnavailable { .. }));
    }
}
