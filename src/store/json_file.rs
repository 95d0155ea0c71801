// 📄 Local JSON file store
// An array of {item, preco, qtd_emb, unidade} records on disk.

use super::{persistable_rows, CatalogStore};
use crate::catalog::Catalog;
use crate::error::{PricingError, PricingResult};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    fn unavailable(&self, reason: impl ToString) -> PricingError {
        PricingError::unavailable(self.describe(), reason)
    }
}

impl CatalogStore for JsonFileStore {
    /// A file that does not exist yet is an empty pantry (first run).
    fn load(&self) -> PricingResult<Catalog> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(store = %self.describe(), "no pantry file yet, starting empty");
                return Ok(Catalog::default());
            }
            Err(err) => return Err(self.unavailable(err)),
        };

        if data.trim().is_empty() {
            return Ok(Catalog::default());
        }

        let catalog: Catalog = serde_json::from_str(&data).map_err(|err| {
            self.unavailable(format!(
                "expected a list of {{item, preco, qtd_emb, unidade}} records: {}",
                err
            ))
        })?;

        tracing::debug!(store = %self.describe(), rows = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    fn save(&self, catalog: &Catalog) -> PricingResult<usize> {
        let rows = persistable_rows(catalog, &self.describe());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| self.unavailable(err))?;
            }
        }

        let json = serde_json::to_string_pretty(&rows).map_err(|err| self.unavailable(err))?;

        // Write-then-rename so a crash never leaves half a pantry behind
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|err| self.unavailable(err))?;
        fs::rename(&tmp, &self.path).map_err(|err| self.unavailable(err))?;

        tracing::info!(store = %self.describe(), rows = rows.len(), "catalog saved");
        Ok(rows.len())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;

    #[test]
    fn test_missing_file_is_empty_pantry() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("pantry.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_drops_blank_rows_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("pantry.json"));

        let mut catalog = Catalog::new(vec![
            CatalogEntry::new("Sweetened Condensed Milk", 6.50, 395.0, "g"),
            CatalogEntry::from_cells("Butter", "12.90", "", "g"),
        ]);
        catalog.push(CatalogEntry::blank());

        assert_eq!(store.save(&catalog).unwrap(), 2);

        let loaded = store.load().unwrap();
        assert_eq!(loaded, catalog.without_blank_rows());

        // save(load()) is idempotent on the remaining rows
        assert_eq!(store.save(&loaded).unwrap(), 2);
        assert_eq!(store.load().unwrap(), loaded);
    }

    #[test]
    fn test_hand_edited_file_is_coerced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pantry.json");
        std::fs::write(
            &path,
            r#"[{"item": "Flour", "preco": "5,49", "qtd_emb": "1 kg", "unidade": "g"}]"#,
        )
        .unwrap();

        let catalog = JsonFileStore::new(&path).load().unwrap();
        let flour = catalog.lookup("Flour").unwrap();
        assert_eq!(flour.package_price, Some(5.49));
        assert_eq!(flour.package_quantity, None);
        assert_eq!(flour.unit_cost(), 0.0);
    }

    #[test]
    fn test_wrong_shape_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pantry.json");
        std::fs::write(&path, r#"{"Flour": 5.49}"#).unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        match err {
            PricingError::CatalogUnavailable { store, .. } => assert!(store.starts_with("json:")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_column_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pantry.json");
        std::fs::write(&path, r#"[{"item": "Flour", "preco": 5.49, "unidade": "g"}]"#).unwrap();

        assert!(JsonFileStore::new(&path).load().is_err());
    }

    #[test]
    fn test_save_under_a_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let store = JsonFileStore::new(blocker.join("pantry.json"));
        let catalog = Catalog::new(vec![CatalogEntry::new("Flour", 5.49, 1000.0, "g")]);
        assert!(matches!(
            store.save(&catalog),
            Err(PricingError::CatalogUnavailable { .. })
        ));
    }

    #[test]
    fn test_failed_save_leaves_existing_pantry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pantry.json");
        let store = JsonFileStore::new(&path);

        let original = Catalog::new(vec![CatalogEntry::new("Flour", 5.49, 1000.0, "g")]);
        store.save(&original).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        // Occupy the temp file's name so the write step fails
        std::fs::create_dir(dir.path().join("pantry.json.tmp")).unwrap();

        let replacement = Catalog::new(vec![CatalogEntry::new("Sugar", 4.29, 1000.0, "g")]);
        assert!(matches!(
            store.save(&replacement),
            Err(PricingError::CatalogUnavailable { .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        assert_eq!(store.load().unwrap(), original);
    }
}
