// 📊 Spreadsheet store (CSV export)
// The "Dados" sheet as a CSV file: header row + one row per ingredient.
//
// Column order doesn't matter and extra columns are ignored, as long as
// item / preco / qtd_emb / unidade are all present.

use super::{missing_columns, persistable_rows, CatalogStore};
use crate::catalog::{Catalog, CatalogEntry};
use crate::error::{PricingError, PricingResult};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::PathBuf;

pub struct CsvSheetStore {
    path: PathBuf,
}

impl CsvSheetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSheetStore { path: path.into() }
    }

    fn unavailable(&self, reason: impl ToString) -> PricingError {
        PricingError::unavailable(self.describe(), reason)
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl CatalogStore for CsvSheetStore {
    fn load(&self) -> PricingResult<Catalog> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|err| self.unavailable(err))?;

        let headers = reader.headers().map_err(|err| self.unavailable(err))?.clone();

        let missing = missing_columns(headers.iter());
        if !missing.is_empty() {
            return Err(self.unavailable(format!(
                "header must contain item, preco, qtd_emb, unidade (missing: {})",
                missing.join(", ")
            )));
        }

        let position = |name: &str| headers.iter().position(|h| h.trim() == name);
        // Checked above, every column is present
        let (item, preco, qtd_emb, unidade) = match (
            position("item"),
            position("preco"),
            position("qtd_emb"),
            position("unidade"),
        ) {
            (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
            _ => return Err(self.unavailable("header could not be indexed")),
        };

        let mut catalog = Catalog::default();
        for (line_num, result) in reader.records().enumerate() {
            let record = result.map_err(|err| {
                self.unavailable(format!("line {}: {}", line_num + 2, err))
            })?;

            catalog.push(CatalogEntry::from_cells(
                record.get(item).unwrap_or(""),
                record.get(preco).unwrap_or(""),
                record.get(qtd_emb).unwrap_or(""),
                record.get(unidade).unwrap_or(""),
            ));
        }

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

        let tmp = self.path.with_extension("csv.tmp");
        let mut writer = WriterBuilder::new()
            .from_path(&tmp)
            .map_err(|err| self.unavailable(err))?;

        writer
            .write_record(crate::catalog::REQUIRED_COLUMNS)
            .map_err(|err| self.unavailable(err))?;

        for entry in rows.iter() {
            writer
                .write_record([
                    entry.name.clone(),
                    cell(entry.package_price),
                    cell(entry.package_quantity),
                    entry.unit.clone(),
                ])
                .map_err(|err| self.unavailable(err))?;
        }

        writer.flush().map_err(|err| self.unavailable(err))?;
        drop(writer);
        fs::rename(&tmp, &self.path).map_err(|err| self.unavailable(err))?;

        tracing::info!(store = %self.describe(), rows = rows.len(), "catalog saved");
        Ok(rows.len())
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}
