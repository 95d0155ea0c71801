// 🧺 Ingredient Catalog - the pantry ("despensa")
// Unit economics per purchased ingredient + first-match lookup
//
// Column names follow the spreadsheet the bakery already keeps:
//   item | preco | qtd_emb | unidade

use crate::error::{PricingError, PricingResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Columns every catalog store must expose.
pub const REQUIRED_COLUMNS: [&str; 4] = ["item", "preco", "qtd_emb", "unidade"];

// ============================================================================
// NUMERIC COERCION
// ============================================================================

/// Parse a user-typed amount, coercing anything non-numeric to `None`.
///
/// Accepts surrounding whitespace and a single decimal comma ("6,50").
/// Empty text, garbage, `NaN` and infinities are all "missing".
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = if !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };

    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Same coercion for values that arrive already typed (JSON numbers, nulls).
pub fn amount_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => parse_amount(text),
        _ => None,
    }
}

fn text_from_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn de_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(amount_from_value(&value))
}

fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_from_value(&value))
}

// ============================================================================
// CATALOG ENTRY
// ============================================================================

/// One purchasable ingredient, as bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "item", deserialize_with = "de_text")]
    pub name: String,

    /// Price of one package. `None` when the stored value was not a number.
    #[serde(rename = "preco", deserialize_with = "de_amount")]
    pub package_price: Option<f64>,

    /// Amount of `unit` in one package. `None`/≤0 makes the entry cost nothing.
    #[serde(rename = "qtd_emb", deserialize_with = "de_amount")]
    pub package_quantity: Option<f64>,

    /// Informational only ("g", "ml", "un"); never used for conversion.
    #[serde(rename = "unidade", deserialize_with = "de_text")]
    pub unit: String,
}

impl CatalogEntry {
    pub fn new(name: &str, package_price: f64, package_quantity: f64, unit: &str) -> Self {
        CatalogEntry {
            name: name.to_string(),
            package_price: Some(package_price),
            package_quantity: Some(package_quantity),
            unit: unit.to_string(),
        }
    }

    /// Row as parsed from raw spreadsheet cells.
    pub fn from_cells(item: &str, preco: &str, qtd_emb: &str, unidade: &str) -> Self {
        CatalogEntry {
            name: item.to_string(),
            package_price: parse_amount(preco),
            package_quantity: parse_amount(qtd_emb),
            unit: unidade.to_string(),
        }
    }

    /// A fresh editor row; dropped on save unless it gets a name.
    pub fn blank() -> Self {
        CatalogEntry {
            name: String::new(),
            package_price: None,
            package_quantity: None,
            unit: String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// Price per single unit of measure.
    ///
    /// Zero whenever the package quantity is missing or not positive (and
    /// when the price itself is missing). Never a division error.
    pub fn unit_cost(&self) -> f64 {
        match (self.package_price, self.package_quantity) {
            (Some(price), Some(quantity)) if quantity > 0.0 => price / quantity,
            _ => 0.0,
        }
    }

    /// True when this entry contributes a real (non policy-zeroed) cost.
    pub fn is_costable(&self) -> bool {
        self.package_price.is_some() && self.package_quantity.map_or(false, |q| q > 0.0)
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Ordered pantry contents. Order is the store's order and decides lookup
/// ties: duplicate names are kept, first match wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Catalog { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut Vec<CatalogEntry> {
        &mut self.entries
    }

    pub fn into_entries(self) -> Vec<CatalogEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// First entry named exactly `name`.
    pub fn lookup(&self, name: &str) -> PricingResult<&CatalogEntry> {
        self.find(name).ok_or_else(|| {
            tracing::debug!(ingredient = name, "lookup missed");
            PricingError::UnknownIngredient(name.to_string())
        })
    }

    /// Selectable ingredient names: non-blank, each listed once.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !entry.is_blank() && !names.contains(&entry.name.as_str()) {
                names.push(&entry.name);
            }
        }
        names
    }

    pub fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    pub fn remove(&mut self, index: usize) -> Option<CatalogEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn blank_rows(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_blank()).count()
    }

    /// The rows a store is allowed to persist.
    pub fn without_blank_rows(&self) -> Catalog {
        Catalog {
            entries: self
                .entries
                .iter()
                .filter(|entry| !entry.is_blank())
                .cloned()
                .collect(),
        }
    }
}
