// 🧮 Pricing Engine
// Ingredient cost + labor + oven/gas + margin → suggested sale price
//
// Pure and synchronous: one call per calculation, no I/O, full f64
// precision all the way through. Rounding belongs to the presentation layer
// (see report.rs).

use crate::catalog::Catalog;
use crate::error::PricingResult;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOURLY_LABOR_RATE: f64 = 16.00;
pub const DEFAULT_HOURLY_OVEN_RATE: f64 = 2.50;
pub const DEFAULT_PROFIT_MARGIN_PERCENT: f64 = 30.0;

pub const MIN_PROFIT_MARGIN_PERCENT: f64 = 10.0;
pub const MAX_PROFIT_MARGIN_PERCENT: f64 = 100.0;

// ============================================================================
// CONFIG
// ============================================================================

/// Session-scoped pricing knobs. Passed explicitly into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// R$ per hour of hands-on work
    pub hourly_labor_rate: f64,
    /// R$ per hour of oven/gas
    pub hourly_oven_rate: f64,
    /// Target profit over total cost, in percent
    pub profit_margin_percent: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            hourly_labor_rate: DEFAULT_HOURLY_LABOR_RATE,
            hourly_oven_rate: DEFAULT_HOURLY_OVEN_RATE,
            profit_margin_percent: DEFAULT_PROFIT_MARGIN_PERCENT,
        }
    }
}

impl PricingConfig {
    pub fn new(hourly_labor_rate: f64, hourly_oven_rate: f64, profit_margin_percent: f64) -> Self {
        PricingConfig {
            hourly_labor_rate,
            hourly_oven_rate,
            profit_margin_percent,
        }
    }

    /// Pull user input back into the allowed ranges: rates ≥ 0, margin in
    /// [10, 100]. Non-finite values fall back to the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = PricingConfig::default();
        let rate = |value: f64, fallback: f64| {
            if value.is_finite() {
                value.max(0.0)
            } else {
                fallback
            }
        };
        let margin = if self.profit_margin_percent.is_finite() {
            self.profit_margin_percent
                .clamp(MIN_PROFIT_MARGIN_PERCENT, MAX_PROFIT_MARGIN_PERCENT)
        } else {
            defaults.profit_margin_percent
        };

        PricingConfig {
            hourly_labor_rate: rate(self.hourly_labor_rate, defaults.hourly_labor_rate),
            hourly_oven_rate: rate(self.hourly_oven_rate, defaults.hourly_oven_rate),
            profit_margin_percent: margin,
        }
    }

    pub fn labor_cost(&self, prep_minutes: u32) -> f64 {
        self.hourly_labor_rate / 60.0 * f64::from(prep_minutes)
    }

    pub fn oven_cost(&self, oven_minutes: u32) -> f64 {
        self.hourly_oven_rate / 60.0 * f64::from(oven_minutes)
    }

    /// Price for a given total cost with this margin applied.
    pub fn sale_price(&self, total_cost: f64) -> f64 {
        total_cost * (1.0 + self.profit_margin_percent / 100.0)
    }
}

// ============================================================================
// RECIPE SELECTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedIngredient {
    pub name: String,
    /// In the catalog entry's own unit
    pub quantity_used: f64,
}

/// Ingredients picked for one calculation, in the order they were picked.
/// A name appears at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeSelection {
    ingredients: Vec<SelectedIngredient>,
    pub prep_minutes: u32,
    pub oven_minutes: u32,
}

fn non_negative(quantity: f64) -> f64 {
    if quantity.is_finite() && quantity > 0.0 {
        quantity
    } else {
        0.0
    }
}

impl RecipeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form used by the CLI/API: select (or re-quantify) an ingredient.
    pub fn with_ingredient(mut self, name: &str, quantity_used: f64) -> Self {
        self.select(name);
        self.set_quantity(name, quantity_used);
        self
    }

    pub fn with_times(mut self, prep_minutes: u32, oven_minutes: u32) -> Self {
        self.prep_minutes = prep_minutes;
        self.oven_minutes = oven_minutes;
        self
    }

    /// Add `name` with quantity 0. Returns false if it was already selected.
    pub fn select(&mut self, name: &str) -> bool {
        if self.is_selected(name) {
            return false;
        }
        self.ingredients.push(SelectedIngredient {
            name: name.to_string(),
            quantity_used: 0.0,
        });
        true
    }

    pub fn deselect(&mut self, name: &str) -> bool {
        let before = self.ingredients.len();
        self.ingredients.retain(|item| item.name != name);
        before != self.ingredients.len()
    }

    /// Select if absent, deselect if present. Returns the new state.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.deselect(name) {
            false
        } else {
            self.select(name)
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.ingredients.iter().any(|item| item.name == name)
    }

    /// Negative or non-finite quantities are stored as 0.
    pub fn set_quantity(&mut self, name: &str, quantity_used: f64) -> bool {
        match self.ingredients.iter_mut().find(|item| item.name == name) {
            Some(item) => {
                item.quantity_used = non_negative(quantity_used);
                true
            }
            None => false,
        }
    }

    pub fn quantity(&self, name: &str) -> Option<f64> {
        self.ingredients
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.quantity_used)
    }

    pub fn ingredients(&self) -> &[SelectedIngredient] {
        &self.ingredients
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    pub fn clear(&mut self) {
        self.ingredients.clear();
        self.prep_minutes = 0;
        self.oven_minutes = 0;
    }
}

// ============================================================================
// BREAKDOWN
// ============================================================================

/// Cost of one selected ingredient, kept for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientCost {
    pub name: String,
    pub unit: String,
    pub quantity_used: f64,
    pub unit_cost: f64,
    pub cost: f64,
    /// False when the catalog row had no usable package quantity/price
    pub costable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub lines: Vec<IngredientCost>,
    pub ingredient_cost_total: f64,
    pub labor_cost: f64,
    pub oven_cost: f64,
    pub total_cost: f64,
    pub sale_price: f64,
    pub profit_amount: f64,
    pub profit_margin_percent: f64,
}

impl PriceBreakdown {
    pub fn labor_and_oven_cost(&self) -> f64 {
        self.labor_cost + self.oven_cost
    }
}

/// Price one recipe against the catalog.
///
/// Refuses with `UnknownIngredient` if any selected name is missing from the
/// catalog; the ingredient is never silently left out of the total.
pub fn compute_price(
    selection: &RecipeSelection,
    catalog: &Catalog,
    config: &PricingConfig,
) -> PricingResult<PriceBreakdown> {
    let mut lines = Vec::with_capacity(selection.ingredients().len());

    for item in selection.ingredients() {
        let entry = catalog.lookup(&item.name)?;
        let unit_cost = entry.unit_cost();

        lines.push(IngredientCost {
            name: item.name.clone(),
            unit: entry.unit.clone(),
            quantity_used: item.quantity_used,
            unit_cost,
            cost: unit_cost * item.quantity_used,
            costable: entry.is_costable(),
        });
    }

    let ingredient_cost_total: f64 = lines.iter().map(|line| line.cost).sum();
    let labor_cost = config.labor_cost(selection.prep_minutes);
    let oven_cost = config.oven_cost(selection.oven_minutes);
    let total_cost = ingredient_cost_total + labor_cost + oven_cost;
    let sale_price = config.sale_price(total_cost);

    Ok(PriceBreakdown {
        lines,
        ingredient_cost_total,
        labor_cost,
        oven_cost,
        total_cost,
        sale_price,
        profit_amount: sale_price - total_cost,
        profit_margin_percent: config.profit_margin_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::error::PricingError;

    const EPS: f64 = 1e-9;

    fn pantry() -> Catalog {
        Catalog::new(vec![
            CatalogEntry::new("Sweetened Condensed Milk", 6.50, 395.0, "g"),
            CatalogEntry::new("Cocoa Powder", 9.80, 200.0, "g"),
            CatalogEntry::new("Butter", 12.90, 200.0, "g"),
            CatalogEntry::from_cells("Sprinkles", "4.00", "n/a", "g"),
        ])
    }

    #[test]
    fn test_brigadeiro_example() {
        let selection = RecipeSelection::new()
            .with_ingredient("Sweetened Condensed Milk", 395.0)
            .with_times(30, 20);

        let breakdown = compute_price(&selection, &pantry(), &PricingConfig::default()).unwrap();

        assert!((breakdown.ingredient_cost_total - 6.50).abs() < EPS);
        assert!((breakdown.labor_cost - 8.00).abs() < EPS);
        assert!((breakdown.oven_cost - 2.5 / 3.0).abs() < EPS);
        assert!((breakdown.total_cost - 15.333_333_333_333).abs() < 1e-9);
        assert!((breakdown.sale_price - 19.933_333_333_333).abs() < 1e-9);
        assert!((breakdown.profit_amount - (breakdown.sale_price - breakdown.total_cost)).abs() < EPS);
        assert_eq!(breakdown.profit_margin_percent, 30.0);
    }

    #[test]
    fn test_empty_selection_costs_nothing() {
        let breakdown =
            compute_price(&RecipeSelection::new(), &pantry(), &PricingConfig::default()).unwrap();
        assert_eq!(breakdown.total_cost, 0.0);
        assert_eq!(breakdown.sale_price, 0.0);
        assert_eq!(breakdown.profit_amount, 0.0);
        assert!(breakdown.lines.is_empty());
    }

    #[test]
    fn test_ingredient_order_does_not_change_total() {
        let forward = RecipeSelection::new()
            .with_ingredient("Sweetened Condensed Milk", 120.0)
            .with_ingredient("Cocoa Powder", 35.5)
            .with_ingredient("Butter", 17.0);
        let backward = RecipeSelection::new()
            .with_ingredient("Butter", 17.0)
            .with_ingredient("Cocoa Powder", 35.5)
            .with_ingredient("Sweetened Condensed Milk", 120.0);

        let config = PricingConfig::default();
        let a = compute_price(&forward, &pantry(), &config).unwrap();
        let b = compute_price(&backward, &pantry(), &config).unwrap();

        assert!((a.ingredient_cost_total - b.ingredient_cost_total).abs() < EPS);
        // Reporting keeps selection order
        assert_eq!(a.lines[0].name, "Sweetened Condensed Milk");
        assert_eq!(b.lines[0].name, "Butter");
    }

    #[test]
    fn test_sale_price_formula_across_margins() {
        let selection = RecipeSelection::new()
            .with_ingredient("Cocoa Powder", 50.0)
            .with_times(45, 35);

        for margin in (10..=100).step_by(5) {
            let config = PricingConfig::new(16.0, 2.5, margin as f64);
            let b = compute_price(&selection, &pantry(), &config).unwrap();
            let expected = b.total_cost * (1.0 + margin as f64 / 100.0);
            assert!((b.sale_price - expected).abs() < EPS, "margin {margin}");
            assert!((b.profit_amount - (b.sale_price - b.total_cost)).abs() < EPS);
        }
    }

    #[test]
    fn test_unknown_ingredient_refuses_to_price() {
        let selection = RecipeSelection::new()
            .with_ingredient("Cocoa Powder", 50.0)
            .with_ingredient("Hazelnut Paste", 10.0);

        let err = compute_price(&selection, &pantry(), &PricingConfig::default()).unwrap_err();
        assert_eq!(err, PricingError::UnknownIngredient("Hazelnut Paste".to_string()));
    }

    #[test]
    fn test_unusable_package_quantity_costs_zero() {
        let selection = RecipeSelection::new().with_ingredient("Sprinkles", 30.0);
        let b = compute_price(&selection, &pantry(), &PricingConfig::default()).unwrap();
        assert_eq!(b.ingredient_cost_total, 0.0);
        assert!(!b.lines[0].costable);
    }

    #[test]
    fn test_selection_keeps_names_unique() {
        let mut selection = RecipeSelection::new();
        assert!(selection.select("Butter"));
        assert!(!selection.select("Butter"));
        assert_eq!(selection.ingredients().len(), 1);

        let selection = selection.with_ingredient("Butter", 40.0);
        assert_eq!(selection.ingredients().len(), 1);
        assert_eq!(selection.quantity("Butter"), Some(40.0));
    }

    #[test]
    fn test_selection_toggle_and_negative_quantity() {
        let mut selection = RecipeSelection::new();
        assert!(selection.toggle("Butter"));
        assert!(selection.set_quantity("Butter", -5.0));
        assert_eq!(selection.quantity("Butter"), Some(0.0));
        assert!(!selection.set_quantity("Cocoa Powder", 3.0));
        assert!(!selection.toggle("Butter"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_config_sanitized() {
        let wild = PricingConfig::new(-3.0, f64::NAN, 250.0).sanitized();
        assert_eq!(wild.hourly_labor_rate, 0.0);
        assert_eq!(wild.hourly_oven_rate, DEFAULT_HOURLY_OVEN_RATE);
        assert_eq!(wild.profit_margin_percent, MAX_PROFIT_MARGIN_PERCENT);

        let low = PricingConfig::new(16.0, 2.5, 2.0).sanitized();
        assert_eq!(low.profit_margin_percent, MIN_PROFIT_MARGIN_PERCENT);

        assert_eq!(PricingConfig::default().sanitized(), PricingConfig::default());
    }
}
