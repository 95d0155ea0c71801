// 🧾 Presentation helpers
// The only place amounts get rounded to cents.

use crate::catalog::Catalog;
use crate::pricing::PriceBreakdown;

/// "R$ 19.93". Two decimals, no locale grouping.
pub fn format_brl(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    // Avoid printing "R$ -0.00" for tiny negative noise
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("R$ {:.2}", rounded)
}

/// Quantities without pointless trailing zeros: 395 / 12.5 / 0.25
pub fn format_quantity(quantity: f64) -> String {
    let text = format!("{:.3}", quantity);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() || text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

pub fn format_optional(amount: Option<f64>) -> String {
    amount.map(format_quantity).unwrap_or_else(|| "-".to_string())
}

/// Multi-line quote for the console.
pub fn render_quote(breakdown: &PriceBreakdown) -> String {
    let mut out = String::new();

    for line in &breakdown.lines {
        let note = if line.costable { "" } else { "  (no package quantity)" };
        out.push_str(&format!(
            "  {:<28} {:>10} {:<4} {:>12}{}\n",
            line.name,
            format_quantity(line.quantity_used),
            line.unit,
            format_brl(line.cost),
            note
        ));
    }
    if !breakdown.lines.is_empty() {
        out.push('\n');
    }

    let totals = [
        ("Ingredients:".to_string(), breakdown.ingredient_cost_total),
        ("Labor + oven/gas:".to_string(), breakdown.labor_and_oven_cost()),
        (
            format!("Profit ({}%):", format_quantity(breakdown.profit_margin_percent)),
            breakdown.profit_amount,
        ),
        ("Suggested price:".to_string(), breakdown.sale_price),
    ];
    for (label, amount) in totals {
        out.push_str(&format!("  {:<20}{:>12}\n", label, format_brl(amount)));
    }

    out
}

/// Catalog listing for the console, with derived unit cost.
pub fn render_catalog(catalog: &Catalog) -> String {
    let mut out = format!(
        "  {:<28} {:>10} {:>10} {:<6} {:>12}\n",
        "item", "preco", "qtd_emb", "unid.", "unit cost"
    );
    for entry in catalog.iter() {
        out.push_str(&format!(
            "  {:<28} {:>10} {:>10} {:<6} {:>12}\n",
            entry.name,
            format_optional(entry.package_price),
            format_optional(entry.package_quantity),
            entry.unit,
            format!("{:.4}", entry.unit_cost())
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::pricing::{compute_price, PricingConfig, RecipeSelection};

    #[test]
    fn test_format_brl_rounds_at_presentation() {
        assert_eq!(format_brl(19.933_333_333), "R$ 19.93");
        assert_eq!(format_brl(0.8333), "R$ 0.83");
        assert_eq!(format_brl(8.0), "R$ 8.00");
        assert_eq!(format_brl(0.005), "R$ 0.01");
        assert_eq!(format_brl(-0.0001), "R$ 0.00");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(395.0), "395");
        assert_eq!(format_quantity(12.5), "12.5");
        assert_eq!(format_quantity(0.25), "0.25");
        assert_eq!(format_quantity(0.0), "0");
        assert_eq!(format_optional(None), "-");
    }

    #[test]
    fn test_render_quote_shows_suggested_price() {
        let catalog = Catalog::new(vec![CatalogEntry::new(
            "Sweetened Condensed Milk",
            6.50,
            395.0,
            "g",
        )]);
        let selection = RecipeSelection::new()
            .with_ingredient("Sweetened Condensed Milk", 395.0)
            .with_times(30, 20);
        let breakdown = compute_price(&selection, &catalog, &PricingConfig::default()).unwrap();

        let text = render_quote(&breakdown);
        assert!(text.contains("Suggested price:"));
        assert!(text.contains("R$ 19.93"));
        assert!(text.contains("Profit (30%)"));
        assert!(text.contains("R$ 8.83"));
    }

    #[test]
    fn test_render_catalog_lists_every_row() {
        let catalog = Catalog::new(vec![
            CatalogEntry::new("Eggs", 18.0, 30.0, "un"),
            CatalogEntry::from_cells("Butter", "12.90", "", "g"),
        ]);
        let text = render_catalog(&catalog);
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("0.6000"));
        assert!(text.contains("Butter"));
    }
}
