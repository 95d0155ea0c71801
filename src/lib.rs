// Bakery Pricing - Core Library
// Exposes all modules for use in CLI/TUI, API server, and tests

pub mod catalog;
pub mod error;
pub mod logging;
pub mod pricing;
pub mod report;
pub mod settings;
pub mod store;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use catalog::{parse_amount, Catalog, CatalogEntry, REQUIRED_COLUMNS};
pub use error::{PricingError, PricingResult};
pub use pricing::{
    compute_price, IngredientCost, PriceBreakdown, PricingConfig, RecipeSelection,
    SelectedIngredient,
};
pub use report::{format_brl, render_catalog, render_quote};
pub use settings::AppConfig;
pub use store::{
    import_catalog, open_store, open_store_for, CatalogStore, CsvSheetStore, JsonFileStore,
    SqliteStore, StoreKind,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
