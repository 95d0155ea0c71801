// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use bakery_pricing::{
    compute_price, format_brl, import_catalog, logging, open_store, open_store_for, parse_amount,
    render_catalog, render_quote, AppConfig, CatalogStore, RecipeSelection, StoreKind,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bakery-pricing", version, about = "Price homemade sweets from your pantry")]
struct Cli {
    /// Configuration file (defaults to ./bakery.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pantry backend: json, csv or sqlite
    #[arg(long, global = true)]
    store: Option<StoreKind>,

    /// Pantry location, overrides store.path
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive terminal UI (default)
    Ui,
    /// Print the pantry with unit costs
    List,
    /// Price a recipe
    Quote {
        /// Ingredient and quantity used, e.g. -i "Cocoa Powder=50"
        #[arg(short = 'i', long = "ingredient", value_parser = parse_ingredient)]
        ingredients: Vec<(String, f64)>,
        /// Hands-on minutes
        #[arg(long, default_value_t = 0)]
        prep: u32,
        /// Oven minutes
        #[arg(long, default_value_t = 0)]
        oven: u32,
        #[arg(long)]
        labor_rate: Option<f64>,
        #[arg(long)]
        oven_rate: Option<f64>,
        /// Profit margin percent (10-100)
        #[arg(long)]
        margin: Option<f64>,
    },
    /// Copy a pantry from another file into the configured store
    Import {
        source: PathBuf,
        /// Backend of SOURCE when its extension doesn't say
        #[arg(long)]
        kind: Option<StoreKind>,
    },
}

/// `NAME=QTY`; the last `=` splits, so names may contain one.
fn parse_ingredient(raw: &str) -> Result<(String, f64), String> {
    let (name, quantity) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=QTY, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing ingredient name in '{}'", raw));
    }
    let quantity =
        parse_amount(quantity).ok_or_else(|| format!("'{}' is not a quantity", quantity.trim()))?;
    Ok((name.to_string(), quantity))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_store_overrides(cli.store, cli.path);

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => {
            logging::init_file(&config.log);
            run_ui_mode(&config)?;
        }
        Commands::List => {
            logging::init_stderr(&config.log);
            run_list(&config)?;
        }
        Commands::Quote {
            ingredients,
            prep,
            oven,
            labor_rate,
            oven_rate,
            margin,
        } => {
            logging::init_stderr(&config.log);

            let mut selection = RecipeSelection::new().with_times(prep, oven);
            for (name, quantity) in &ingredients {
                selection.select(name);
                selection.set_quantity(name, *quantity);
            }

            let mut pricing = config.pricing;
            if let Some(rate) = labor_rate {
                pricing.hourly_labor_rate = rate;
            }
            if let Some(rate) = oven_rate {
                pricing.hourly_oven_rate = rate;
            }
            if let Some(margin) = margin {
                pricing.profit_margin_percent = margin;
            }
            let pricing = pricing.sanitized();

            run_quote(&config, &selection, &pricing)?;
        }
        Commands::Import { source, kind } => {
            logging::init_stderr(&config.log);
            run_import(&config, source, kind)?;
        }
    }

    Ok(())
}

fn open_configured(config: &AppConfig) -> Box<dyn CatalogStore> {
    open_store(config.store.kind, &config.store.path)
}

fn run_list(config: &AppConfig) -> Result<()> {
    let store = open_configured(config);
    let catalog = store.load().context("Failed to load pantry")?;

    println!("📦 Pantry ({})", store.describe());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if catalog.names().is_empty() {
        println!("Your pantry is empty! Add items with the UI or `import`.");
        return Ok(());
    }

    print!("{}", render_catalog(&catalog));
    println!("\n✓ {} ingredients", catalog.names().len());
    Ok(())
}

fn run_quote(
    config: &AppConfig,
    selection: &RecipeSelection,
    pricing: &bakery_pricing::PricingConfig,
) -> Result<()> {
    let store = open_configured(config);
    let catalog = store.load().context("Failed to load pantry")?;

    let breakdown = compute_price(selection, &catalog, pricing)?;

    println!("🧁 Quote");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Hands-on: {} min | Oven: {} min | Labor {}/h | Oven/gas {}/h",
        selection.prep_minutes,
        selection.oven_minutes,
        format_brl(pricing.hourly_labor_rate),
        format_brl(pricing.hourly_oven_rate),
    );
    println!();
    print!("{}", render_quote(&breakdown));
    Ok(())
}

fn run_import(config: &AppConfig, source: PathBuf, kind: Option<StoreKind>) -> Result<()> {
    if source == config.store.path {
        bail!("Source and target are the same file: {}", source.display());
    }

    let from = match kind {
        Some(kind) => open_store(kind, source),
        None => open_store_for(&source)?,
    };
    let to = open_configured(config);

    println!("📥 Importing pantry");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  from: {}", from.describe());
    println!("  into: {}", to.describe());

    let saved = import_catalog(from.as_ref(), to.as_ref()).context("Import failed")?;

    println!("\n✅ Imported {} ingredients", saved);
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig) -> Result<()> {
    let store = open_configured(config);
    tracing::info!(store = %store.describe(), "starting terminal UI");

    let mut app = ui::App::new(store, config.pricing);
    ui::run_ui(&mut app)?;

    println!("\n✅ Bye! Happy baking.");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the console: bakery-pricing list / quote");
    std::process::exit(1);
}
