// ⚙️ Application configuration
// Layers: built-in defaults → optional TOML file → BAKERY__* environment.
// CLI flags are applied on top by the binaries.

use crate::pricing::PricingConfig;
use crate::store::StoreKind;
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "PadocaDaNane";
const APP_NAME: &str = "BakeryPricing";

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "bakery.toml";

fn data_dir() -> PathBuf {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            kind: StoreKind::Json,
            path: data_dir().join("pantry.json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// EnvFilter directive used when RUST_LOG is not set
    pub level: String,
    /// Terminal UI writes its log here instead of the screen
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            file: data_dir().join("bakery-pricing.log"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    /// Defaults every new session starts from
    pub pricing: PricingConfig,
    pub log: LogConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load from `file` (must exist) or, if `None`, from `bakery.toml` in
    /// the working directory when present. Environment always applies.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder();

        let builder = match file {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings = builder
            // Eg.. `BAKERY__STORE__KIND=csv` would set `store.kind`
            .add_source(config::Environment::with_prefix("BAKERY").separator("__"))
            .build()?;

        let mut loaded: AppConfig = settings.try_deserialize()?;
        loaded.pricing = loaded.pricing.sanitized();
        Ok(loaded)
    }

    /// CLI overrides for the store section.
    pub fn with_store_overrides(mut self, kind: Option<StoreKind>, path: Option<PathBuf>) -> Self {
        match (kind, path) {
            (Some(kind), Some(path)) => {
                self.store = StoreConfig { kind, path };
            }
            (None, Some(path)) => {
                // A bare path picks its own backend when the extension says so
                self.store.kind = StoreKind::detect(&path).unwrap_or(self.store.kind);
                self.store.path = path;
            }
            (Some(kind), None) => {
                self.store.kind = kind;
            }
            (None, None) => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.store.kind, StoreKind::Json);
        assert!(config.store.path.ends_with("pantry.json"));
        assert_eq!(config.pricing, PricingConfig::default());
        assert_eq!(config.log.level, "info");
        assert_eq!(config.server.bind, "0.0.0.0:3000");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bakery.toml");
        std::fs::write(
            &path,
            r#"
[store]
kind = "csv"
path = "/srv/padoca/despensa.csv"

[pricing]
hourly_labor_rate = 20.0
profit_margin_percent = 150.0
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.store.kind, StoreKind::Csv);
        assert_eq!(config.store.path, PathBuf::from("/srv/padoca/despensa.csv"));
        assert_eq!(config.pricing.hourly_labor_rate, 20.0);
        // Unset keys keep their defaults, out-of-range margin is clamped
        assert_eq!(config.pricing.hourly_oven_rate, 2.50);
        assert_eq!(config.pricing.profit_margin_percent, 100.0);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_store_overrides() {
        let base = AppConfig::default();

        let by_path = base
            .clone()
            .with_store_overrides(None, Some(PathBuf::from("pantry.db")));
        assert_eq!(by_path.store.kind, StoreKind::Sqlite);

        let explicit = base
            .clone()
            .with_store_overrides(Some(StoreKind::Csv), Some(PathBuf::from("sheet.txt")));
        assert_eq!(explicit.store.kind, StoreKind::Csv);
        assert_eq!(explicit.store.path, PathBuf::from("sheet.txt"));

        let kind_only = base.with_store_overrides(Some(StoreKind::Sqlite), None);
        assert_eq!(kind_only.store.kind, StoreKind::Sqlite);
        assert!(kind_only.store.path.ends_with("pantry.json"));
    }
}
