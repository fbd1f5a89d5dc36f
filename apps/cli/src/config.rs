//! # Configuration
//!
//! Where the worksheets live and how the dashboard is computed.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Load Order (later overrides earlier)                 │
//! │                                                                         │
//! │  1. Defaults (this file)                                               │
//! │  2. Config file                                                        │
//! │     --config <path>, or                                                │
//! │     ~/.config/stockbook/stockbook.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockbook.stockbook/ (macOS)     │
//! │  3. Environment variables (STOCKBOOK_*)                                │
//! │  4. validate()                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Config File
//! ```toml
//! [store]
//! backend = "sqlite"
//! database_path = "/srv/shop/stockbook.db"
//! inventory_sheet = "Estoque"
//! sales_sheet = "Vendas"
//!
//! [report]
//! profit_goal = 1000.00
//! low_stock_threshold = 3
//!
//! [format]
//! date_format = "%d/%m/%Y %H:%M:%S"
//! utc_offset_minutes = -180
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use stockbook_core::report::DEFAULT_LOW_STOCK_THRESHOLD;
use stockbook_core::table::{DEFAULT_DATE_FORMAT, DEFAULT_UTC_OFFSET_MINUTES};
use stockbook_core::validation::{validate_profit_goal, validate_sheet_name};
use stockbook_core::{
    Money, ProfitGoal, ReportOptions, SheetFormat, ValidationError, DEFAULT_INVENTORY_SHEET,
    DEFAULT_SALES_SHEET,
};
use stockbook_db::StockbookSettings;

const CONFIG_FILE_NAME: &str = "stockbook.toml";
const DATABASE_FILE_NAME: &str = "stockbook.db";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Could not determine app data directory")]
    NoDataDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// Which table store backs the worksheets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Local SQLite file.
    #[default]
    Sqlite,
    /// Process memory, for dry runs of a single command.
    ///
    /// Every invocation starts from empty sheets and nothing is kept after
    /// it exits, so `add` followed by `sell` in a second invocation finds
    /// no product. Useful for checking pricing math and config without
    /// touching a workbook.
    Memory,
}

impl std::str::FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "memory" => Ok(Backend::Memory),
            _ => Err(ConfigError::InvalidValue(format!("backend '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub backend: Backend,
    /// Defaults to the platform data directory.
    pub database_path: Option<PathBuf>,
    pub inventory_sheet: String,
    pub sales_sheet: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            backend: Backend::default(),
            database_path: None,
            inventory_sheet: DEFAULT_INVENTORY_SHEET.to_string(),
            sales_sheet: DEFAULT_SALES_SHEET.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// Gross profit target in currency units. Zero disables the goal.
    pub profit_goal: f64,
    pub low_stock_threshold: u32,
}

impl Default for ReportSection {
    fn default() -> Self {
        ReportSection {
            profit_goal: 0.0,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSection {
    pub date_format: String,
    pub utc_offset_minutes: i32,
}

impl Default for FormatSection {
    fn default() -> Self {
        FormatSection {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub report: ReportSection,
    #[serde(default)]
    pub format: FormatSection,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// An explicit `config_path` must exist; the default path may be absent.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `STOCKBOOK_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("STOCKBOOK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.store.database_path = Some(PathBuf::from(path));
        }

        if let Some(backend) = lookup("STOCKBOOK_BACKEND") {
            self.store.backend = backend.parse()?;
        }

        if let Some(goal) = lookup("STOCKBOOK_PROFIT_GOAL") {
            self.report.profit_goal = goal
                .trim()
                .replace(',', ".")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCKBOOK_PROFIT_GOAL".to_string()))?;
        }

        if let Some(sheet) = lookup("STOCKBOOK_INVENTORY_SHEET") {
            self.store.inventory_sheet = sheet;
        }

        if let Some(sheet) = lookup("STOCKBOOK_SALES_SHEET") {
            self.store.sales_sheet = sheet;
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_sheet_name(&self.store.inventory_sheet)?;
        validate_sheet_name(&self.store.sales_sheet)?;

        if self.store.inventory_sheet.trim() == self.store.sales_sheet.trim() {
            return Err(ConfigError::Invalid(
                "inventory and sales sheets must be different".into(),
            ));
        }

        validate_profit_goal(self.profit_goal()?)?;
        self.sheet_format()?;

        Ok(())
    }

    fn profit_goal(&self) -> ConfigResult<Money> {
        Money::from_major_f64(self.report.profit_goal)
            .ok_or_else(|| ConfigError::InvalidValue("report.profit_goal".to_string()))
    }

    pub fn sheet_format(&self) -> ConfigResult<SheetFormat> {
        Ok(SheetFormat::new(
            self.format.date_format.clone(),
            self.format.utc_offset_minutes,
        )?)
    }

    pub fn report_options(&self) -> ConfigResult<ReportOptions> {
        Ok(ReportOptions {
            profit_goal: ProfitGoal(self.profit_goal()?),
            low_stock_threshold: self.report.low_stock_threshold,
        })
    }

    pub fn service_settings(&self) -> ConfigResult<StockbookSettings> {
        Ok(StockbookSettings {
            inventory_sheet: self.store.inventory_sheet.trim().to_string(),
            sales_sheet: self.store.sales_sheet.trim().to_string(),
            format: self.sheet_format()?,
        })
    }

    /// Resolves the database file, creating its directory.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.stockbook.stockbook/stockbook.db`
    /// - **Windows**: `%APPDATA%\stockbook\stockbook\data\stockbook.db`
    /// - **Linux**: `~/.local/share/stockbook/stockbook.db`
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.store.database_path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join(DATABASE_FILE_NAME))
    }

    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "stockbook", "stockbook")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();

        assert_eq!(config.store.backend, Backend::Sqlite);
        assert_eq!(config.store.inventory_sheet, "Estoque");
        assert_eq!(config.store.sales_sheet, "Vendas");

        let options = config.report_options().unwrap();
        assert_eq!(options.profit_goal, ProfitGoal(Money::zero()));
        assert_eq!(options.low_stock_threshold, 3);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [store]
            backend = "memory"

            [report]
            profit_goal = 1000.50
            "#,
        )
        .unwrap();

        assert_eq!(config.store.backend, Backend::Memory);
        assert_eq!(config.store.sales_sheet, "Vendas");
        assert_eq!(config.format.utc_offset_minutes, -180);
        assert_eq!(
            config.report_options().unwrap().profit_goal,
            ProfitGoal(Money::from_cents(100_050))
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(env(&[
                ("STOCKBOOK_DB_PATH", "/tmp/shop.db"),
                ("STOCKBOOK_BACKEND", "Memory"),
                ("STOCKBOOK_PROFIT_GOAL", "250,75"),
                ("STOCKBOOK_INVENTORY_SHEET", "Inventory"),
                ("STOCKBOOK_SALES_SHEET", "Sales"),
            ]))
            .unwrap();

        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.store.backend, Backend::Memory);
        assert_eq!(config.report.profit_goal, 250.75);

        let settings = config.service_settings().unwrap();
        assert_eq!(settings.inventory_sheet, "Inventory");
        assert_eq!(settings.sales_sheet, "Sales");
    }

    #[test]
    fn test_bad_env_values_are_rejected() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.apply_overrides(env(&[("STOCKBOOK_BACKEND", "postgres")])),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            config.apply_overrides(env(&[("STOCKBOOK_PROFIT_GOAL", "lots")])),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.store.sales_sheet = "Estoque".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.store.inventory_sheet = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = AppConfig::default();
        config.report.profit_goal = -10.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = AppConfig::default();
        config.format.date_format = "%Q".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = AppConfig::default();
        config.format.utc_offset_minutes = 24 * 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = AppConfig::load(Some(PathBuf::from("/nonexistent/stockbook.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
